//! SQLite adapter for `CareStore`.
//!
//! Schema lives in `resources/migrations/` and is applied through a
//! `schema_version` table. Timestamps are stored as `YYYY-MM-DD HH:MM:SS`
//! text (lexicographic order matches chronological order, so range
//! queries compare strings directly); schedule times are a JSON column.

use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{CareStore, StoreError};
use crate::config;
use crate::models::{
    Appointment, CareCircleMember, HealthNote, LogStatus, Medication, MedicationLog, PrepLead,
};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open the database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        configure_pragmas(&conn)?;
        run_migrations(&conn)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        configure_pragmas(&conn)?;
        run_migrations(&conn)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    /// Open at the default location under the app data directory,
    /// creating the directory if needed.
    pub fn open_default() -> Result<Self, StoreError> {
        let dir = config::app_data_dir();
        std::fs::create_dir_all(&dir)?;
        Self::open(&config::database_path())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

fn configure_pragmas(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![(
        1,
        include_str!("../../resources/migrations/001_initial.sql"),
    )];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql)
                .map_err(|e| StoreError::MigrationFailed {
                    version,
                    reason: e.to_string(),
                })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet)
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, i64>(0)
    })
    .unwrap_or(0)
}

/// Count tables in the database (for verification)
pub fn count_tables(conn: &Connection) -> Result<i64, StoreError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}

// ─── Timestamp encoding ─────────────────────────────────────

fn format_dt(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn parse_dt(s: &str) -> Result<NaiveDateTime, StoreError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|e| StoreError::ConstraintViolation(format!("bad timestamp {s:?}: {e}")))
}

fn parse_uuid(s: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(s).map_err(|e| StoreError::ConstraintViolation(e.to_string()))
}

fn map_insert_error(e: rusqlite::Error) -> StoreError {
    match e {
        rusqlite::Error::SqliteFailure(err, Some(msg))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StoreError::ConstraintViolation(msg)
        }
        other => StoreError::Sqlite(other),
    }
}

// ─── Row mapping ────────────────────────────────────────────

// Internal row types mirror the TEXT-encoded columns; conversion to
// domain types happens in the *_from_row functions.

struct MedicationRow {
    id: String,
    name: String,
    dosage: String,
    notes: Option<String>,
    schedule_times: String,
    is_critical: i32,
    is_active: i32,
    created_at: String,
}

fn medication_from_row(row: MedicationRow) -> Result<Medication, StoreError> {
    Ok(Medication {
        id: parse_uuid(&row.id)?,
        name: row.name,
        dosage: row.dosage,
        notes: row.notes,
        schedule_times: serde_json::from_str(&row.schedule_times)?,
        is_critical: row.is_critical != 0,
        is_active: row.is_active != 0,
        created_at: parse_dt(&row.created_at)?,
    })
}

const MEDICATION_COLUMNS: &str =
    "id, name, dosage, notes, schedule_times, is_critical, is_active, created_at";

fn read_medication_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MedicationRow> {
    Ok(MedicationRow {
        id: row.get(0)?,
        name: row.get(1)?,
        dosage: row.get(2)?,
        notes: row.get(3)?,
        schedule_times: row.get(4)?,
        is_critical: row.get(5)?,
        is_active: row.get(6)?,
        created_at: row.get(7)?,
    })
}

struct LogRow {
    id: String,
    medication_id: String,
    scheduled_at: String,
    status: String,
    action_at: Option<String>,
}

fn log_from_row(row: LogRow) -> Result<MedicationLog, StoreError> {
    Ok(MedicationLog {
        id: parse_uuid(&row.id)?,
        medication_id: parse_uuid(&row.medication_id)?,
        scheduled_at: parse_dt(&row.scheduled_at)?,
        status: LogStatus::from_str(&row.status)?,
        action_at: row.action_at.as_deref().map(parse_dt).transpose()?,
    })
}

const LOG_COLUMNS: &str = "id, medication_id, scheduled_at, status, action_at";

fn read_log_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<LogRow> {
    Ok(LogRow {
        id: row.get(0)?,
        medication_id: row.get(1)?,
        scheduled_at: row.get(2)?,
        status: row.get(3)?,
        action_at: row.get(4)?,
    })
}

struct AppointmentRow {
    id: String,
    title: String,
    doctor_name: String,
    date_time: String,
    location: Option<String>,
    notes: Option<String>,
    prep_reminder: i32,
    prep_lead_minutes: i64,
    is_completed: i32,
    created_at: String,
}

fn appointment_from_row(row: AppointmentRow) -> Result<Appointment, StoreError> {
    Ok(Appointment {
        id: parse_uuid(&row.id)?,
        title: row.title,
        doctor_name: row.doctor_name,
        date_time: parse_dt(&row.date_time)?,
        location: row.location,
        notes: row.notes,
        prep_reminder: row.prep_reminder != 0,
        prep_lead: PrepLead::from_minutes(row.prep_lead_minutes)?,
        is_completed: row.is_completed != 0,
        created_at: parse_dt(&row.created_at)?,
    })
}

const APPOINTMENT_COLUMNS: &str = "id, title, doctor_name, date_time, location, notes, \
     prep_reminder, prep_lead_minutes, is_completed, created_at";

fn read_appointment_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AppointmentRow> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        title: row.get(1)?,
        doctor_name: row.get(2)?,
        date_time: row.get(3)?,
        location: row.get(4)?,
        notes: row.get(5)?,
        prep_reminder: row.get(6)?,
        prep_lead_minutes: row.get(7)?,
        is_completed: row.get(8)?,
        created_at: row.get(9)?,
    })
}

// ─── CareStore implementation ───────────────────────────────

impl CareStore for SqliteStore {
    fn insert_medication(&self, medication: &Medication) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO medications (id, name, dosage, notes, schedule_times,
             is_critical, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                medication.id.to_string(),
                medication.name,
                medication.dosage,
                medication.notes,
                serde_json::to_string(&medication.schedule_times)?,
                medication.is_critical as i32,
                medication.is_active as i32,
                format_dt(&medication.created_at),
            ],
        )
        .map_err(map_insert_error)?;
        Ok(())
    }

    fn medication(&self, id: &Uuid) -> Result<Option<Medication>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {MEDICATION_COLUMNS} FROM medications WHERE id = ?1"
        ))?;
        let result = stmt.query_row(params![id.to_string()], read_medication_row);
        match result {
            Ok(row) => Ok(Some(medication_from_row(row)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn active_medications(&self) -> Result<Vec<Medication>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {MEDICATION_COLUMNS} FROM medications WHERE is_active = 1 ORDER BY name"
        ))?;
        let rows = stmt.query_map([], read_medication_row)?;
        let mut meds = Vec::new();
        for row in rows {
            meds.push(medication_from_row(row?)?);
        }
        Ok(meds)
    }

    fn save_medication(&self, medication: &Medication) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE medications SET name = ?2, dosage = ?3, notes = ?4,
             schedule_times = ?5, is_critical = ?6, is_active = ?7, created_at = ?8
             WHERE id = ?1",
            params![
                medication.id.to_string(),
                medication.name,
                medication.dosage,
                medication.notes,
                serde_json::to_string(&medication.schedule_times)?,
                medication.is_critical as i32,
                medication.is_active as i32,
                format_dt(&medication.created_at),
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound {
                entity_type: "medication".into(),
                id: medication.id.to_string(),
            });
        }
        Ok(())
    }

    fn insert_logs(&self, logs: &[MedicationLog]) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for log in logs {
            tx.execute(
                "INSERT INTO medication_logs (id, medication_id, scheduled_at, status, action_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    log.id.to_string(),
                    log.medication_id.to_string(),
                    format_dt(&log.scheduled_at),
                    log.status.as_str(),
                    log.action_at.as_ref().map(format_dt),
                ],
            )
            .map_err(map_insert_error)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn log(&self, id: &Uuid) -> Result<Option<MedicationLog>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {LOG_COLUMNS} FROM medication_logs WHERE id = ?1"
        ))?;
        let result = stmt.query_row(params![id.to_string()], read_log_row);
        match result {
            Ok(row) => Ok(Some(log_from_row(row)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn logs_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<MedicationLog>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {LOG_COLUMNS} FROM medication_logs
             WHERE scheduled_at >= ?1 AND scheduled_at < ?2
             ORDER BY scheduled_at"
        ))?;
        let rows = stmt.query_map(params![format_dt(&from), format_dt(&to)], read_log_row)?;
        let mut logs = Vec::new();
        for row in rows {
            logs.push(log_from_row(row?)?);
        }
        Ok(logs)
    }

    fn logs_for_medication(
        &self,
        medication_id: &Uuid,
    ) -> Result<Vec<MedicationLog>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {LOG_COLUMNS} FROM medication_logs
             WHERE medication_id = ?1
             ORDER BY scheduled_at DESC"
        ))?;
        let rows = stmt.query_map(params![medication_id.to_string()], read_log_row)?;
        let mut logs = Vec::new();
        for row in rows {
            logs.push(log_from_row(row?)?);
        }
        Ok(logs)
    }

    fn save_log(&self, log: &MedicationLog) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE medication_logs SET medication_id = ?2, scheduled_at = ?3,
             status = ?4, action_at = ?5
             WHERE id = ?1",
            params![
                log.id.to_string(),
                log.medication_id.to_string(),
                format_dt(&log.scheduled_at),
                log.status.as_str(),
                log.action_at.as_ref().map(format_dt),
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound {
                entity_type: "medication_log".into(),
                id: log.id.to_string(),
            });
        }
        Ok(())
    }

    fn insert_appointment(&self, appointment: &Appointment) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO appointments (id, title, doctor_name, date_time, location, notes,
             prep_reminder, prep_lead_minutes, is_completed, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                appointment.id.to_string(),
                appointment.title,
                appointment.doctor_name,
                format_dt(&appointment.date_time),
                appointment.location,
                appointment.notes,
                appointment.prep_reminder as i32,
                appointment.prep_lead.minutes() as i64,
                appointment.is_completed as i32,
                format_dt(&appointment.created_at),
            ],
        )
        .map_err(map_insert_error)?;
        Ok(())
    }

    fn appointment(&self, id: &Uuid) -> Result<Option<Appointment>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"
        ))?;
        let result = stmt.query_row(params![id.to_string()], read_appointment_row);
        match result {
            Ok(row) => Ok(Some(appointment_from_row(row)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn appointments_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Appointment>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments
             WHERE date_time >= ?1 AND date_time < ?2
             ORDER BY date_time"
        ))?;
        let rows = stmt.query_map(
            params![format_dt(&from), format_dt(&to)],
            read_appointment_row,
        )?;
        let mut appointments = Vec::new();
        for row in rows {
            appointments.push(appointment_from_row(row?)?);
        }
        Ok(appointments)
    }

    fn upcoming_appointments(
        &self,
        after: NaiveDateTime,
    ) -> Result<Vec<Appointment>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments
             WHERE is_completed = 0 AND date_time >= ?1
             ORDER BY date_time"
        ))?;
        let rows = stmt.query_map(params![format_dt(&after)], read_appointment_row)?;
        let mut appointments = Vec::new();
        for row in rows {
            appointments.push(appointment_from_row(row?)?);
        }
        Ok(appointments)
    }

    fn save_appointment(&self, appointment: &Appointment) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE appointments SET title = ?2, doctor_name = ?3, date_time = ?4,
             location = ?5, notes = ?6, prep_reminder = ?7, prep_lead_minutes = ?8,
             is_completed = ?9, created_at = ?10
             WHERE id = ?1",
            params![
                appointment.id.to_string(),
                appointment.title,
                appointment.doctor_name,
                format_dt(&appointment.date_time),
                appointment.location,
                appointment.notes,
                appointment.prep_reminder as i32,
                appointment.prep_lead.minutes() as i64,
                appointment.is_completed as i32,
                format_dt(&appointment.created_at),
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound {
                entity_type: "appointment".into(),
                id: appointment.id.to_string(),
            });
        }
        Ok(())
    }

    fn delete_appointment(&self, id: &Uuid) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM appointments WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(())
    }

    fn insert_note(&self, note: &HealthNote) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO health_notes (id, content, created_at) VALUES (?1, ?2, ?3)",
            params![
                note.id.to_string(),
                note.content,
                format_dt(&note.created_at),
            ],
        )
        .map_err(map_insert_error)?;
        Ok(())
    }

    fn notes_since(&self, cutoff: NaiveDateTime) -> Result<Vec<HealthNote>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, content, created_at FROM health_notes
             WHERE created_at >= ?1
             ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![format_dt(&cutoff)], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        let mut notes = Vec::new();
        for row in rows {
            let (id, content, created_at) = row?;
            notes.push(HealthNote {
                id: parse_uuid(&id)?,
                content,
                created_at: parse_dt(&created_at)?,
            });
        }
        Ok(notes)
    }

    fn insert_member(&self, member: &CareCircleMember) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO care_circle_members (id, name, relationship, phone_number,
             is_emergency_contact, notify_on_missed_dose, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                member.id.to_string(),
                member.name,
                member.relationship,
                member.phone_number,
                member.is_emergency_contact as i32,
                member.notify_on_missed_dose as i32,
                format_dt(&member.created_at),
            ],
        )
        .map_err(map_insert_error)?;
        Ok(())
    }

    fn members(&self) -> Result<Vec<CareCircleMember>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, relationship, phone_number, is_emergency_contact,
             notify_on_missed_dose, created_at
             FROM care_circle_members
             ORDER BY created_at",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, i32>(4)?,
                row.get::<_, i32>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;
        let mut members = Vec::new();
        for row in rows {
            let (id, name, relationship, phone_number, emergency, notify, created_at) = row?;
            members.push(CareCircleMember {
                id: parse_uuid(&id)?,
                name,
                relationship,
                phone_number,
                is_emergency_contact: emergency != 0,
                notify_on_missed_dose: notify != 0,
                created_at: parse_dt(&created_at)?,
            });
        }
        Ok(members)
    }
}
