//! In-memory `CareStore` used by tests and embedders that do not want a
//! database file. Mirrors the SQLite adapter's sort orders and the
//! uniqueness constraint on dose logs.

use std::sync::Mutex;

use chrono::NaiveDateTime;
use uuid::Uuid;

use super::{CareStore, StoreError};
use crate::models::{Appointment, CareCircleMember, HealthNote, Medication, MedicationLog};

#[derive(Default)]
struct Inner {
    medications: Vec<Medication>,
    logs: Vec<MedicationLog>,
    appointments: Vec<Appointment>,
    notes: Vec<HealthNote>,
    members: Vec<CareCircleMember>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl CareStore for MemoryStore {
    fn insert_medication(&self, medication: &Medication) -> Result<(), StoreError> {
        self.lock()?.medications.push(medication.clone());
        Ok(())
    }

    fn medication(&self, id: &Uuid) -> Result<Option<Medication>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.medications.iter().find(|m| m.id == *id).cloned())
    }

    fn active_medications(&self) -> Result<Vec<Medication>, StoreError> {
        let inner = self.lock()?;
        let mut meds: Vec<Medication> = inner
            .medications
            .iter()
            .filter(|m| m.is_active)
            .cloned()
            .collect();
        meds.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(meds)
    }

    fn save_medication(&self, medication: &Medication) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        match inner.medications.iter_mut().find(|m| m.id == medication.id) {
            Some(slot) => {
                *slot = medication.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound {
                entity_type: "medication".into(),
                id: medication.id.to_string(),
            }),
        }
    }

    fn insert_logs(&self, logs: &[MedicationLog]) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        // Validate the whole batch before touching state: all-or-nothing.
        for (i, log) in logs.iter().enumerate() {
            let clashes_existing = inner
                .logs
                .iter()
                .any(|l| l.medication_id == log.medication_id && l.scheduled_at == log.scheduled_at);
            let clashes_batch = logs[..i]
                .iter()
                .any(|l| l.medication_id == log.medication_id && l.scheduled_at == log.scheduled_at);
            if clashes_existing || clashes_batch {
                return Err(StoreError::ConstraintViolation(format!(
                    "duplicate dose log for medication {} at {}",
                    log.medication_id, log.scheduled_at
                )));
            }
        }
        inner.logs.extend(logs.iter().cloned());
        Ok(())
    }

    fn log(&self, id: &Uuid) -> Result<Option<MedicationLog>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.logs.iter().find(|l| l.id == *id).cloned())
    }

    fn logs_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<MedicationLog>, StoreError> {
        let inner = self.lock()?;
        let mut logs: Vec<MedicationLog> = inner
            .logs
            .iter()
            .filter(|l| l.scheduled_at >= from && l.scheduled_at < to)
            .cloned()
            .collect();
        logs.sort_by_key(|l| l.scheduled_at);
        Ok(logs)
    }

    fn logs_for_medication(
        &self,
        medication_id: &Uuid,
    ) -> Result<Vec<MedicationLog>, StoreError> {
        let inner = self.lock()?;
        let mut logs: Vec<MedicationLog> = inner
            .logs
            .iter()
            .filter(|l| l.medication_id == *medication_id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
        Ok(logs)
    }

    fn save_log(&self, log: &MedicationLog) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        match inner.logs.iter_mut().find(|l| l.id == log.id) {
            Some(slot) => {
                *slot = log.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound {
                entity_type: "medication_log".into(),
                id: log.id.to_string(),
            }),
        }
    }

    fn insert_appointment(&self, appointment: &Appointment) -> Result<(), StoreError> {
        self.lock()?.appointments.push(appointment.clone());
        Ok(())
    }

    fn appointment(&self, id: &Uuid) -> Result<Option<Appointment>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.appointments.iter().find(|a| a.id == *id).cloned())
    }

    fn appointments_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Appointment>, StoreError> {
        let inner = self.lock()?;
        let mut appointments: Vec<Appointment> = inner
            .appointments
            .iter()
            .filter(|a| a.date_time >= from && a.date_time < to)
            .cloned()
            .collect();
        appointments.sort_by_key(|a| a.date_time);
        Ok(appointments)
    }

    fn upcoming_appointments(
        &self,
        after: NaiveDateTime,
    ) -> Result<Vec<Appointment>, StoreError> {
        let inner = self.lock()?;
        let mut appointments: Vec<Appointment> = inner
            .appointments
            .iter()
            .filter(|a| !a.is_completed && a.date_time >= after)
            .cloned()
            .collect();
        appointments.sort_by_key(|a| a.date_time);
        Ok(appointments)
    }

    fn save_appointment(&self, appointment: &Appointment) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        match inner.appointments.iter_mut().find(|a| a.id == appointment.id) {
            Some(slot) => {
                *slot = appointment.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound {
                entity_type: "appointment".into(),
                id: appointment.id.to_string(),
            }),
        }
    }

    fn delete_appointment(&self, id: &Uuid) -> Result<(), StoreError> {
        self.lock()?.appointments.retain(|a| a.id != *id);
        Ok(())
    }

    fn insert_note(&self, note: &HealthNote) -> Result<(), StoreError> {
        self.lock()?.notes.push(note.clone());
        Ok(())
    }

    fn notes_since(&self, cutoff: NaiveDateTime) -> Result<Vec<HealthNote>, StoreError> {
        let inner = self.lock()?;
        let mut notes: Vec<HealthNote> = inner
            .notes
            .iter()
            .filter(|n| n.created_at >= cutoff)
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notes)
    }

    fn insert_member(&self, member: &CareCircleMember) -> Result<(), StoreError> {
        self.lock()?.members.push(member.clone());
        Ok(())
    }

    fn members(&self) -> Result<Vec<CareCircleMember>, StoreError> {
        let inner = self.lock()?;
        let mut members = inner.members.clone();
        members.sort_by_key(|m| m.created_at);
        Ok(members)
    }
}
