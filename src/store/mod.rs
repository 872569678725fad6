//! Persistence boundary: one `CareStore` trait with the queries the
//! scheduling, adherence, and reporting code needs, plus two
//! implementations (in-memory and SQLite).

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use chrono::NaiveDateTime;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Appointment, CareCircleMember, HealthNote, Medication, MedicationLog};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal lock error")]
    LockPoisoned,
}

/// Storage operations for the care data model.
///
/// Every query has a fixed sort order so callers never re-sort:
/// dose logs come back ascending by scheduled time (descending for the
/// per-medication history), medications by name, appointments by date,
/// notes newest first.
pub trait CareStore: Send + Sync {
    // ── Medications ─────────────────────────────────────────

    fn insert_medication(&self, medication: &Medication) -> Result<(), StoreError>;

    fn medication(&self, id: &Uuid) -> Result<Option<Medication>, StoreError>;

    /// Active (non-archived) medications, sorted by name.
    fn active_medications(&self) -> Result<Vec<Medication>, StoreError>;

    fn save_medication(&self, medication: &Medication) -> Result<(), StoreError>;

    // ── Dose logs ───────────────────────────────────────────

    /// Insert a batch of dose logs atomically: either every log lands
    /// or none do. A duplicate (medication, scheduled time) pair is a
    /// `ConstraintViolation`.
    fn insert_logs(&self, logs: &[MedicationLog]) -> Result<(), StoreError>;

    fn log(&self, id: &Uuid) -> Result<Option<MedicationLog>, StoreError>;

    /// Logs with `from <= scheduled_at < to`, ascending by scheduled time.
    fn logs_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<MedicationLog>, StoreError>;

    /// Full dose history for one medication, most recent first.
    fn logs_for_medication(&self, medication_id: &Uuid)
        -> Result<Vec<MedicationLog>, StoreError>;

    fn save_log(&self, log: &MedicationLog) -> Result<(), StoreError>;

    // ── Appointments ────────────────────────────────────────

    fn insert_appointment(&self, appointment: &Appointment) -> Result<(), StoreError>;

    fn appointment(&self, id: &Uuid) -> Result<Option<Appointment>, StoreError>;

    /// Appointments with `from <= date_time < to`, ascending.
    fn appointments_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Appointment>, StoreError>;

    /// Open (not completed) appointments at or after `after`, ascending.
    fn upcoming_appointments(&self, after: NaiveDateTime)
        -> Result<Vec<Appointment>, StoreError>;

    fn save_appointment(&self, appointment: &Appointment) -> Result<(), StoreError>;

    fn delete_appointment(&self, id: &Uuid) -> Result<(), StoreError>;

    // ── Health notes ────────────────────────────────────────

    fn insert_note(&self, note: &HealthNote) -> Result<(), StoreError>;

    /// Notes created at or after `cutoff`, newest first.
    fn notes_since(&self, cutoff: NaiveDateTime) -> Result<Vec<HealthNote>, StoreError>;

    // ── Care circle ─────────────────────────────────────────

    fn insert_member(&self, member: &CareCircleMember) -> Result<(), StoreError>;

    /// All members in the order they were added.
    fn members(&self) -> Result<Vec<CareCircleMember>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Verify the store trait is object-safe (used as `dyn CareStore`)
    #[test]
    fn store_trait_is_object_safe() {
        fn _assert_store(_: &dyn CareStore) {}
    }
}
