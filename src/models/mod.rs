//! Domain model types: medications with their dose schedules, the daily
//! dose logs materialized from them, appointments, care circle members,
//! and health notes.

pub mod appointment;
pub mod care_circle;
pub mod enums;
pub mod health_note;
pub mod medication;
pub mod medication_log;

pub use appointment::Appointment;
pub use care_circle::{CareCircleMember, RELATIONSHIPS};
pub use enums::{LogStatus, PrepLead};
pub use health_note::HealthNote;
pub use medication::{InvalidScheduleTime, Medication, ScheduleTime};
pub use medication_log::MedicationLog;
