//! Reminder scheduling against an injected notification gateway.
//!
//! The gateway is the platform boundary: the core decides *what* to
//! schedule (identifiers, trigger times, content) and the host decides
//! how triggers become OS notifications. Everything here is driven by
//! deterministic identifiers so cancellation never needs to enumerate
//! what was previously registered.

pub mod gateway;
pub mod identifiers;
pub mod reminders;

pub use gateway::{NotificationContent, NotificationGateway, TriggerRequest, TriggerSpec};
pub use reminders::{
    cancel_appointment_reminders, cancel_medication_reminders, schedule_appointment_reminders,
    schedule_medication_reminders, reschedule_medication_reminders,
};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The gateway refused or could not accept the request. Never
    /// fatal: medication and log data stay valid without reminders.
    #[error("Notification scheduling unavailable: {0}")]
    Unavailable(String),

    #[error("Notification permission denied")]
    PermissionDenied,
}
