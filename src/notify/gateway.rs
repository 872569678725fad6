use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::NotifyError;

/// When a trigger fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerSpec {
    /// Repeats every day at the given wall-clock time.
    Daily { hour: u32, minute: u32 },
    /// Fires once at the given local timestamp.
    Once { at: NaiveDateTime },
}

/// User-visible notification payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    /// Action category the host registers with the platform.
    pub category: String,
    /// Escalated delivery (break through focus modes where allowed).
    pub time_sensitive: bool,
}

/// One trigger registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRequest {
    /// Deterministic identifier; re-registering the same identifier
    /// replaces the previous trigger.
    pub identifier: String,
    pub content: NotificationContent,
    pub trigger: TriggerSpec,
}

/// Platform notification boundary, injected into the scheduling code.
pub trait NotificationGateway: Send + Sync {
    /// Register a trigger. May refuse (permission revoked, platform
    /// limit reached); refusal must leave previously registered
    /// triggers untouched.
    fn schedule(&self, request: TriggerRequest) -> Result<(), NotifyError>;

    /// Remove the given triggers. Idempotent: identifiers that were
    /// never registered (or already fired) are silently ignored.
    fn cancel(&self, identifiers: &[String]);
}
