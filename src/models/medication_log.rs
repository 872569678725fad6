use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::LogStatus;

/// One materialized dose: a medication at a concrete scheduled timestamp.
///
/// `medication_id` is a weak reference. If the medication row is ever
/// purged the log becomes orphaned; orphans are dropped from adherence
/// aggregation rather than treated as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationLog {
    pub id: Uuid,
    pub medication_id: Uuid,
    pub scheduled_at: NaiveDateTime,
    pub status: LogStatus,
    /// When the user marked the dose taken or skipped. Never the
    /// scheduled time; lateness is derivable from the two.
    pub action_at: Option<NaiveDateTime>,
}

impl MedicationLog {
    /// A fresh dose awaiting user action.
    pub fn upcoming(medication_id: Uuid, scheduled_at: NaiveDateTime) -> Self {
        MedicationLog {
            id: Uuid::new_v4(),
            medication_id,
            scheduled_at,
            status: LogStatus::Upcoming,
            action_at: None,
        }
    }
}
