use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::PrepLead;

/// A medical appointment with an optional preparation reminder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub title: String,
    pub doctor_name: String,
    pub date_time: NaiveDateTime,
    pub location: Option<String>,
    pub notes: Option<String>,
    /// Whether a second reminder fires `prep_lead` before the visit.
    pub prep_reminder: bool,
    pub prep_lead: PrepLead,
    pub is_completed: bool,
    pub created_at: NaiveDateTime,
}

impl Appointment {
    pub fn new(
        title: impl Into<String>,
        doctor_name: impl Into<String>,
        date_time: NaiveDateTime,
        created_at: NaiveDateTime,
    ) -> Self {
        Appointment {
            id: Uuid::new_v4(),
            title: title.into(),
            doctor_name: doctor_name.into(),
            date_time,
            location: None,
            notes: None,
            prep_reminder: false,
            prep_lead: PrepLead::default(),
            is_completed: false,
            created_at,
        }
    }
}
