use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Schedule time out of range: {hour}:{minute}")]
pub struct InvalidScheduleTime {
    pub hour: u32,
    pub minute: u32,
}

/// A wall-clock dose time (hour + minute, no date, no zone).
///
/// Schedule times are index-addressable on their medication: reminder
/// trigger identifiers embed the position of the time in the schedule,
/// so order is meaningful and preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleTime(NaiveTime);

impl ScheduleTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self, InvalidScheduleTime> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or(InvalidScheduleTime { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// The clock time `minutes` later, wrapping past midnight.
    /// A 23:30 dose offset by 45 lands at 00:15.
    pub fn offset_by(&self, minutes: u32) -> ScheduleTime {
        let (time, _) = self
            .0
            .overflowing_add_signed(Duration::minutes(i64::from(minutes)));
        ScheduleTime(time)
    }

    /// Concrete timestamp for this clock time on the given date.
    pub fn on_date(&self, date: NaiveDate) -> NaiveDateTime {
        NaiveDateTime::new(date, self.0)
    }
}

impl fmt::Display for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// A medication with a fixed daily schedule.
///
/// Soft-deleted via `is_active = false`; never hard-deleted while dose
/// logs still reference it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub id: Uuid,
    pub name: String,
    pub dosage: String,
    pub notes: Option<String>,
    /// Ordered dose times; reminder identifiers are derived per index.
    pub schedule_times: Vec<ScheduleTime>,
    /// Critical medications get escalated reminders and caregiver alerts.
    pub is_critical: bool,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl Medication {
    pub fn new(
        name: impl Into<String>,
        dosage: impl Into<String>,
        schedule_times: Vec<ScheduleTime>,
        created_at: NaiveDateTime,
    ) -> Self {
        Medication {
            id: Uuid::new_v4(),
            name: name.into(),
            dosage: dosage.into(),
            notes: None,
            schedule_times,
            is_critical: false,
            is_active: true,
            created_at,
        }
    }
}
