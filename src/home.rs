//! Today's snapshot: the data behind the summary banner and the
//! shared-device display. One fetch assembles the dose checklist,
//! adherence counts, the next pending dose, and today's appointments.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::adherence::{self, AdherenceSummary};
use crate::daily_log::day_bounds;
use crate::models::{Appointment, LogStatus};
use crate::store::{CareStore, StoreError};

/// One row of today's checklist: a dose log joined with its medication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoseEntry {
    pub log_id: Uuid,
    pub medication_id: Uuid,
    pub medication_name: String,
    pub dosage: String,
    pub is_critical: bool,
    pub scheduled_at: NaiveDateTime,
    pub status: LogStatus,
    pub action_at: Option<NaiveDateTime>,
}

/// Home screen data, assembled in one call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodaySnapshot {
    pub date: NaiveDate,
    /// Today's doses in scheduled order, orphans already dropped.
    pub doses: Vec<DoseEntry>,
    pub adherence: AdherenceSummary,
    /// The earliest dose still awaiting action, if any.
    pub next_dose: Option<DoseEntry>,
    pub appointments: Vec<Appointment>,
    pub care_circle_size: usize,
}

impl TodaySnapshot {
    /// Banner line: "2 of 3 doses taken".
    pub fn headline(&self) -> String {
        format!(
            "{} of {} doses taken",
            self.adherence.taken, self.adherence.total
        )
    }
}

/// Assemble the snapshot for the current local date.
pub fn today_snapshot(store: &dyn CareStore) -> Result<TodaySnapshot, StoreError> {
    snapshot_for(store, Local::now().date_naive())
}

/// Assemble the snapshot for the given date.
///
/// Logs whose medication row no longer exists are dropped before
/// counting, the same orphan policy as the aggregator.
pub fn snapshot_for(store: &dyn CareStore, date: NaiveDate) -> Result<TodaySnapshot, StoreError> {
    let (start, end) = day_bounds(date);

    let logs = store.logs_between(start, end)?;
    let mut kept = Vec::with_capacity(logs.len());
    let mut doses = Vec::with_capacity(logs.len());
    let mut orphaned = 0;
    for log in logs {
        match store.medication(&log.medication_id)? {
            Some(medication) => {
                doses.push(DoseEntry {
                    log_id: log.id,
                    medication_id: medication.id,
                    medication_name: medication.name,
                    dosage: medication.dosage,
                    is_critical: medication.is_critical,
                    scheduled_at: log.scheduled_at,
                    status: log.status,
                    action_at: log.action_at,
                });
                kept.push(log);
            }
            None => orphaned += 1,
        }
    }
    if orphaned > 0 {
        tracing::warn!("Dropped {orphaned} orphaned dose logs from today's snapshot");
    }

    let adherence = adherence::aggregate(&kept, start, end);

    let next_dose = doses
        .iter()
        .find(|d| d.status == LogStatus::Upcoming)
        .cloned();

    Ok(TodaySnapshot {
        date,
        doses,
        adherence,
        next_dose,
        appointments: store.appointments_between(start, end)?,
        care_circle_size: store.members()?.len(),
    })
}
