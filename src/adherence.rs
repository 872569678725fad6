//! Adherence tracking: the dose status state machine and the windowed
//! aggregation that feeds the home snapshot and care reports.
//!
//! `Upcoming` is the only actionable status. `Taken` and `Skipped` are
//! terminal; there is no automatic "missed" transition. A dose the user
//! never touches stays `Upcoming` forever, and lateness is surfaced by
//! the reminder layer, not by mutating the log.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{LogStatus, Medication, MedicationLog};
use crate::store::{CareStore, StoreError};

#[derive(Error, Debug)]
pub enum AdherenceError {
    /// Attempted to re-action a dose already marked taken or skipped.
    #[error("Invalid transition: dose is already {from}, cannot mark {to}")]
    InvalidTransition { from: &'static str, to: &'static str },

    #[error("Dose log not found: {0}")]
    LogNotFound(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn transition(
    store: &dyn CareStore,
    log_id: &Uuid,
    to: LogStatus,
    now: NaiveDateTime,
) -> Result<MedicationLog, AdherenceError> {
    let mut log = store
        .log(log_id)?
        .ok_or(AdherenceError::LogNotFound(*log_id))?;

    if !log.status.is_actionable() {
        return Err(AdherenceError::InvalidTransition {
            from: log.status.as_str(),
            to: to.as_str(),
        });
    }

    log.status = to;
    log.action_at = Some(now);
    store.save_log(&log)?;
    Ok(log)
}

/// Mark an upcoming dose taken, stamping the action time.
pub fn mark_taken(
    store: &dyn CareStore,
    log_id: &Uuid,
    now: NaiveDateTime,
) -> Result<MedicationLog, AdherenceError> {
    transition(store, log_id, LogStatus::Taken, now)
}

/// Mark an upcoming dose skipped, stamping the action time.
pub fn mark_skipped(
    store: &dyn CareStore,
    log_id: &Uuid,
    now: NaiveDateTime,
) -> Result<MedicationLog, AdherenceError> {
    transition(store, log_id, LogStatus::Skipped, now)
}

/// Adherence counts over one window of dose logs.
///
/// `rate` is doses confirmed taken over doses scheduled: skipped and
/// still-pending doses both count against it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdherenceSummary {
    pub total: usize,
    pub taken: usize,
    pub skipped: usize,
    pub pending: usize,
    pub rate: f64,
}

impl AdherenceSummary {
    /// Whole-number percentage for display ("87%").
    pub fn percent(&self) -> u32 {
        (self.rate * 100.0).round() as u32
    }
}

/// Reduce dose logs scheduled within `[from, to)` to adherence counts.
///
/// Pure: no store access, no mutation. An empty window yields a zero
/// summary with `rate` 0.0, never a division error.
pub fn aggregate(logs: &[MedicationLog], from: NaiveDateTime, to: NaiveDateTime) -> AdherenceSummary {
    let mut taken = 0;
    let mut skipped = 0;
    let mut pending = 0;

    for log in logs {
        if log.scheduled_at < from || log.scheduled_at >= to {
            continue;
        }
        match log.status {
            LogStatus::Taken => taken += 1,
            LogStatus::Skipped => skipped += 1,
            LogStatus::Upcoming => pending += 1,
        }
    }

    let total = taken + skipped + pending;
    let rate = if total == 0 {
        0.0
    } else {
        taken as f64 / total as f64
    };

    AdherenceSummary {
        total,
        taken,
        skipped,
        pending,
        rate,
    }
}

/// Drop logs whose medication no longer exists in `medications`.
///
/// A purged medication leaves its logs dangling; those orphans are
/// excluded from every summary rather than counted or treated as an
/// error.
pub fn exclude_orphans(logs: Vec<MedicationLog>, medications: &[Medication]) -> Vec<MedicationLog> {
    let before = logs.len();
    let kept: Vec<MedicationLog> = logs
        .into_iter()
        .filter(|log| medications.iter().any(|m| m.id == log.medication_id))
        .collect();
    if kept.len() < before {
        tracing::warn!(
            "Excluded {} orphaned dose logs from aggregation",
            before - kept.len()
        );
    }
    kept
}
