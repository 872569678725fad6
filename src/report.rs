//! Care report assembly: the N-day data package behind "share with my
//! doctor". Collects medications, windowed adherence, appointments,
//! and health notes; rendering it (PDF or otherwise) is the host's
//! concern.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::adherence::{self, AdherenceSummary};
use crate::config;
use crate::daily_log::day_bounds;
use crate::models::{Appointment, HealthNote};
use crate::store::{CareStore, StoreError};

/// One medication line in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationSummary {
    pub medication_id: Uuid,
    pub name: String,
    pub dosage: String,
    /// Dose times formatted "08:00, 20:00".
    pub schedule: String,
    pub is_critical: bool,
}

/// The assembled report for a `[start, end)` day window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareReport {
    pub generated_at: NaiveDateTime,
    pub window_start: NaiveDate,
    /// Exclusive: the day after the last day covered.
    pub window_end: NaiveDate,
    pub medications: Vec<MedicationSummary>,
    pub adherence: AdherenceSummary,
    /// Whole-number adherence percentage for display.
    pub adherence_percent: u32,
    pub appointments: Vec<Appointment>,
    pub notes: Vec<HealthNote>,
}

/// Assemble the default report: the last 30 days ending today.
pub fn default_report(store: &dyn CareStore) -> Result<CareReport, StoreError> {
    report_for_days(store, config::DEFAULT_REPORT_DAYS, Local::now().naive_local())
}

/// Assemble a report for the `days` days ending on `now`'s date
/// (inclusive).
pub fn report_for_days(
    store: &dyn CareStore,
    days: i64,
    now: NaiveDateTime,
) -> Result<CareReport, StoreError> {
    let today = now.date();
    let window_start = today - Duration::days(days - 1);
    build_report(store, window_start, today, now)
}

fn build_report(
    store: &dyn CareStore,
    window_start: NaiveDate,
    last_day: NaiveDate,
    now: NaiveDateTime,
) -> Result<CareReport, StoreError> {
    let (start, _) = day_bounds(window_start);
    let (_, end) = day_bounds(last_day);

    let active = store.active_medications()?;
    let medications = active
        .iter()
        .map(|m| MedicationSummary {
            medication_id: m.id,
            name: m.name.clone(),
            dosage: m.dosage.clone(),
            schedule: m
                .schedule_times
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            is_critical: m.is_critical,
        })
        .collect();

    let logs = adherence::exclude_orphans(store.logs_between(start, end)?, &active);
    let summary = adherence::aggregate(&logs, start, end);

    Ok(CareReport {
        generated_at: now,
        window_start,
        window_end: last_day + Duration::days(1),
        medications,
        adherence: summary,
        adherence_percent: summary.percent(),
        appointments: store.appointments_between(start, end)?,
        notes: store.notes_since(start)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LogStatus, Medication, MedicationLog, ScheduleTime};
    use crate::store::MemoryStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn at(d: u32, hour: u32) -> NaiveDateTime {
        day(d).and_hms_opt(hour, 0, 0).unwrap()
    }

    fn seed_medication(store: &MemoryStore, name: &str, critical: bool) -> Medication {
        let mut med = Medication::new(
            name,
            "10mg",
            vec![
                ScheduleTime::new(8, 0).unwrap(),
                ScheduleTime::new(20, 0).unwrap(),
            ],
            at(1, 9),
        );
        med.is_critical = critical;
        store.insert_medication(&med).unwrap();
        med
    }

    fn taken_log(med: &Medication, d: u32, hour: u32) -> MedicationLog {
        let mut log = MedicationLog::upcoming(med.id, at(d, hour));
        log.status = LogStatus::Taken;
        log.action_at = Some(at(d, hour));
        log
    }

    #[test]
    fn window_covers_the_requested_days_inclusive() {
        let store = MemoryStore::new();
        let report = report_for_days(&store, 30, at(30, 12)).unwrap();
        assert_eq!(report.window_start, day(1));
        assert_eq!(report.window_end, day(31));
    }

    #[test]
    fn report_summarizes_medications_and_adherence() {
        let store = MemoryStore::new();
        let med = seed_medication(&store, "Warfarin", true);
        store
            .insert_logs(&[
                taken_log(&med, 9, 8),
                taken_log(&med, 9, 20),
                MedicationLog::upcoming(med.id, at(10, 8)),
                MedicationLog::upcoming(med.id, at(10, 20)),
            ])
            .unwrap();

        let report = report_for_days(&store, 7, at(10, 12)).unwrap();

        assert_eq!(report.medications.len(), 1);
        assert_eq!(report.medications[0].schedule, "08:00, 20:00");
        assert!(report.medications[0].is_critical);
        assert_eq!(report.adherence.total, 4);
        assert_eq!(report.adherence.taken, 2);
        assert_eq!(report.adherence_percent, 50);
    }

    #[test]
    fn logs_outside_the_window_are_excluded() {
        let store = MemoryStore::new();
        let med = seed_medication(&store, "Warfarin", false);
        store
            .insert_logs(&[taken_log(&med, 2, 8), taken_log(&med, 20, 8)])
            .unwrap();

        // 7-day window ending on the 20th starts on the 14th.
        let report = report_for_days(&store, 7, at(20, 12)).unwrap();
        assert_eq!(report.adherence.total, 1);
    }

    #[test]
    fn orphaned_logs_do_not_count() {
        let store = MemoryStore::new();
        seed_medication(&store, "Warfarin", false);
        store
            .insert_logs(&[MedicationLog::upcoming(Uuid::new_v4(), at(10, 8))])
            .unwrap();

        let report = report_for_days(&store, 7, at(10, 12)).unwrap();
        assert_eq!(report.adherence.total, 0);
        assert_eq!(report.adherence_percent, 0);
    }

    #[test]
    fn report_includes_window_appointments_and_notes() {
        let store = MemoryStore::new();
        seed_medication(&store, "Warfarin", false);
        store
            .insert_appointment(&Appointment::new("Checkup", "Dr. Osei", at(8, 14), at(1, 9)))
            .unwrap();
        store
            .insert_appointment(&Appointment::new("Old visit", "Dr. Osei", at(1, 14), at(1, 9)))
            .unwrap();
        store
            .insert_note(&HealthNote::from_content("dizzy in the morning", at(9, 7)).unwrap())
            .unwrap();

        let report = report_for_days(&store, 7, at(10, 12)).unwrap();
        assert_eq!(report.appointments.len(), 1);
        assert_eq!(report.appointments[0].title, "Checkup");
        assert_eq!(report.notes.len(), 1);
    }

    #[test]
    fn empty_store_yields_zeroed_report() {
        let store = MemoryStore::new();
        let report = report_for_days(&store, 30, at(15, 12)).unwrap();
        assert!(report.medications.is_empty());
        assert_eq!(report.adherence.rate, 0.0);
        assert_eq!(report.adherence_percent, 0);
    }
}
