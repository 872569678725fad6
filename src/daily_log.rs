//! Daily dose log creation: turns active medication schedules into
//! today's actionable dose logs.
//!
//! Runs on launch, on return to foreground, and on day rollover.
//! Re-running is a no-op: a medication with any dose log in the day
//! window is left alone entirely, so a mid-day schedule edit changes
//! tomorrow's logs, not today's.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use crate::models::MedicationLog;
use crate::store::{CareStore, StoreError};

/// The day window `[start_of_day, start_of_day + 24h)`.
pub fn day_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(NaiveTime::MIN);
    (start, start + Duration::hours(24))
}

/// What one log-creation run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyLogRun {
    /// Dose logs written this run.
    pub created: usize,
    /// Medications left alone because they already had a log today.
    pub skipped_existing: usize,
}

pub struct DailyLogService {
    store: Arc<dyn CareStore>,
    run_guard: Mutex<()>,
}

impl DailyLogService {
    pub fn new(store: Arc<dyn CareStore>) -> Self {
        DailyLogService {
            store,
            run_guard: Mutex::new(()),
        }
    }

    /// Create dose logs for the current local date.
    pub fn create_today_logs(&self) -> Result<DailyLogRun, StoreError> {
        self.create_logs_for(Local::now().date_naive())
    }

    /// Create dose logs for the given date.
    ///
    /// The whole batch is written atomically; on any store failure the
    /// run aborts with no partial set. Concurrent runs are serialized,
    /// so a second caller observes the first caller's logs and creates
    /// nothing.
    pub fn create_logs_for(&self, date: NaiveDate) -> Result<DailyLogRun, StoreError> {
        // Read-then-write critical section: one run at a time.
        let _guard = self.run_guard.lock().map_err(|_| StoreError::LockPoisoned)?;

        let (start, end) = day_bounds(date);
        let existing = self.store.logs_between(start, end)?;
        let represented: HashSet<Uuid> = existing.iter().map(|l| l.medication_id).collect();

        let mut fresh = Vec::new();
        let mut skipped_existing = 0;
        for medication in self.store.active_medications()? {
            if represented.contains(&medication.id) {
                skipped_existing += 1;
                continue;
            }
            let mut scheduled: Vec<NaiveDateTime> = medication
                .schedule_times
                .iter()
                .map(|time| time.on_date(date))
                .collect();
            scheduled.sort();
            scheduled.dedup();
            for at in scheduled {
                fresh.push(MedicationLog::upcoming(medication.id, at));
            }
        }

        if !fresh.is_empty() {
            self.store.insert_logs(&fresh)?;
            tracing::info!("Created {} dose logs for {date}", fresh.len());
        }

        Ok(DailyLogRun {
            created: fresh.len(),
            skipped_existing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LogStatus, Medication, ScheduleTime};
    use crate::store::MemoryStore;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        date().and_hms_opt(hour, minute, 0).unwrap()
    }

    fn insert_test_medication(store: &MemoryStore, name: &str, times: &[(u32, u32)]) -> Medication {
        let med = Medication::new(
            name,
            "10mg",
            times
                .iter()
                .map(|(h, m)| ScheduleTime::new(*h, *m).unwrap())
                .collect(),
            at(7, 0),
        );
        store.insert_medication(&med).unwrap();
        med
    }

    fn todays_logs(store: &MemoryStore) -> Vec<MedicationLog> {
        let (start, end) = day_bounds(date());
        store.logs_between(start, end).unwrap()
    }

    #[test]
    fn day_bounds_cover_exactly_one_day() {
        let (start, end) = day_bounds(date());
        assert_eq!(start.to_string(), "2025-03-10 00:00:00");
        assert_eq!(end.to_string(), "2025-03-11 00:00:00");
    }

    #[test]
    fn creates_one_upcoming_log_per_schedule_slot() {
        let store = Arc::new(MemoryStore::new());
        let med = insert_test_medication(&store, "Lisinopril", &[(8, 0)]);
        let service = DailyLogService::new(store.clone());

        let run = service.create_logs_for(date()).unwrap();
        assert_eq!(run, DailyLogRun { created: 1, skipped_existing: 0 });

        let logs = todays_logs(&store);
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].medication_id, med.id);
        assert_eq!(logs[0].scheduled_at, at(8, 0));
        assert_eq!(logs[0].status, LogStatus::Upcoming);
    }

    #[test]
    fn rerun_creates_nothing() {
        let store = Arc::new(MemoryStore::new());
        insert_test_medication(&store, "Lisinopril", &[(8, 0), (20, 0)]);
        let service = DailyLogService::new(store.clone());

        service.create_logs_for(date()).unwrap();
        let second = service.create_logs_for(date()).unwrap();

        assert_eq!(second, DailyLogRun { created: 0, skipped_existing: 1 });
        assert_eq!(todays_logs(&store).len(), 2);
    }

    #[test]
    fn mid_day_schedule_edit_does_not_add_todays_logs() {
        let store = Arc::new(MemoryStore::new());
        let mut med = insert_test_medication(&store, "Lisinopril", &[(8, 0)]);
        let service = DailyLogService::new(store.clone());
        service.create_logs_for(date()).unwrap();

        // User adds an evening dose after the morning run.
        med.schedule_times.push(ScheduleTime::new(20, 0).unwrap());
        store.save_medication(&med).unwrap();

        let run = service.create_logs_for(date()).unwrap();
        assert_eq!(run.created, 0);
        assert_eq!(todays_logs(&store).len(), 1);
    }

    #[test]
    fn gate_applies_per_medication() {
        let store = Arc::new(MemoryStore::new());
        insert_test_medication(&store, "Lisinopril", &[(8, 0)]);
        let service = DailyLogService::new(store.clone());
        service.create_logs_for(date()).unwrap();

        let late_added = insert_test_medication(&store, "Metformin", &[(9, 0), (21, 0)]);
        let run = service.create_logs_for(date()).unwrap();

        assert_eq!(run, DailyLogRun { created: 2, skipped_existing: 1 });
        let logs = todays_logs(&store);
        assert_eq!(logs.len(), 3);
        assert_eq!(
            logs.iter().filter(|l| l.medication_id == late_added.id).count(),
            2
        );
    }

    #[test]
    fn any_existing_log_gates_even_when_acted_on() {
        let store = Arc::new(MemoryStore::new());
        let med = insert_test_medication(&store, "Lisinopril", &[(8, 0), (20, 0)]);

        // One dose already logged and taken before the first run.
        let mut log = MedicationLog::upcoming(med.id, at(8, 0));
        log.status = LogStatus::Taken;
        log.action_at = Some(at(8, 5));
        store.insert_logs(&[log]).unwrap();

        let service = DailyLogService::new(store.clone());
        let run = service.create_logs_for(date()).unwrap();

        assert_eq!(run, DailyLogRun { created: 0, skipped_existing: 1 });
        assert_eq!(todays_logs(&store).len(), 1);
    }

    #[test]
    fn inactive_medications_are_ignored() {
        let store = Arc::new(MemoryStore::new());
        let mut med = insert_test_medication(&store, "Lisinopril", &[(8, 0)]);
        med.is_active = false;
        store.save_medication(&med).unwrap();

        let service = DailyLogService::new(store.clone());
        let run = service.create_logs_for(date()).unwrap();

        assert_eq!(run, DailyLogRun { created: 0, skipped_existing: 0 });
        assert!(todays_logs(&store).is_empty());
    }

    #[test]
    fn empty_schedule_produces_nothing() {
        let store = Arc::new(MemoryStore::new());
        insert_test_medication(&store, "Lisinopril", &[]);
        let service = DailyLogService::new(store.clone());

        let run = service.create_logs_for(date()).unwrap();
        assert_eq!(run.created, 0);
        assert!(todays_logs(&store).is_empty());
    }

    #[test]
    fn duplicate_schedule_slots_collapse_to_one_log() {
        let store = Arc::new(MemoryStore::new());
        insert_test_medication(&store, "Lisinopril", &[(8, 0), (8, 0)]);
        let service = DailyLogService::new(store.clone());

        let run = service.create_logs_for(date()).unwrap();
        assert_eq!(run.created, 1);
        assert_eq!(todays_logs(&store).len(), 1);
    }

    #[test]
    fn concurrent_runs_do_not_duplicate() {
        let store = Arc::new(MemoryStore::new());
        insert_test_medication(&store, "Lisinopril", &[(8, 0), (20, 0)]);
        let service = Arc::new(DailyLogService::new(store.clone()));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let service = Arc::clone(&service);
            handles.push(std::thread::spawn(move || service.create_logs_for(date())));
        }
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        assert_eq!(todays_logs(&store).len(), 2);
    }

    // Store wrapper that refuses writes; reads pass through.
    struct FailingWrites(Arc<MemoryStore>);

    impl CareStore for FailingWrites {
        fn insert_logs(&self, _logs: &[MedicationLog]) -> Result<(), StoreError> {
            Err(StoreError::ConstraintViolation("write refused".into()))
        }

        fn active_medications(&self) -> Result<Vec<Medication>, StoreError> {
            self.0.active_medications()
        }

        fn logs_between(
            &self,
            from: NaiveDateTime,
            to: NaiveDateTime,
        ) -> Result<Vec<MedicationLog>, StoreError> {
            self.0.logs_between(from, to)
        }

        // The rest of the store surface is unused by the log creator.
        fn insert_medication(&self, _: &Medication) -> Result<(), StoreError> {
            unimplemented!()
        }
        fn medication(&self, _: &Uuid) -> Result<Option<Medication>, StoreError> {
            unimplemented!()
        }
        fn save_medication(&self, _: &Medication) -> Result<(), StoreError> {
            unimplemented!()
        }
        fn log(&self, _: &Uuid) -> Result<Option<MedicationLog>, StoreError> {
            unimplemented!()
        }
        fn logs_for_medication(&self, _: &Uuid) -> Result<Vec<MedicationLog>, StoreError> {
            unimplemented!()
        }
        fn save_log(&self, _: &MedicationLog) -> Result<(), StoreError> {
            unimplemented!()
        }
        fn insert_appointment(&self, _: &crate::models::Appointment) -> Result<(), StoreError> {
            unimplemented!()
        }
        fn appointment(
            &self,
            _: &Uuid,
        ) -> Result<Option<crate::models::Appointment>, StoreError> {
            unimplemented!()
        }
        fn appointments_between(
            &self,
            _: NaiveDateTime,
            _: NaiveDateTime,
        ) -> Result<Vec<crate::models::Appointment>, StoreError> {
            unimplemented!()
        }
        fn upcoming_appointments(
            &self,
            _: NaiveDateTime,
        ) -> Result<Vec<crate::models::Appointment>, StoreError> {
            unimplemented!()
        }
        fn save_appointment(&self, _: &crate::models::Appointment) -> Result<(), StoreError> {
            unimplemented!()
        }
        fn delete_appointment(&self, _: &Uuid) -> Result<(), StoreError> {
            unimplemented!()
        }
        fn insert_note(&self, _: &crate::models::HealthNote) -> Result<(), StoreError> {
            unimplemented!()
        }
        fn notes_since(
            &self,
            _: NaiveDateTime,
        ) -> Result<Vec<crate::models::HealthNote>, StoreError> {
            unimplemented!()
        }
        fn insert_member(&self, _: &crate::models::CareCircleMember) -> Result<(), StoreError> {
            unimplemented!()
        }
        fn members(&self) -> Result<Vec<crate::models::CareCircleMember>, StoreError> {
            unimplemented!()
        }
    }

    #[test]
    fn write_failure_aborts_run_with_no_partial_set() {
        let inner = Arc::new(MemoryStore::new());
        insert_test_medication(&inner, "Lisinopril", &[(8, 0), (20, 0)]);
        let service = DailyLogService::new(Arc::new(FailingWrites(inner.clone())));

        let result = service.create_logs_for(date());
        assert!(matches!(result, Err(StoreError::ConstraintViolation(_))));
        assert!(todays_logs(&inner).is_empty());
    }
}
