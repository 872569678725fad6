//! Medication lifecycle flows: add, edit, archive. Each flow persists
//! first, then brings the reminder triggers in line with the stored
//! schedule.
//!
//! The load-bearing rule lives here: cancellation identifiers are
//! derived from the schedule **as it was when the triggers were
//! registered**. Every edit therefore snapshots the stored row before
//! overwriting it. A reminder failure never rolls back the data
//! mutation; medications stay usable without notifications.

use thiserror::Error;
use uuid::Uuid;

use crate::models::Medication;
use crate::notify::{
    cancel_medication_reminders, reschedule_medication_reminders, schedule_medication_reminders,
    NotificationGateway, NotifyError,
};
use crate::store::{CareStore, StoreError};

#[derive(Error, Debug)]
pub enum FlowError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The data mutation already committed; only reminder registration
    /// failed. Callers may retry scheduling later.
    #[error(transparent)]
    Reminders(#[from] NotifyError),
}

/// Insert a new medication and register its reminder triggers.
pub fn add_medication(
    store: &dyn CareStore,
    gateway: &dyn NotificationGateway,
    medication: &Medication,
) -> Result<(), FlowError> {
    store.insert_medication(medication)?;
    tracing::info!("Added medication {} ({})", medication.name, medication.id);
    schedule_medication_reminders(gateway, medication)?;
    Ok(())
}

/// Persist an edited medication and re-register its reminders.
///
/// The stored row is read back first; its schedule is the snapshot the
/// old triggers were registered from, and cancellation runs against
/// that snapshot before the new schedule is registered.
pub fn update_medication(
    store: &dyn CareStore,
    gateway: &dyn NotificationGateway,
    updated: &Medication,
) -> Result<(), FlowError> {
    let current = store
        .medication(&updated.id)?
        .ok_or_else(|| StoreError::NotFound {
            entity_type: "medication".into(),
            id: updated.id.to_string(),
        })?;
    let snapshot = current.schedule_times;

    store.save_medication(updated)?;
    reschedule_medication_reminders(gateway, &snapshot, updated)?;
    Ok(())
}

/// Soft-delete a medication: mark inactive, cancel its reminders.
///
/// Existing dose logs are left untouched; history survives archival.
pub fn archive_medication(
    store: &dyn CareStore,
    gateway: &dyn NotificationGateway,
    id: &Uuid,
) -> Result<(), FlowError> {
    let mut medication = store.medication(id)?.ok_or_else(|| StoreError::NotFound {
        entity_type: "medication".into(),
        id: id.to_string(),
    })?;
    let snapshot = medication.schedule_times.clone();

    medication.is_active = false;
    store.save_medication(&medication)?;
    tracing::info!("Archived medication {} ({})", medication.name, id);
    cancel_medication_reminders(gateway, id, &snapshot);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScheduleTime;
    use crate::notify::{identifiers, TriggerRequest};
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingGateway {
        scheduled: Mutex<Vec<TriggerRequest>>,
        canceled: Mutex<Vec<String>>,
        live: Mutex<Vec<String>>,
        refuse: AtomicBool,
    }

    impl RecordingGateway {
        fn live_identifiers(&self) -> Vec<String> {
            self.live.lock().unwrap().clone()
        }
    }

    impl NotificationGateway for RecordingGateway {
        fn schedule(&self, request: TriggerRequest) -> Result<(), NotifyError> {
            if self.refuse.load(Ordering::SeqCst) {
                return Err(NotifyError::PermissionDenied);
            }
            self.live.lock().unwrap().push(request.identifier.clone());
            self.scheduled.lock().unwrap().push(request);
            Ok(())
        }

        fn cancel(&self, identifiers: &[String]) {
            self.live
                .lock()
                .unwrap()
                .retain(|id| !identifiers.contains(id));
            self.canceled.lock().unwrap().extend_from_slice(identifiers);
        }
    }

    fn medication(times: &[(u32, u32)]) -> Medication {
        Medication::new(
            "Lisinopril",
            "10mg",
            times
                .iter()
                .map(|(h, m)| ScheduleTime::new(*h, *m).unwrap())
                .collect(),
            NaiveDate::from_ymd_opt(2025, 3, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn add_persists_and_registers_triggers() {
        let store = MemoryStore::new();
        let gateway = RecordingGateway::default();
        let med = medication(&[(8, 0), (20, 0)]);

        add_medication(&store, &gateway, &med).unwrap();

        assert!(store.medication(&med.id).unwrap().is_some());
        assert_eq!(gateway.scheduled.lock().unwrap().len(), 4);
    }

    #[test]
    fn add_keeps_data_when_gateway_refuses() {
        let store = MemoryStore::new();
        let gateway = RecordingGateway::default();
        gateway.refuse.store(true, Ordering::SeqCst);
        let med = medication(&[(8, 0)]);

        let result = add_medication(&store, &gateway, &med);

        assert!(matches!(result, Err(FlowError::Reminders(_))));
        assert!(store.medication(&med.id).unwrap().is_some());
    }

    #[test]
    fn shrinking_edit_leaves_one_live_pair() {
        let store = MemoryStore::new();
        let gateway = RecordingGateway::default();
        let mut med = medication(&[(8, 0), (14, 0), (20, 0)]);
        add_medication(&store, &gateway, &med).unwrap();

        med.schedule_times = vec![ScheduleTime::new(9, 0).unwrap()];
        update_medication(&store, &gateway, &med).unwrap();

        let live = gateway.live_identifiers();
        assert_eq!(live.len(), 2);
        assert!(live.contains(&identifiers::medication_reminder(&med.id, 0)));
        assert!(live.contains(&identifiers::medication_follow_up(&med.id, 0)));

        let stored = store.medication(&med.id).unwrap().unwrap();
        assert_eq!(stored.schedule_times.len(), 1);
    }

    #[test]
    fn growing_edit_registers_every_new_slot() {
        let store = MemoryStore::new();
        let gateway = RecordingGateway::default();
        let mut med = medication(&[(8, 0)]);
        add_medication(&store, &gateway, &med).unwrap();

        med.schedule_times.push(ScheduleTime::new(20, 0).unwrap());
        update_medication(&store, &gateway, &med).unwrap();

        assert_eq!(gateway.live_identifiers().len(), 4);
    }

    #[test]
    fn update_unknown_medication_is_not_found() {
        let store = MemoryStore::new();
        let gateway = RecordingGateway::default();
        let med = medication(&[(8, 0)]);

        let result = update_medication(&store, &gateway, &med);
        assert!(matches!(
            result,
            Err(FlowError::Store(StoreError::NotFound { .. }))
        ));
        assert!(gateway.scheduled.lock().unwrap().is_empty());
    }

    #[test]
    fn archive_deactivates_and_cancels_everything() {
        let store = MemoryStore::new();
        let gateway = RecordingGateway::default();
        let med = medication(&[(8, 0), (20, 0)]);
        add_medication(&store, &gateway, &med).unwrap();

        archive_medication(&store, &gateway, &med.id).unwrap();

        let stored = store.medication(&med.id).unwrap().unwrap();
        assert!(!stored.is_active);
        assert!(gateway.live_identifiers().is_empty());
        assert!(store.active_medications().unwrap().is_empty());
    }
}
