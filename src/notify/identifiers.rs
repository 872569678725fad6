//! Deterministic trigger identifiers.
//!
//! Cancellation works by re-deriving identifiers from (entity id,
//! schedule index), so the same inputs must always produce the same
//! strings. Never derive cancellation identifiers from an
//! already-edited schedule; use the snapshot taken before the edit.

use uuid::Uuid;

/// Primary daily dose reminder for one schedule slot.
pub fn medication_reminder(medication_id: &Uuid, index: usize) -> String {
    format!("med-{medication_id}-{index}")
}

/// Follow-up nudge for the same slot, 45 minutes after the dose time.
pub fn medication_follow_up(medication_id: &Uuid, index: usize) -> String {
    format!("med-followup-{medication_id}-{index}")
}

/// Both identifiers for one schedule slot.
pub fn medication_pair(medication_id: &Uuid, index: usize) -> [String; 2] {
    [
        medication_reminder(medication_id, index),
        medication_follow_up(medication_id, index),
    ]
}

/// Every identifier a schedule of `len` slots can have registered.
pub fn medication_identifiers(medication_id: &Uuid, len: usize) -> Vec<String> {
    (0..len)
        .flat_map(|index| medication_pair(medication_id, index))
        .collect()
}

/// Main appointment reminder (fires one hour before the visit).
pub fn appointment_reminder(appointment_id: &Uuid) -> String {
    format!("apt-{appointment_id}")
}

/// Optional preparation reminder.
pub fn appointment_prep(appointment_id: &Uuid) -> String {
    format!("apt-prep-{appointment_id}")
}

/// Both appointment identifiers; always canceled as a pair.
pub fn appointment_identifiers(appointment_id: &Uuid) -> [String; 2] {
    [
        appointment_reminder(appointment_id),
        appointment_prep(appointment_id),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_stable_across_calls() {
        let id = Uuid::new_v4();
        assert_eq!(medication_reminder(&id, 2), medication_reminder(&id, 2));
        assert_eq!(medication_follow_up(&id, 2), medication_follow_up(&id, 2));
        assert_eq!(appointment_reminder(&id), appointment_reminder(&id));
    }

    #[test]
    fn identifier_format_is_pinned() {
        let id = Uuid::nil();
        assert_eq!(
            medication_reminder(&id, 0),
            "med-00000000-0000-0000-0000-000000000000-0"
        );
        assert_eq!(
            medication_follow_up(&id, 1),
            "med-followup-00000000-0000-0000-0000-000000000000-1"
        );
        assert_eq!(
            appointment_reminder(&id),
            "apt-00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            appointment_prep(&id),
            "apt-prep-00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn slots_produce_distinct_identifiers() {
        let id = Uuid::new_v4();
        let all = medication_identifiers(&id, 3);
        assert_eq!(all.len(), 6);
        let mut deduped = all.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), 6);
    }

    #[test]
    fn empty_schedule_has_no_identifiers() {
        assert!(medication_identifiers(&Uuid::new_v4(), 0).is_empty());
    }
}
