//! Care circle helpers: who gets told when a critical dose goes
//! unconfirmed, and who counts as an emergency contact.

use crate::models::{CareCircleMember, Medication};

/// Members to alert when a dose of `medication` goes unconfirmed.
///
/// Only critical medications escalate beyond the user's own follow-up
/// reminder, and only to members who opted into missed-dose alerts.
pub fn alert_recipients<'a>(
    members: &'a [CareCircleMember],
    medication: &Medication,
) -> Vec<&'a CareCircleMember> {
    if !medication.is_critical {
        return Vec::new();
    }
    members
        .iter()
        .filter(|m| m.notify_on_missed_dose)
        .collect()
}

/// Members flagged as emergency contacts, for the report header and
/// the shared-device display.
pub fn emergency_contacts(members: &[CareCircleMember]) -> Vec<&CareCircleMember> {
    members.iter().filter(|m| m.is_emergency_contact).collect()
}
