use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Someone in the user's support network: family, friends, care staff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareCircleMember {
    pub id: Uuid,
    pub name: String,
    pub relationship: String,
    pub phone_number: Option<String>,
    pub is_emergency_contact: bool,
    /// Opt-in to alerts when a critical dose goes unconfirmed.
    pub notify_on_missed_dose: bool,
    pub created_at: NaiveDateTime,
}

impl CareCircleMember {
    pub fn new(
        name: impl Into<String>,
        relationship: impl Into<String>,
        created_at: NaiveDateTime,
    ) -> Self {
        CareCircleMember {
            id: Uuid::new_v4(),
            name: name.into(),
            relationship: relationship.into(),
            phone_number: None,
            is_emergency_contact: false,
            notify_on_missed_dose: true,
            created_at,
        }
    }
}

/// Relationship suggestions offered when adding a member.
pub const RELATIONSHIPS: [&str; 9] = [
    "Spouse",
    "Son",
    "Daughter",
    "Sibling",
    "Friend",
    "Caregiver",
    "Nurse",
    "Doctor",
    "Other",
];

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn new_member_opts_into_missed_dose_alerts() {
        let at = NaiveDate::from_ymd_opt(2025, 2, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let member = CareCircleMember::new("Ama", "Daughter", at);
        assert!(member.notify_on_missed_dose);
        assert!(!member.is_emergency_contact);
    }

    #[test]
    fn relationship_suggestions_cover_common_roles() {
        assert!(RELATIONSHIPS.contains(&"Caregiver"));
        assert!(RELATIONSHIPS.contains(&"Other"));
    }
}
