use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Free-form journal entry ("How are you feeling today?").
/// Included in care reports alongside adherence data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthNote {
    pub id: Uuid,
    pub content: String,
    pub created_at: NaiveDateTime,
}

impl HealthNote {
    /// Builds a note from user text, trimming surrounding whitespace.
    /// Returns `None` when nothing remains.
    pub fn from_content(content: &str, created_at: NaiveDateTime) -> Option<Self> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(HealthNote {
            id: Uuid::new_v4(),
            content: trimmed.to_string(),
            created_at,
        })
    }
}
