//! Item entity
//!
//! The single entity of the service, as stored in Postgres and as cached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ItemError, Result};

/// Store-assigned item identifier (`SERIAL` column).
pub type ItemId = i32;

/// Status given to items that do not specify one.
pub const DEFAULT_STATUS: &str = "pending";

/// A persisted item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an item. Status and timestamp come from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub title: String,
    pub description: Option<String>,
}

impl NewItem {
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            title: title.into(),
            description,
        }
    }
}

/// Full replacement of the mutable fields of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemChanges {
    pub title: String,
    pub description: Option<String>,
    pub status: String,
}

impl ItemChanges {
    pub fn new(
        title: impl Into<String>,
        description: Option<String>,
        status: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description,
            status: status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        }
    }
}

/// Rejects empty titles.
pub fn validate_title(title: &str) -> Result<()> {
    if title.is_empty() {
        return Err(ItemError::Validation("Title is required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_item_serializes_null_description() {
        let item = Item {
            id: 1,
            title: "A".to_string(),
            description: None,
            status: DEFAULT_STATUS.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        };
        let json: serde_json::Value = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["title"], "A");
        assert!(json["description"].is_null());
        assert_eq!(json["status"], "pending");
        assert!(json["created_at"].as_str().unwrap().starts_with("2024-05-01T12:00:00"));
    }

    #[test]
    fn test_changes_default_status() {
        let changes = ItemChanges::new("B", None, None);
        assert_eq!(changes.status, DEFAULT_STATUS);

        let changes = ItemChanges::new("B", Some("d".into()), Some("done".into()));
        assert_eq!(changes.status, "done");
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("A").is_ok());
        assert!(matches!(validate_title(""), Err(ItemError::Validation(_))));
    }
}
