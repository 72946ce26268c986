//! Request DTOs for the item API
//!
//! Defines the structure of incoming HTTP request bodies. Titles are
//! optional at the serde level so a missing title is reported as a
//! validation error rather than a deserialization failure.

use serde::Deserialize;

use crate::error::{ItemError, Result};
use crate::models::{validate_title, ItemChanges, NewItem};

/// Request body for POST /items
#[derive(Debug, Clone, Deserialize)]
pub struct CreateItemRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateItemRequest {
    /// Validates the body and converts it into store input.
    pub fn into_new_item(self) -> Result<NewItem> {
        let title = required_title(self.title)?;
        Ok(NewItem::new(title, self.description))
    }
}

/// Request body for PUT /items/:id
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateItemRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl UpdateItemRequest {
    /// Validates the body and converts it into a full replacement.
    pub fn into_changes(self) -> Result<ItemChanges> {
        let title = required_title(self.title)?;
        Ok(ItemChanges::new(title, self.description, self.status))
    }
}

fn required_title(title: Option<String>) -> Result<String> {
    let title = title.ok_or_else(|| ItemError::Validation("Title is required".to_string()))?;
    validate_title(&title)?;
    Ok(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_deserialize() {
        let json = r#"{"title": "A"}"#;
        let req: CreateItemRequest = serde_json::from_str(json).unwrap();
        let item = req.into_new_item().unwrap();
        assert_eq!(item.title, "A");
        assert!(item.description.is_none());
    }

    #[test]
    fn test_create_request_missing_title() {
        let req: CreateItemRequest = serde_json::from_str(r#"{"description": "d"}"#).unwrap();
        assert!(matches!(req.into_new_item(), Err(ItemError::Validation(_))));
    }

    #[test]
    fn test_create_request_empty_title() {
        let req: CreateItemRequest = serde_json::from_str(r#"{"title": ""}"#).unwrap();
        assert!(matches!(req.into_new_item(), Err(ItemError::Validation(_))));
    }

    #[test]
    fn test_update_request_full_replace() {
        let json = r#"{"title": "B", "description": "d", "status": "done"}"#;
        let req: UpdateItemRequest = serde_json::from_str(json).unwrap();
        let changes = req.into_changes().unwrap();
        assert_eq!(changes.title, "B");
        assert_eq!(changes.description.as_deref(), Some("d"));
        assert_eq!(changes.status, "done");
    }

    #[test]
    fn test_update_request_without_status_uses_default() {
        let req: UpdateItemRequest = serde_json::from_str(r#"{"title": "B"}"#).unwrap();
        assert_eq!(req.into_changes().unwrap().status, "pending");
    }

    #[test]
    fn test_update_request_missing_title() {
        let req: UpdateItemRequest = serde_json::from_str(r#"{"status": "done"}"#).unwrap();
        assert!(req.into_changes().is_err());
    }
}
