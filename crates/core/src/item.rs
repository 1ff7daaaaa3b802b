// Item record
//
// The persisted entity processed by the batch engine. The engine only ever
// touches `status`; the remaining fields belong to the plain CRUD path.

use serde::{Deserialize, Serialize};

/// Status markers written to [`Item::status`]
pub mod status {
    /// Initial status for freshly created items
    pub const NEW: &str = "NEW";
    /// Terminal status written by the item processor
    pub const PROCESSED: &str = "processed";
}

/// Opaque item identifier, assigned by the store on first save
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ItemId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted work item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// `None` until the item has been saved
    pub id: Option<ItemId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub email: String,
}

impl Item {
    /// Create an unsaved item
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            status: None,
            email: email.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<ItemId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Mark the item as processed
    pub fn mark_processed(&mut self) {
        self.status = Some(status::PROCESSED.to_string());
    }

    pub fn is_processed(&self) -> bool {
        self.status.as_deref() == Some(status::PROCESSED)
    }
}
