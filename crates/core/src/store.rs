//! ItemStore trait definition

use async_trait::async_trait;

use crate::item::{Item, ItemId};

/// Error type for store operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Backend could not be reached or refused the operation
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Write conflicted with the current stored state
    #[error("write conflict: {0}")]
    Conflict(String),

    /// Record could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persistence collaborator for items
///
/// Implementations must be thread-safe; the batch engine calls them
/// concurrently from many pool tasks at once.
#[async_trait]
pub trait ItemStore: Send + Sync + 'static {
    /// IDs of every stored item, ascending
    async fn find_all_ids(&self) -> Result<Vec<ItemId>, StoreError>;

    /// Every stored item, ascending by ID
    async fn find_all(&self) -> Result<Vec<Item>, StoreError>;

    /// Load one item; `Ok(None)` when it does not exist
    async fn find_by_id(&self, id: ItemId) -> Result<Option<Item>, StoreError>;

    /// Persist an item
    ///
    /// Assigns a fresh ID when `item.id` is `None`, overwrites otherwise.
    /// Returns the stored item.
    async fn save(&self, item: Item) -> Result<Item, StoreError>;

    /// Remove an item; deleting a missing ID is not an error
    async fn delete_by_id(&self, id: ItemId) -> Result<(), StoreError>;
}
