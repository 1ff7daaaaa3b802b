// In-memory ItemStore
// Decision: Use parking_lot for thread-safe access
// Decision: IDs come from a monotonically increasing sequence starting at 1
//
// Backs the CLI and tests. Locks are only held for the duration of a map
// operation and never across an await point.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::item::{Item, ItemId};
use crate::store::{ItemStore, StoreError};

/// In-memory implementation of [`ItemStore`]
///
/// # Example
///
/// ```
/// use itemflow_core::InMemoryItemStore;
///
/// let store = InMemoryItemStore::new();
/// assert!(store.is_empty());
/// ```
#[derive(Debug)]
pub struct InMemoryItemStore {
    items: RwLock<BTreeMap<ItemId, Item>>,
    next_id: AtomicU64,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Clear all data (for testing)
    pub fn clear(&self) {
        self.items.write().clear();
    }

    /// Next generated ID; `u64::MAX` is never handed out
    fn allocate_id(&self) -> Result<ItemId, StoreError> {
        self.next_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |next| {
                next.checked_add(1)
            })
            .map(ItemId::new)
            .map_err(|_| StoreError::Conflict("item id space exhausted".to_string()))
    }

    /// Keep generated IDs clear of explicitly supplied ones
    fn reserve_past(&self, id: ItemId) {
        self.next_id
            .fetch_max(id.get().saturating_add(1), Ordering::SeqCst);
    }
}

impl Default for InMemoryItemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn find_all_ids(&self) -> Result<Vec<ItemId>, StoreError> {
        Ok(self.items.read().keys().copied().collect())
    }

    async fn find_all(&self) -> Result<Vec<Item>, StoreError> {
        Ok(self.items.read().values().cloned().collect())
    }

    async fn find_by_id(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        Ok(self.items.read().get(&id).cloned())
    }

    async fn save(&self, mut item: Item) -> Result<Item, StoreError> {
        let id = match item.id {
            Some(id) => {
                self.reserve_past(id);
                id
            }
            None => self.allocate_id()?,
        };
        item.id = Some(id);

        self.items.write().insert(id, item.clone());
        Ok(item)
    }

    async fn delete_by_id(&self, id: ItemId) -> Result<(), StoreError> {
        self.items.write().remove(&id);
        Ok(())
    }
}
