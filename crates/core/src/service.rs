// ItemService: the plain request/response path
//
// Validates input before persistence. Reads and deletes go straight to the
// store. The batch engine does not use this service.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::item::{Item, ItemId};
use crate::store::{ItemStore, StoreError};
use crate::validation::{validate_item, ValidationError};

/// Errors from [`ItemService`]
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// CRUD facade over an [`ItemStore`]
#[derive(Clone)]
pub struct ItemService {
    store: Arc<dyn ItemStore>,
}

impl ItemService {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ItemStore> {
        &self.store
    }

    pub async fn find_all(&self) -> Result<Vec<Item>, ServiceError> {
        Ok(self.store.find_all().await?)
    }

    pub async fn find_by_id(&self, id: ItemId) -> Result<Option<Item>, ServiceError> {
        Ok(self.store.find_by_id(id).await?)
    }

    /// Validate and persist an item
    pub async fn save(&self, item: Item) -> Result<Item, ServiceError> {
        if let Err(e) = validate_item(&item) {
            warn!(error = %e, "Rejected item before persistence");
            return Err(e.into());
        }

        let saved = self.store.save(item).await?;
        debug!(item_id = ?saved.id, "Saved item");
        Ok(saved)
    }

    pub async fn delete_by_id(&self, id: ItemId) -> Result<(), ServiceError> {
        self.store.delete_by_id(id).await?;
        debug!(item_id = %id, "Deleted item");
        Ok(())
    }
}
