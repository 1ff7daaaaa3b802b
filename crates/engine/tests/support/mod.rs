//! Shared fixtures for engine integration tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use itemflow_core::{status, InMemoryItemStore, Item, ItemId, ItemStore, StoreError};
use tokio::sync::Notify;

/// In-memory store with injectable faults
///
/// Faults are fixed at construction; the store is then shared as
/// `Arc<FaultyStore>`.
#[derive(Default)]
pub struct FaultyStore {
    inner: InMemoryItemStore,
    slow_reads: HashMap<ItemId, Duration>,
    panicking_reads: HashSet<ItemId>,
    failing_saves: HashSet<ItemId>,
    fail_enumeration: bool,
    panic_on_enumeration: bool,
    enumerated: Arc<Notify>,
    saves: AtomicUsize,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay loads of `id` by `delay`
    pub fn with_slow_read(mut self, id: u64, delay: Duration) -> Self {
        self.slow_reads.insert(ItemId::new(id), delay);
        self
    }

    /// Panic inside every load of `id`
    pub fn with_panicking_read(mut self, id: u64) -> Self {
        self.panicking_reads.insert(ItemId::new(id));
        self
    }

    /// Refuse every save of `id`
    pub fn with_failing_save(mut self, id: u64) -> Self {
        self.failing_saves.insert(ItemId::new(id));
        self
    }

    pub fn with_failing_enumeration(mut self) -> Self {
        self.fail_enumeration = true;
        self
    }

    pub fn with_panicking_enumeration(mut self) -> Self {
        self.panic_on_enumeration = true;
        self
    }

    /// Insert `n` items with status NEW, IDs 1..=n
    ///
    /// Goes straight to the backing store, so seeding is not counted as a save.
    pub async fn seed(self, n: u64) -> Self {
        for i in 1..=n {
            self.inner
                .save(
                    Item::new(format!("item-{i}"), format!("item{i}@example.com"))
                        .with_status(status::NEW),
                )
                .await
                .unwrap();
        }
        self
    }

    /// Completes once the next ID snapshot has been taken
    pub fn enumerated(&self) -> Arc<Notify> {
        Arc::clone(&self.enumerated)
    }

    /// Successful saves since construction
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub async fn status_of(&self, id: u64) -> Option<String> {
        self.inner
            .find_by_id(ItemId::new(id))
            .await
            .unwrap()
            .and_then(|item| item.status)
    }
}

#[async_trait]
impl ItemStore for FaultyStore {
    async fn find_all_ids(&self) -> Result<Vec<ItemId>, StoreError> {
        if self.panic_on_enumeration {
            panic!("item index corrupted");
        }
        if self.fail_enumeration {
            return Err(StoreError::Unavailable("index offline".into()));
        }

        let ids = self.inner.find_all_ids().await?;
        self.enumerated.notify_one();
        Ok(ids)
    }

    async fn find_all(&self) -> Result<Vec<Item>, StoreError> {
        self.inner.find_all().await
    }

    async fn find_by_id(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        if let Some(delay) = self.slow_reads.get(&id) {
            tokio::time::sleep(*delay).await;
        }
        if self.panicking_reads.contains(&id) {
            panic!("corrupt record {id}");
        }
        self.inner.find_by_id(id).await
    }

    async fn save(&self, item: Item) -> Result<Item, StoreError> {
        if let Some(id) = item.id {
            if self.failing_saves.contains(&id) {
                return Err(StoreError::Unavailable(format!("write refused for {id}")));
            }
        }

        let saved = self.inner.save(item).await?;
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(saved)
    }

    async fn delete_by_id(&self, id: ItemId) -> Result<(), StoreError> {
        self.inner.delete_by_id(id).await
    }
}
