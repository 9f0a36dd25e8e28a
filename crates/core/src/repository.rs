//! Storage seam for work items.
//!
//! [`WorkItemRepository`] is the only way the engine touches storage. The
//! PostgreSQL implementation lives in `tracklane-db`; [`InMemoryRepository`]
//! backs tests and the `memory` storage backend.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CoreError;
use crate::search::WorkItemFilter;
use crate::types::DbId;
use crate::work_item::{NewWorkItem, WorkItem};

/// Document-store operations the engine consumes.
///
/// Listing order is `raised_at` descending, then `id` descending.
/// Concurrent writers to the same id follow last-write-wins.
#[async_trait]
pub trait WorkItemRepository: Send + Sync {
    /// Store a new record and return it with its assigned id.
    async fn insert(&self, record: NewWorkItem) -> Result<WorkItem, CoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<WorkItem>, CoreError>;

    /// Items matching `filter`, skipping `skip` and returning at most `limit`.
    async fn find_many(
        &self,
        filter: &WorkItemFilter,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<WorkItem>, CoreError>;

    async fn count(&self, filter: &WorkItemFilter) -> Result<i64, CoreError>;

    /// Replace the stored record. Returns `None` if no row has `id`.
    async fn update_by_id(&self, id: DbId, record: &WorkItem)
        -> Result<Option<WorkItem>, CoreError>;

    /// Returns `true` if a record was removed.
    async fn delete_by_id(&self, id: DbId) -> Result<bool, CoreError>;

    /// Whether the store is reachable.
    async fn health_check(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Inner {
    last_id: DbId,
    items: BTreeMap<DbId, WorkItem>,
}

/// Process-local store.
///
/// Thread-safe via interior `RwLock`; wrap in `Arc` to share.
#[derive(Default)]
pub struct InMemoryRepository {
    inner: RwLock<Inner>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn matching<'a>(
        items: &'a BTreeMap<DbId, WorkItem>,
        filter: &'a WorkItemFilter,
    ) -> impl Iterator<Item = &'a WorkItem> + 'a {
        items.values().filter(move |item| filter.matches(item))
    }
}

#[async_trait]
impl WorkItemRepository for InMemoryRepository {
    async fn insert(&self, record: NewWorkItem) -> Result<WorkItem, CoreError> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let item = record.into_work_item(inner.last_id);
        inner.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<WorkItem>, CoreError> {
        Ok(self.inner.read().await.items.get(&id).cloned())
    }

    async fn find_many(
        &self,
        filter: &WorkItemFilter,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<WorkItem>, CoreError> {
        let inner = self.inner.read().await;
        let mut hits: Vec<&WorkItem> = Self::matching(&inner.items, filter).collect();
        hits.sort_by(|a, b| b.raised_at.cmp(&a.raised_at).then(b.id.cmp(&a.id)));

        Ok(hits
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &WorkItemFilter) -> Result<i64, CoreError> {
        let inner = self.inner.read().await;
        let n = Self::matching(&inner.items, filter).count();
        i64::try_from(n).map_err(|_| CoreError::Storage("count overflow".into()))
    }

    async fn update_by_id(
        &self,
        id: DbId,
        record: &WorkItem,
    ) -> Result<Option<WorkItem>, CoreError> {
        let mut inner = self.inner.write().await;
        match inner.items.get_mut(&id) {
            Some(slot) => {
                *slot = WorkItem {
                    id,
                    ..record.clone()
                };
                Ok(Some(slot.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_by_id(&self, id: DbId) -> Result<bool, CoreError> {
        Ok(self.inner.write().await.items.remove(&id).is_some())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
