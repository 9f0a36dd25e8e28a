//! Inbound operations: create, get, update, list, delete.
//!
//! Each call is a single request against the repository. Derived fields are
//! computed from the record in hand before it is written; nothing here
//! reads other items or retries.

use std::sync::Arc;

use crate::clock::Clock;
use crate::error::CoreError;
use crate::lifecycle;
use crate::repository::WorkItemRepository;
use crate::search::{self, ListQuery, Page};
use crate::status::{Status, WorkItemKind};
use crate::types::DbId;
use crate::work_item::{CreateWorkItem, UpdateWorkItemStatus, WorkItem, WorkItemPatch};

/// Result of an update, with the status the item had before it.
#[derive(Debug, Clone, PartialEq)]
pub struct Updated {
    pub previous_status: Status,
    pub item: WorkItem,
}

/// Lifecycle engine bound to a store and a clock.
///
/// Cheap to clone; both collaborators sit behind `Arc`.
#[derive(Clone)]
pub struct WorkItemService {
    repo: Arc<dyn WorkItemRepository>,
    clock: Arc<dyn Clock>,
}

impl WorkItemService {
    pub fn new(repo: Arc<dyn WorkItemRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    pub fn repository(&self) -> &dyn WorkItemRepository {
        self.repo.as_ref()
    }

    /// Validate `input`, fill in defaults and derived fields, and store it.
    pub async fn create(
        &self,
        kind: WorkItemKind,
        input: CreateWorkItem,
    ) -> Result<WorkItem, CoreError> {
        let record = lifecycle::plan_create(kind, input, self.clock.as_ref())?;
        self.repo.insert(record).await
    }

    /// Fetch an item of `kind`. An id that belongs to another kind is not found.
    pub async fn get(&self, kind: WorkItemKind, id: DbId) -> Result<WorkItem, CoreError> {
        self.repo
            .find_by_id(id)
            .await?
            .filter(|item| item.kind == kind)
            .ok_or(CoreError::NotFound {
                entity: kind.entity_name(),
                id,
            })
    }

    /// Apply a partial update, recomputing derived fields when the status or
    /// timestamps changed.
    pub async fn update(
        &self,
        kind: WorkItemKind,
        id: DbId,
        patch: WorkItemPatch,
    ) -> Result<Updated, CoreError> {
        let current = self.get(kind, id).await?;
        let next = lifecycle::apply_patch(&current, patch, self.clock.now())?;
        let item = self
            .repo
            .update_by_id(id, &next)
            .await?
            .ok_or(CoreError::NotFound {
                entity: kind.entity_name(),
                id,
            })?;

        Ok(Updated {
            previous_status: current.status,
            item,
        })
    }

    /// Status-only transition, optionally stamping `closed_at`.
    pub async fn update_status(
        &self,
        kind: WorkItemKind,
        id: DbId,
        input: UpdateWorkItemStatus,
    ) -> Result<Updated, CoreError> {
        self.update(kind, id, input.into()).await
    }

    /// One page of `kind` items. The window must already be validated.
    pub async fn list(
        &self,
        kind: WorkItemKind,
        query: &ListQuery,
    ) -> Result<Page<WorkItem>, CoreError> {
        search::paginate(self.repo.as_ref(), kind, query).await
    }

    pub async fn delete(&self, kind: WorkItemKind, id: DbId) -> Result<(), CoreError> {
        // Confirms the id belongs to `kind` before removing it.
        self.get(kind, id).await?;
        if self.repo.delete_by_id(id).await? {
            Ok(())
        } else {
            Err(CoreError::NotFound {
                entity: kind.entity_name(),
                id,
            })
        }
    }
}
