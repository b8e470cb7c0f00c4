//! Persistence contract consumed by the command executor.
//!
//! # Design
//! The store owns the records; callers only ever hold copies for the span of
//! one operation. Every method is a single round trip. Nothing here spans
//! several records atomically, and read-modify-write sequences built on top
//! of it are last-write-wins.

use std::collections::BTreeSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::query::{SortOrder, TodoFilter};
use crate::types::{Todo, TodoPatch};

/// Selects records for bulk writes: ids in `ids`, and when `completed` is
/// set, only records with that completion state.
#[derive(Debug, Clone, Default)]
pub struct BulkSelector {
    pub ids: Vec<Uuid>,
    pub completed: Option<bool>,
}

impl BulkSelector {
    pub fn ids(ids: &[Uuid]) -> Self {
        Self {
            ids: ids.to_vec(),
            completed: None,
        }
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn matches(&self, todo: &Todo) -> bool {
        self.ids.contains(&todo.id) && self.completed.map_or(true, |c| todo.completed == c)
    }
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Returns all records matching `filter`, ordered by `sort`.
    async fn find(&self, filter: &TodoFilter, sort: SortOrder) -> Result<Vec<Todo>, StoreError>;

    /// Distinct non-empty category values across the whole collection.
    async fn distinct_categories(&self) -> Result<BTreeSet<String>, StoreError>;

    /// Persists a new record, assigning it a fresh id.
    async fn insert(&self, todo: Todo) -> Result<Uuid, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, StoreError>;

    /// Applies `patch` and returns the updated record, or `None` if absent.
    async fn update_by_id(&self, id: Uuid, patch: TodoPatch) -> Result<Option<Todo>, StoreError>;

    /// Removes and returns the record, or `None` if absent.
    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Todo>, StoreError>;

    /// Applies `patch` to every selected record. Returns how many records
    /// had a value other than `updated_at` actually change.
    async fn update_many(
        &self,
        selector: &BulkSelector,
        patch: TodoPatch,
    ) -> Result<u64, StoreError>;

    /// Removes every selected record and returns how many were removed.
    async fn delete_many(&self, selector: &BulkSelector) -> Result<u64, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    /// Cheap liveness probe for health checks.
    async fn ping(&self) -> Result<(), StoreError>;
}
