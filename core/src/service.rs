//! Read path and write commands over a `TodoStore`.
//!
//! # Design
//! `TodoService` is cheap to clone and holds no per-request state; all shared
//! state lives in the store. Each command validates its input before the
//! first store call and maps absent records to `TodoError::NotFound`.
//!
//! Toggle reads the current record and then writes the flipped value in a
//! second call. Two concurrent toggles of the same record can therefore
//! both flip from the same prior state; the last write wins.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, error, info};
use uuid::Uuid;

use crate::bulk::{BulkAction, BulkOutcome};
use crate::error::{StoreError, TodoError};
use crate::query::{build_query, ListFilters, ListParams, SortOrder, TodoFilter};
use crate::store::{BulkSelector, TodoStore};
use crate::types::{Clock, SystemClock, Todo, TodoInput, TodoPatch};

/// Everything the list view needs for one render.
#[derive(Debug, Clone, Default)]
pub struct TodoListing {
    pub todos: Vec<Todo>,
    pub categories: BTreeSet<String>,
    pub filters: ListFilters,
    /// Set when the store failed; `todos` and `categories` are then empty.
    pub load_failed: bool,
}

impl TodoListing {
    pub fn failed() -> Self {
        Self {
            load_failed: true,
            ..Self::default()
        }
    }
}

#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
    clock: Arc<dyn Clock>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn TodoStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &Arc<dyn TodoStore> {
        &self.store
    }

    /// Runs the filtered, sorted query and collects filter options.
    ///
    /// Store faults are logged and turned into an empty listing with
    /// `load_failed` set; this never fails.
    pub async fn list(&self, params: &ListParams) -> TodoListing {
        let (filter, sort) = build_query(params);
        debug!(?filter, sort = sort.as_str(), "listing todos");
        match self.load(&filter, sort).await {
            Ok((todos, categories)) => TodoListing {
                todos,
                categories,
                filters: ListFilters::echo(params),
                load_failed: false,
            },
            Err(err) => {
                error!(error = %err, "failed to load todos");
                TodoListing::failed()
            }
        }
    }

    async fn load(
        &self,
        filter: &TodoFilter,
        sort: SortOrder,
    ) -> Result<(Vec<Todo>, BTreeSet<String>), StoreError> {
        let todos = self.store.find(filter, sort).await?;
        let categories = self.store.distinct_categories().await?;
        Ok((todos, categories))
    }

    /// Fetches one todo, e.g. for the edit form.
    pub async fn get(&self, id: Uuid) -> Result<Todo, TodoError> {
        self.store.find_by_id(id).await?.ok_or(TodoError::NotFound(id))
    }

    pub async fn create(&self, input: &TodoInput) -> Result<Uuid, TodoError> {
        let fields = input.validate()?;
        let todo = Todo::new(fields, self.clock.now());
        let id = self.store.insert(todo).await?;
        info!(%id, "todo created");
        Ok(id)
    }

    /// Overwrites every editable field of an existing todo.
    pub async fn update(&self, id: Uuid, input: &TodoInput) -> Result<Todo, TodoError> {
        let fields = input.validate()?;
        let patch = TodoPatch::replace(fields, self.clock.now());
        let todo = self
            .store
            .update_by_id(id, patch)
            .await?
            .ok_or(TodoError::NotFound(id))?;
        info!(%id, "todo updated");
        Ok(todo)
    }

    pub async fn toggle(&self, id: Uuid) -> Result<Todo, TodoError> {
        let current = self.get(id).await?;
        let patch = TodoPatch::completed(!current.completed, self.clock.now());
        let todo = self
            .store
            .update_by_id(id, patch)
            .await?
            .ok_or(TodoError::NotFound(id))?;
        info!(%id, completed = todo.completed, "todo toggled");
        Ok(todo)
    }

    pub async fn delete(&self, id: Uuid) -> Result<Todo, TodoError> {
        let todo = self
            .store
            .delete_by_id(id)
            .await?
            .ok_or(TodoError::NotFound(id))?;
        info!(%id, "todo deleted");
        Ok(todo)
    }

    /// Applies `action` to the todos in `ids`.
    ///
    /// `complete` and `incomplete` refresh `updated_at` on every selected
    /// todo, but the reported count only includes todos whose completion
    /// state changed. `deleteCompleted` skips selected todos that are still
    /// pending. Not atomic across records.
    pub async fn bulk(&self, action: &str, ids: &[Uuid]) -> Result<BulkOutcome, TodoError> {
        if ids.is_empty() {
            return Err(TodoError::Validation("No tasks selected".to_string()));
        }
        let action: BulkAction = action.parse()?;
        let selector = BulkSelector::ids(ids);
        let now = self.clock.now();

        let affected = match action {
            BulkAction::Complete => {
                let patch = TodoPatch::completed(true, now);
                self.store.update_many(&selector, patch).await?
            }
            BulkAction::Incomplete => {
                let patch = TodoPatch::completed(false, now);
                self.store.update_many(&selector, patch).await?
            }
            BulkAction::Delete => self.store.delete_many(&selector).await?,
            BulkAction::DeleteCompleted => {
                self.store.delete_many(&selector.with_completed(true)).await?
            }
        };

        info!(?action, requested = ids.len(), affected, "bulk action applied");
        Ok(BulkOutcome { action, affected })
    }
}
