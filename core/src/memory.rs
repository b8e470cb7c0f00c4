//! In-process `TodoStore` backed by a locked hash map.
//!
//! Each trait call takes the lock once, so a single call is atomic with
//! respect to other calls on the same store. Clones share the same map.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::query::{SortOrder, TodoFilter};
use crate::store::{BulkSelector, TodoStore};
use crate::types::{Todo, TodoPatch};

pub type Db = Arc<RwLock<HashMap<Uuid, Todo>>>;

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    db: Db,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for InMemoryStore {
    async fn find(&self, filter: &TodoFilter, sort: SortOrder) -> Result<Vec<Todo>, StoreError> {
        let todos = self.db.read().await;
        let mut found: Vec<Todo> = todos.values().filter(|t| filter.matches(t)).cloned().collect();
        sort.sort(&mut found);
        Ok(found)
    }

    async fn distinct_categories(&self) -> Result<BTreeSet<String>, StoreError> {
        let todos = self.db.read().await;
        Ok(todos
            .values()
            .map(|t| t.category.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn insert(&self, mut todo: Todo) -> Result<Uuid, StoreError> {
        let mut todos = self.db.write().await;
        let id = Uuid::new_v4();
        if todos.contains_key(&id) {
            return Err(StoreError::Conflict(format!("duplicate id {id}")));
        }
        todo.id = id;
        todos.insert(id, todo);
        Ok(id)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, StoreError> {
        Ok(self.db.read().await.get(&id).cloned())
    }

    async fn update_by_id(&self, id: Uuid, patch: TodoPatch) -> Result<Option<Todo>, StoreError> {
        let mut todos = self.db.write().await;
        Ok(todos.get_mut(&id).map(|todo| {
            todo.apply(&patch);
            todo.clone()
        }))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Todo>, StoreError> {
        Ok(self.db.write().await.remove(&id))
    }

    async fn update_many(
        &self,
        selector: &BulkSelector,
        patch: TodoPatch,
    ) -> Result<u64, StoreError> {
        let mut todos = self.db.write().await;
        let modified = todos
            .values_mut()
            .filter(|t| selector.matches(t))
            .map(|t| t.apply(&patch))
            .filter(|changed| *changed)
            .count();
        Ok(modified as u64)
    }

    async fn delete_many(&self, selector: &BulkSelector) -> Result<u64, StoreError> {
        let mut todos = self.db.write().await;
        let before = todos.len();
        todos.retain(|_, t| !selector.matches(t));
        Ok((before - todos.len()) as u64)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.db.read().await.len() as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
