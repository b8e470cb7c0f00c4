//! `TodoStore` on SQLite through an sqlx connection pool.
//!
//! # Design
//! One row per todo, keyed by id. The full record is kept as JSON in `data`;
//! `completed` and `category` are copied into their own columns so bulk
//! selection and the category list are answered by SQL. `find` narrows by
//! `completed` in SQL and applies the rest of `TodoFilter` and the sort in
//! process, so text matching is the same Unicode-aware substring test for
//! every backend.
//!
//! Writes that depend on the current record (`update_by_id`, `update_many`)
//! read and write inside one transaction.

use std::collections::BTreeSet;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::query::{SortOrder, TodoFilter};
use crate::store::{BulkSelector, TodoStore};
use crate::types::{Todo, TodoPatch};

const SCHEMA_TODOS: &str = "CREATE TABLE IF NOT EXISTS todos (
    id TEXT NOT NULL PRIMARY KEY,
    completed BOOLEAN NOT NULL,
    category TEXT NOT NULL,
    data TEXT NOT NULL
)";
const SELECT_DATA: &str = "SELECT data FROM todos";
const SELECT_DATA_BY_ID: &str = "SELECT data FROM todos WHERE id = ?";
const SELECT_CATEGORIES: &str = "SELECT DISTINCT category FROM todos WHERE category <> ''";
const INSERT_TODO: &str = "INSERT INTO todos (id, completed, category, data) VALUES (?, ?, ?, ?)";
const UPDATE_TODO: &str = "UPDATE todos SET completed = ?, category = ?, data = ? WHERE id = ?";
const DELETE_TODO: &str = "DELETE FROM todos WHERE id = ? RETURNING data";
const COUNT_TODOS: &str = "SELECT COUNT(*) FROM todos";

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens the database at `url` (e.g. `sqlite://todos.db`), creating the
    /// file and the schema when missing.
    ///
    /// An in-memory database lives only as long as its connection, so
    /// `sqlite::memory:` gets a single connection that is never recycled.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(unavailable)?
            .create_if_missing(true);
        let pool_options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };
        let pool = pool_options.connect_with(options).await.map_err(unavailable)?;
        Self::with_pool(pool).await
    }

    /// Wraps an existing pool, creating the schema if needed.
    pub async fn with_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::query(SCHEMA_TODOS)
            .execute(&pool)
            .await
            .map_err(unavailable)?;
        debug!("sqlite schema ready");
        Ok(Self { pool })
    }

    /// Waits for open connections to finish and closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn select(
        conn: &mut SqliteConnection,
        selector: &BulkSelector,
    ) -> Result<Vec<Todo>, StoreError> {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_DATA);
        push_selector(&mut query, selector);
        let rows: Vec<(String,)> = query
            .build_query_as()
            .fetch_all(&mut *conn)
            .await
            .map_err(unavailable)?;
        rows.iter().map(|(data,)| decode(data)).collect()
    }
}

fn unavailable(err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

fn decode(data: &str) -> Result<Todo, StoreError> {
    serde_json::from_str(data).map_err(|err| StoreError::Serialization(err.to_string()))
}

fn encode(todo: &Todo) -> Result<String, StoreError> {
    serde_json::to_string(todo).map_err(|err| StoreError::Serialization(err.to_string()))
}

/// Appends `WHERE id IN (..) [AND completed = ?]`. `selector.ids` must not
/// be empty.
fn push_selector(query: &mut QueryBuilder<'_, Sqlite>, selector: &BulkSelector) {
    query.push(" WHERE id IN (");
    let mut ids = query.separated(", ");
    for id in &selector.ids {
        ids.push_bind(id.to_string());
    }
    ids.push_unseparated(")");
    if let Some(completed) = selector.completed {
        query.push(" AND completed = ").push_bind(completed);
    }
}

async fn write(conn: &mut SqliteConnection, todo: &Todo) -> Result<(), StoreError> {
    sqlx::query(UPDATE_TODO)
        .bind(todo.completed)
        .bind(&todo.category)
        .bind(encode(todo)?)
        .bind(todo.id.to_string())
        .execute(&mut *conn)
        .await
        .map_err(unavailable)?;
    Ok(())
}

#[async_trait]
impl TodoStore for SqliteStore {
    async fn find(&self, filter: &TodoFilter, sort: SortOrder) -> Result<Vec<Todo>, StoreError> {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_DATA);
        if let Some(completed) = filter.completed {
            query.push(" WHERE completed = ").push_bind(completed);
        }
        let rows: Vec<(String,)> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;

        let mut found = Vec::with_capacity(rows.len());
        for (data,) in &rows {
            let todo = decode(data)?;
            if filter.matches(&todo) {
                found.push(todo);
            }
        }
        sort.sort(&mut found);
        Ok(found)
    }

    async fn distinct_categories(&self) -> Result<BTreeSet<String>, StoreError> {
        let rows: Vec<(String,)> = sqlx::query_as(SELECT_CATEGORIES)
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(rows.into_iter().map(|(category,)| category).collect())
    }

    async fn insert(&self, mut todo: Todo) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        todo.id = id;
        sqlx::query(INSERT_TODO)
            .bind(id.to_string())
            .bind(todo.completed)
            .bind(&todo.category)
            .bind(encode(&todo)?)
            .execute(&self.pool)
            .await
            .map_err(|err| match err {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    StoreError::Conflict(format!("duplicate id {id}"))
                }
                other => unavailable(other),
            })?;
        Ok(id)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as(SELECT_DATA_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;
        row.map(|(data,)| decode(&data)).transpose()
    }

    async fn update_by_id(&self, id: Uuid, patch: TodoPatch) -> Result<Option<Todo>, StoreError> {
        let mut tx = self.pool.begin().await.map_err(unavailable)?;
        let row: Option<(String,)> = sqlx::query_as(SELECT_DATA_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(unavailable)?;
        let Some((data,)) = row else {
            return Ok(None);
        };

        let mut todo = decode(&data)?;
        todo.apply(&patch);
        write(&mut *tx, &todo).await?;
        tx.commit().await.map_err(unavailable)?;
        Ok(Some(todo))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Todo>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as(DELETE_TODO)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;
        row.map(|(data,)| decode(&data)).transpose()
    }

    async fn update_many(
        &self,
        selector: &BulkSelector,
        patch: TodoPatch,
    ) -> Result<u64, StoreError> {
        if selector.ids.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await.map_err(unavailable)?;
        let mut modified = 0;
        for mut todo in Self::select(&mut *tx, selector).await? {
            if todo.apply(&patch) {
                modified += 1;
            }
            write(&mut *tx, &todo).await?;
        }
        tx.commit().await.map_err(unavailable)?;
        Ok(modified)
    }

    async fn delete_many(&self, selector: &BulkSelector) -> Result<u64, StoreError> {
        if selector.ids.is_empty() {
            return Ok(0);
        }
        let mut query = QueryBuilder::<Sqlite>::new("DELETE FROM todos");
        push_selector(&mut query, selector);
        let result = query
            .build()
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let (count,): (i64,) = sqlx::query_as(COUNT_TODOS)
            .fetch_one(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(())
    }
}
