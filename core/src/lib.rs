//! Core logic for the todo list application.
//!
//! # Overview
//! Validates user input, builds search/filter/sort queries, and executes
//! create, update, toggle, delete and bulk commands against a `TodoStore`.
//! HTTP and rendering live in the `todo-web` crate; nothing here knows about
//! requests or responses.
//!
//! # Design
//! - `TodoStore` is the persistence seam. `InMemoryStore` implements it over
//!   a locked hash map; `SqliteStore` persists to SQLite through sqlx.
//! - `TodoService` is the only entry point for writes. It owns no mutable
//!   state of its own, so clones can be handed to every request.
//! - Errors never escape the command boundary raw: `StatusMessage` turns a
//!   `TodoError` into the text shown to the user.

pub mod bulk;
pub mod error;
pub mod memory;
pub mod query;
pub mod service;
pub mod sqlite;
pub mod status;
pub mod store;
pub mod types;

pub use bulk::{BulkAction, BulkOutcome};
pub use error::{StoreError, TodoError};
pub use memory::InMemoryStore;
pub use query::{build_query, ListFilters, ListParams, SortOrder, TodoFilter};
pub use service::{TodoListing, TodoService};
pub use sqlite::SqliteStore;
pub use status::{Command, StatusMessage, LOAD_FAILED};
pub use store::{BulkSelector, TodoStore};
pub use types::{Clock, Priority, SystemClock, Todo, TodoFields, TodoInput, TodoPatch};
