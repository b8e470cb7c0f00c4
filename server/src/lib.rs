//! Server-rendered todo list over axum.
//!
//! # Design
//! `AppState` carries a `TodoService` and the translations loaded at
//! startup. Both are shared read-only across requests; all mutable state
//! lives behind the service's store. `app` builds the router so tests can
//! drive it with `tower::ServiceExt::oneshot` without binding a socket.

pub mod config;
pub mod flash;
pub mod i18n;
pub mod routes;
pub mod view;

use std::any::Any;
use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::error;

use todo_core::{TodoListing, TodoService, TodoStore};

use crate::i18n::{Lang, Translations};

#[derive(Clone)]
pub struct AppState {
    pub service: TodoService,
    pub translations: Arc<Translations>,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>, translations: Translations) -> Self {
        Self {
            service: TodoService::new(store),
            translations: Arc::new(translations),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let panic_state = state.clone();
    Router::new()
        .route("/", get(routes::list_todos).post(routes::create_todo))
        .route("/todo/update", post(routes::update_todo))
        .route("/todo/toggle", post(routes::toggle_todo))
        .route("/todo/destroy", post(routes::destroy_todo))
        .route("/todo/edit/{id}", get(routes::edit_todo))
        .route("/todo/bulk", post(routes::bulk_todos))
        .route("/health", get(routes::health))
        .fallback(routes::not_found)
        .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
            render_panic(&panic_state, panic)
        }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Unhandled faults render the list page shape with a generic error.
fn render_panic(state: &AppState, panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(detail, "handler panicked");
    routes::render_list(
        state,
        StatusCode::INTERNAL_SERVER_ERROR,
        &TodoListing::default(),
        None,
        Some("failedToLoad"),
        Lang::default(),
    )
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
