//! HTTP handlers.
//!
//! Reads render HTML. Writes never render: they run one command, turn the
//! result into a `StatusMessage`, and redirect to the list view with it.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};
use uuid::Uuid;

use todo_core::{
    Command, ListParams, StatusMessage, TodoError, TodoInput, TodoListing, LOAD_FAILED,
};

use crate::flash;
use crate::i18n::Lang;
use crate::view::{EditPage, ListPage};
use crate::AppState;

/// Query string of the list view.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    search: Option<String>,
    priority: Option<String>,
    category: Option<String>,
    status: Option<String>,
    #[serde(rename = "sortBy")]
    sort_by: Option<String>,
    success: Option<String>,
    error: Option<String>,
    lang: Option<String>,
}

impl ListQuery {
    fn params(&self) -> ListParams {
        ListParams {
            search: self.search.clone(),
            priority: self.priority.clone(),
            category: self.category.clone(),
            status: self.status.clone(),
            sort_by: self.sort_by.clone(),
        }
    }
}

/// `lang` passthrough on write endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateForm {
    #[serde(rename = "_id")]
    id: Option<String>,
    task: Option<String>,
    description: Option<String>,
    priority: Option<String>,
    category: Option<String>,
    #[serde(rename = "dueDate")]
    due_date: Option<String>,
    tags: Option<String>,
}

impl UpdateForm {
    fn into_parts(self) -> (Option<String>, TodoInput) {
        let input = TodoInput {
            task: self.task,
            description: self.description,
            priority: self.priority,
            category: self.category,
            due_date: self.due_date,
            tags: self.tags,
        };
        (self.id, input)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ToggleForm {
    #[serde(rename = "_id")]
    id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DestroyForm {
    #[serde(rename = "_key")]
    key: Option<String>,
}

/// Ids that do not parse cannot name a stored todo.
fn parse_id(raw: Option<&str>) -> Result<Uuid, TodoError> {
    let raw = raw.unwrap_or_default().trim();
    Uuid::parse_str(raw).map_err(|_| TodoError::NotFound(Uuid::nil()))
}

fn outcome<T>(
    command: Command,
    result: Result<T, TodoError>,
    success: impl FnOnce(T) -> StatusMessage,
) -> StatusMessage {
    match result {
        Ok(value) => success(value),
        Err(err) => {
            if err.is_store_fault() {
                error!(?command, error = %err, "command failed");
            } else {
                warn!(?command, error = %err, "command rejected");
            }
            StatusMessage::error(command, &err)
        }
    }
}

/// Renders the list page with the given status code and messages.
pub fn render_list(
    state: &AppState,
    status: StatusCode,
    listing: &TodoListing,
    success: Option<&str>,
    error: Option<&str>,
    lang: Lang,
) -> Response {
    let page = ListPage {
        listing,
        success,
        error,
        lang,
        tr: &state.translations,
        now: Utc::now(),
    };
    (status, Html(page.to_string())).into_response()
}

pub async fn list_todos(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    let lang = Lang::from_query(query.lang.as_deref());
    let listing = state.service.list(&query.params()).await;
    let (success, error) = if listing.load_failed {
        (None, Some(LOAD_FAILED))
    } else {
        (query.success.as_deref(), query.error.as_deref())
    };
    render_list(&state, StatusCode::OK, &listing, success, error, lang)
}

pub async fn create_todo(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
    Form(input): Form<TodoInput>,
) -> Redirect {
    let result = state.service.create(&input).await;
    let message = outcome(Command::Create, result, |_| StatusMessage::created());
    flash::redirect(&message, query.lang.as_deref())
}

pub async fn update_todo(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
    Form(form): Form<UpdateForm>,
) -> Redirect {
    let (id, input) = form.into_parts();
    let result = match input.validate() {
        Err(err) => Err(err),
        Ok(_) => match parse_id(id.as_deref()) {
            Ok(id) => state.service.update(id, &input).await,
            Err(err) => Err(err),
        },
    };
    let message = outcome(Command::Update, result, |_| StatusMessage::updated());
    flash::redirect(&message, query.lang.as_deref())
}

pub async fn toggle_todo(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
    Form(form): Form<ToggleForm>,
) -> Redirect {
    let result = match parse_id(form.id.as_deref()) {
        Ok(id) => state.service.toggle(id).await,
        Err(err) => Err(err),
    };
    let message = outcome(Command::Toggle, result, |_| StatusMessage::toggled());
    flash::redirect(&message, query.lang.as_deref())
}

pub async fn destroy_todo(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
    Form(form): Form<DestroyForm>,
) -> Redirect {
    let result = match parse_id(form.key.as_deref()) {
        Ok(id) => state.service.delete(id).await,
        Err(err) => Err(err),
    };
    let message = outcome(Command::Delete, result, |_| StatusMessage::deleted());
    flash::redirect(&message, query.lang.as_deref())
}

pub async fn edit_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<LangQuery>,
) -> Response {
    let lang = Lang::from_query(query.lang.as_deref());
    let result = match parse_id(Some(id.as_str())) {
        Ok(id) => state.service.get(id).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(todo) => {
            let page = EditPage {
                todo: &todo,
                lang,
                tr: &state.translations,
            };
            Html(page.to_string()).into_response()
        }
        Err(err) => {
            let text = if err.is_store_fault() {
                error!(error = %err, "failed to load todo for edit");
                "Failed to load task"
            } else {
                "Task not found"
            };
            let message = StatusMessage::Error(text.to_string());
            flash::redirect(&message, query.lang.as_deref()).into_response()
        }
    }
}

/// Bulk form: an `action` plus any number of `taskIds` (or `taskIds[]`)
/// fields, so the body is read as raw pairs.
pub async fn bulk_todos(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Redirect {
    let mut action = String::new();
    let mut ids = Vec::new();
    for (key, value) in pairs {
        match key.as_str() {
            "action" => action = value,
            "taskIds" | "taskIds[]" => match Uuid::parse_str(value.trim()) {
                Ok(id) => ids.push(id),
                Err(_) => warn!(%value, "ignoring malformed task id"),
            },
            _ => {}
        }
    }

    let result = state.service.bulk(&action, &ids).await;
    let message = outcome(Command::Bulk, result, |done| StatusMessage::bulk(&done));
    flash::redirect(&message, query.lang.as_deref())
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    match state.service.store().ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(err) => {
            warn!(error = %err, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "status": "unhealthy" })))
        }
    }
}

pub async fn not_found(State(state): State<AppState>, Query(query): Query<LangQuery>) -> Response {
    let lang = Lang::from_query(query.lang.as_deref());
    render_list(
        &state,
        StatusCode::NOT_FOUND,
        &TodoListing::default(),
        None,
        Some("Page not found"),
        lang,
    )
}
