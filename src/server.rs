//! JSON HTTP API over the stress log.
//!
//! This is the boundary a browser front-end talks to: it exposes the three
//! log operations plus the tag list and the recent-entries view.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`    | `/health` | Health check (returns version) |
//! | `GET`    | `/logs?tag=#x` | Full history, oldest first, optionally filtered |
//! | `GET`    | `/logs/recent?limit=5` | Newest entries, newest first |
//! | `POST`   | `/logs` | Save an entry: `{ "level": 40, "note": "...", "tags": [...] }` |
//! | `DELETE` | `/logs/{id}` | Delete an entry |
//! | `GET`    | `/tags` | Distinct tags in first-seen order |
//!
//! When `tags` is omitted from a `POST /logs` body, tags are extracted from
//! the note.
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "log entry not found: ..." } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a front-end served
//! from another origin can call the API.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use stressometer_core::filter::{collect_tags, filter_by_tag, most_recent};
use stressometer_core::models::HistoryEntry;
use stressometer_core::store::StoreError;
use stressometer_core::tags::extract_tags;

use crate::config::Config;
use crate::service::StressLog;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub log: Arc<StressLog>,
    /// Default size of `/logs/recent`.
    pub recent_limit: usize,
}

/// Starts the HTTP server on `[server].bind`.
///
/// Opens the configured database and serves until the process is
/// terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let log = StressLog::open(config).await?;
    let state = AppState {
        log: Arc::new(log),
        recent_limit: config.history.recent_limit,
    };

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    println!("Stressometer listening on http://{}", config.server.bind);
    info!(bind = %config.server.bind, "server started");

    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Build the router. Exposed so the API can be mounted or tested in-process.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/logs", get(handle_history).post(handle_save))
        .route("/logs/recent", get(handle_recent))
        .route("/logs/{id}", delete(handle_delete))
        .route("/tags", get(handle_tags))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`, `"not_found"`).
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

/// Map a service error onto the HTTP error contract.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<StoreError>() {
            Some(StoreError::NotFound { .. }) => not_found(err.to_string()),
            _ => {
                error!(error = %err, "request failed");
                internal(err.to_string())
            }
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /logs ============

#[derive(Deserialize)]
struct HistoryQuery {
    tag: Option<String>,
}

async fn handle_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    let history = state.log.get_history().await?;
    Ok(Json(filter_by_tag(&history, query.tag.as_deref())))
}

// ============ GET /logs/recent ============

#[derive(Deserialize)]
struct RecentQuery {
    limit: Option<usize>,
}

async fn handle_recent(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    let limit = query.limit.unwrap_or(state.recent_limit);
    let history = state.log.get_history().await?;
    Ok(Json(most_recent(&history, limit)))
}

// ============ POST /logs ============

#[derive(Deserialize)]
struct SaveRequest {
    level: i64,
    #[serde(default)]
    note: Option<String>,
    /// Explicit tags; extracted from `note` when absent.
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// Saves an entry. Returns `201` with the stored entry, `400` when the body
/// does not parse (missing or non-integer `level`) or `level` is outside 0–100.
async fn handle_save(
    State(state): State<AppState>,
    payload: Result<Json<SaveRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<HistoryEntry>), AppError> {
    let Json(req) = payload.map_err(|rejection| bad_request(rejection.body_text()))?;
    if !(0..=100).contains(&req.level) {
        return Err(bad_request(format!(
            "level must be between 0 and 100, got {}",
            req.level
        )));
    }

    let tags = match req.tags {
        Some(tags) => tags,
        None => extract_tags(req.note.as_deref().unwrap_or_default()),
    };

    let saved = state.log.save_log(req.level, req.note, tags).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

// ============ DELETE /logs/{id} ============

async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.log.delete_log(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============ GET /tags ============

#[derive(Serialize)]
struct TagsResponse {
    tags: Vec<String>,
}

async fn handle_tags(State(state): State<AppState>) -> Result<Json<TagsResponse>, AppError> {
    let history = state.log.get_history().await?;
    Ok(Json(TagsResponse {
        tags: collect_tags(&history),
    }))
}
