// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers and router for the task manager service.
//!
//! Every route passes through the rate-limit middleware before handler logic
//! runs; a rejected request short-circuits with 429 regardless of route
//! semantics.

use crate::config::Config;
use crate::error::{handle_panic, ApiError};
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::store::TaskStore;
use crate::task::{Task, TaskCreate, TaskUpdate, TaskV2};
use crate::validator::{self, TaskValidator};
use axum::{
    extract::{ConnectInfo, Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Shared application state.
///
/// Owns the injectable components: one store, one limiter, both constructed
/// at process start and passed by handle into every request.
pub struct AppState {
    pub store: TaskStore,
    pub limiter: RateLimiter,
    pub config: Config,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

/// Pagination and filter parameters for list endpoints.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub completed: Option<bool>,
}

fn default_limit() -> i64 {
    100
}

/// Build the service router.
///
/// Exposed separately from `main` so tests can drive the full stack with
/// `tower::ServiceExt::oneshot`.
pub fn router(state: Arc<AppState>) -> Router {
    let max_body_bytes = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:task_id",
            get(get_task).patch(update_task).delete(delete_task),
        )
        .route("/tasks-v2", get(list_tasks_v2).post(create_task_v2))
        .route(
            "/tasks-v2/:task_id",
            get(get_task_v2).patch(update_task_v2).delete(delete_task_v2),
        )
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// Rate-limit middleware applied ahead of every handler.
async fn rate_limit(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    match state.limiter.check(addr.ip(), &path).await {
        RateLimitResult::Allowed { remaining } => {
            debug!(ip = %addr.ip(), path, remaining, "request admitted");
            next.run(request).await
        }
        RateLimitResult::Limited { retry_after } => {
            info!(
                ip = %addr.ip(),
                path,
                retry_after_secs = retry_after.as_secs(),
                "request rate limited"
            );
            ApiError::RateLimited { retry_after }.into_response()
        }
    }
}

/// Liveness plus database connectivity probe.
async fn health(State(state): State<Arc<AppState>>) -> Response {
    match state.store.ping().await {
        Ok(()) => Json(HealthResponse {
            status: "healthy",
            database: "connected",
        })
        .into_response(),
        Err(err) => {
            error!(error = %err, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"detail": "Service unavailable"})),
            )
                .into_response()
        }
    }
}

// ------------------------------------------------------------------
// Task (sequential integer id)
// ------------------------------------------------------------------

async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TaskCreate>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    TaskValidator::for_tasks().validate_create(&payload)?;
    let task = state
        .store
        .create_task(&payload.title, payload.description.as_deref())
        .await?;
    info!(id = task.id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Task>>, ApiError> {
    validator::validate_pagination(query.skip, query.limit)?;
    let tasks = state
        .store
        .list_tasks(query.skip, query.limit, query.completed)
        .await?;
    Ok(Json(tasks))
}

async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    validator::validate_task_id(task_id)?;
    let task = state.store.get_task(task_id).await?;
    Ok(Json(task))
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<i64>,
    Json(payload): Json<TaskUpdate>,
) -> Result<Json<Task>, ApiError> {
    validator::validate_task_id(task_id)?;
    TaskValidator::for_tasks().validate_update(&payload)?;
    let task = state.store.update_task(task_id, &payload).await?;
    info!(id = task.id, "task updated");
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    validator::validate_task_id(task_id)?;
    state.store.delete_task(task_id).await?;
    info!(id = task_id, "task deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ------------------------------------------------------------------
// TaskV2 (random UUID id)
// ------------------------------------------------------------------

async fn create_task_v2(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TaskCreate>,
) -> Result<(StatusCode, Json<TaskV2>), ApiError> {
    TaskValidator::for_tasks_v2().validate_create(&payload)?;
    let task = state
        .store
        .create_task_v2(&payload.title, payload.description.as_deref())
        .await?;
    info!(id = %task.id, "task v2 created");
    Ok((StatusCode::CREATED, Json(task)))
}

async fn list_tasks_v2(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<TaskV2>>, ApiError> {
    validator::validate_pagination(query.skip, query.limit)?;
    let tasks = state
        .store
        .list_tasks_v2(query.skip, query.limit, query.completed)
        .await?;
    Ok(Json(tasks))
}

async fn get_task_v2(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<TaskV2>, ApiError> {
    let task = state.store.get_task_v2(task_id).await?;
    Ok(Json(task))
}

async fn update_task_v2(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<TaskUpdate>,
) -> Result<Json<TaskV2>, ApiError> {
    TaskValidator::for_tasks_v2().validate_update(&payload)?;
    let task = state.store.update_task_v2(task_id, &payload).await?;
    info!(id = %task.id, "task v2 updated");
    Ok(Json(task))
}

async fn delete_task_v2(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_task_v2(task_id).await?;
    info!(id = %task_id, "task v2 deleted");
    Ok(StatusCode::NO_CONTENT)
}
