// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Full-router tests driving the service through `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

use task_manager_api::config::{Config, RateLimitConfig};
use task_manager_api::handlers::{router, AppState};
use task_manager_api::limiter::RateLimiter;
use task_manager_api::store::TaskStore;

async fn test_state(config: Config) -> Arc<AppState> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    let store = TaskStore::new(pool);
    store.migrate().await.expect("migrate");

    Arc::new(AppState {
        limiter: RateLimiter::new(&config.rate_limit),
        store,
        config,
    })
}

/// Default test app: rate limit high enough to stay out of the way.
async fn test_app() -> (Arc<AppState>, Router) {
    let config = Config {
        rate_limit: RateLimitConfig {
            max_requests: 10_000,
            window_secs: 60,
        },
        ..Config::default()
    };
    let state = test_state(config).await;
    let app = router(state.clone());
    (state, app)
}

fn client_addr() -> SocketAddr {
    "203.0.113.7:49152".parse().unwrap()
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    request_from(client_addr(), method, uri, body)
}

fn request_from(addr: SocketAddr, method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .extension(ConnectInfo(addr));
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ------------------------------------------------------------------
// Health
// ------------------------------------------------------------------

#[tokio::test]
async fn test_health_reports_connected() {
    let (_state, app) = test_app().await;

    let response = app.oneshot(request("GET", "/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"status": "healthy", "database": "connected"})
    );
}

#[tokio::test]
async fn test_health_unreachable_database_is_generic() {
    let (state, app) = test_app().await;
    state.store.pool().close().await;

    let response = app.oneshot(request("GET", "/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body_json(response).await,
        json!({"detail": "Service unavailable"})
    );
}

// ------------------------------------------------------------------
// Task CRUD
// ------------------------------------------------------------------

#[tokio::test]
async fn test_create_then_fetch_task() {
    let (_state, app) = test_app().await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/tasks",
            Some(json!({"title": "Buy groceries", "description": "Milk, eggs, bread"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["title"], "Buy groceries");
    assert_eq!(created["completed"], false);

    let response = app.oneshot(request("GET", "/tasks/1", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["title"], "Buy groceries");
}

#[tokio::test]
async fn test_create_rejects_empty_title() {
    let (_state, app) = test_app().await;

    let response = app
        .oneshot(request("POST", "/tasks", Some(json!({"title": ""}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["detail"][0]["field"], "title");
}

#[tokio::test]
async fn test_create_rejects_oversized_description() {
    let (_state, app) = test_app().await;

    let response = app
        .oneshot(request(
            "POST",
            "/tasks",
            Some(json!({"title": "ok", "description": "d".repeat(1001)})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["detail"][0]["field"], "description");
}

#[tokio::test]
async fn test_title_boundary_lengths_accepted() {
    let (_state, app) = test_app().await;

    for title in ["x".to_string(), "x".repeat(255)] {
        let response = app
            .clone()
            .oneshot(request("POST", "/tasks", Some(json!({"title": title}))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .oneshot(request(
            "POST",
            "/tasks",
            Some(json!({"title": "x".repeat(256)})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_fetch_missing_task_is_404() {
    let (_state, app) = test_app().await;

    let response = app
        .oneshot(request("GET", "/tasks/999", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({"detail": "Task not found"}));
}

#[tokio::test]
async fn test_negative_task_id_fails_validation() {
    let (_state, app) = test_app().await;

    let response = app
        .oneshot(request("GET", "/tasks/-1", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["detail"][0]["field"], "task_id");
}

#[tokio::test]
async fn test_list_pagination_and_validation() {
    let (_state, app) = test_app().await;

    for i in 0..3 {
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/tasks",
                Some(json!({"title": format!("task {i}")})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(request("GET", "/tasks?skip=1&limit=1", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await;
    assert_eq!(page.as_array().unwrap().len(), 1);
    assert_eq!(page[0]["id"], 2);

    for uri in ["/tasks?limit=0", "/tasks?limit=1001", "/tasks?skip=-1"] {
        let response = app.clone().oneshot(request("GET", uri, None)).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "{uri} should fail validation"
        );
    }

    let response = app
        .oneshot(request("GET", "/tasks?skip=0&limit=1000", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await.as_array().unwrap().len() <= 1000);
}

#[tokio::test]
async fn test_patch_applies_only_supplied_fields() {
    let (_state, app) = test_app().await;

    app.clone()
        .oneshot(request(
            "POST",
            "/tasks",
            Some(json!({"title": "original", "description": "keep me"})),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(request(
            "PATCH",
            "/tasks/1",
            Some(json!({"completed": true})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["title"], "original");
    assert_eq!(updated["description"], "keep me");
}

#[tokio::test]
async fn test_patch_missing_task_is_404() {
    let (_state, app) = test_app().await;

    let response = app
        .oneshot(request(
            "PATCH",
            "/tasks/5",
            Some(json!({"title": "ghost"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_twice_yields_404_second_time() {
    let (_state, app) = test_app().await;

    app.clone()
        .oneshot(request("POST", "/tasks", Some(json!({"title": "doomed"}))))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(request("DELETE", "/tasks/1", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(request("DELETE", "/tasks/1", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({"detail": "Task not found"}));
}

#[tokio::test]
async fn test_completed_filter() {
    let (_state, app) = test_app().await;

    app.clone()
        .oneshot(request("POST", "/tasks", Some(json!({"title": "done"}))))
        .await
        .unwrap();
    app.clone()
        .oneshot(request("POST", "/tasks", Some(json!({"title": "pending"}))))
        .await
        .unwrap();
    app.clone()
        .oneshot(request(
            "PATCH",
            "/tasks/1",
            Some(json!({"completed": true})),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(request("GET", "/tasks?completed=true", None))
        .await
        .unwrap();
    let page = body_json(response).await;
    assert_eq!(page.as_array().unwrap().len(), 1);
    assert_eq!(page[0]["title"], "done");
}

// ------------------------------------------------------------------
// TaskV2
// ------------------------------------------------------------------

#[tokio::test]
async fn test_v2_create_fetch_delete_by_uuid() {
    let (_state, app) = test_app().await;

    let response = app
        .clone()
        .oneshot(request("POST", "/tasks-v2", Some(json!({"title": "v2"}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert!(uuid::Uuid::parse_str(&id).is_ok());

    let response = app
        .clone()
        .oneshot(request("GET", &format!("/tasks-v2/{id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request("DELETE", &format!("/tasks-v2/{id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(request("GET", &format!("/tasks-v2/{id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_v2_accepts_wider_description_than_v1() {
    let (_state, app) = test_app().await;
    let description = "d".repeat(5000);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/tasks",
            Some(json!({"title": "v1", "description": description})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .oneshot(request(
            "POST",
            "/tasks-v2",
            Some(json!({"title": "v2", "description": description})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

// ------------------------------------------------------------------
// Rate limiting
// ------------------------------------------------------------------

#[tokio::test]
async fn test_rate_limit_rejects_after_budget() {
    let config = Config {
        rate_limit: RateLimitConfig {
            max_requests: 2,
            window_secs: 60,
        },
        ..Config::default()
    };
    let state = test_state(config).await;
    let app = router(state);

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(request("GET", "/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.oneshot(request("GET", "/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("Retry-After"));
    assert_eq!(
        body_json(response).await,
        json!({"detail": "Rate limit exceeded. Please try again later."})
    );
}

#[tokio::test]
async fn test_rate_limit_keys_are_per_path_and_client() {
    let config = Config {
        rate_limit: RateLimitConfig {
            max_requests: 1,
            window_secs: 60,
        },
        ..Config::default()
    };
    let state = test_state(config).await;
    let app = router(state);

    let response = app
        .clone()
        .oneshot(request("GET", "/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request("GET", "/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // Same client, different path: separate budget.
    let response = app
        .clone()
        .oneshot(request("GET", "/tasks", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Different client, exhausted path: separate budget.
    let other: SocketAddr = "198.51.100.9:1234".parse().unwrap();
    let response = app
        .oneshot(request_from(other, "GET", "/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ------------------------------------------------------------------
// Error sanitization and body limits
// ------------------------------------------------------------------

#[tokio::test]
async fn test_internal_failure_is_sanitized() {
    let (state, app) = test_app().await;
    state.store.pool().close().await;

    let response = app.oneshot(request("GET", "/tasks", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body, json!({"detail": "Internal server error"}));
    assert_eq!(body.as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let config = Config {
        max_body_bytes: 128,
        rate_limit: RateLimitConfig {
            max_requests: 10_000,
            window_secs: 60,
        },
        ..Config::default()
    };
    let state = test_state(config).await;
    let app = router(state);

    let response = app
        .oneshot(request(
            "POST",
            "/tasks",
            Some(json!({"title": "ok", "description": "d".repeat(500)})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
