// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Task Manager API entry point.
//!
//! ## Configuration
//!
//! Loaded from environment variables (a `.env` file is honored):
//!
//! - `APP_NAME`: application name (default: "Task Manager API")
//! - `DEBUG`: debug flag (default: false)
//! - `DATABASE_URL`: SQLite connection string (default: sqlite://tasks.db)
//! - `BIND_ADDR`: server bind address (default: 0.0.0.0:8080)
//! - `MAX_BODY_BYTES`: request body limit (default: 65536)
//! - `RATE_LIMIT_MAX_REQUESTS`: requests per window per (IP, path) (default: 60)
//! - `RATE_LIMIT_WINDOW_SECS`: window length (default: 60)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use task_manager_api::{
    config::Config,
    handlers::{router, AppState},
    limiter::RateLimiter,
    store::TaskStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();
    info!(
        app_name = %config.app_name,
        bind_addr = %config.bind_addr,
        database_url = %config.database_url,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        "Starting task manager"
    );

    // Open the store and ensure the schema exists
    let store = TaskStore::connect(&config.database_url).await?;
    store.migrate().await?;

    // Create application state
    let limiter = RateLimiter::new(&config.rate_limit);
    let state = Arc::new(AppState {
        store,
        limiter,
        config: config.clone(),
    });

    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
