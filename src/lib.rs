// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Task Manager API
//!
//! A small task-management REST service:
//!
//! - CRUD over two task record families: sequentially-numbered `Task` and
//!   UUID-keyed `TaskV2`
//! - Fixed-window rate limiting per (client IP, route path), 60 rpm default
//! - Field-level request validation (title/description bounds, pagination)
//! - Sanitized error responses: internal causes are logged, never serialized
//! - SQLite persistence via `sqlx` with exclusively parameterized queries

pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod store;
pub mod task;
pub mod validator;

pub use config::Config;
pub use error::ApiError;
pub use limiter::{RateLimitResult, RateLimiter};
pub use store::{StoreError, TaskStore};
pub use task::{Task, TaskV2};
