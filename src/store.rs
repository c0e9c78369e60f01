// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! SQLite-backed store for task records.
//!
//! All statements are parameterized; user input is never interpolated into
//! query text. The single literal query is the `SELECT 1` connectivity probe.
//!
//! `Task` identifiers come from `INTEGER PRIMARY KEY AUTOINCREMENT`, so an id
//! is never reused even after deletion. `TaskV2` identifiers are random v4
//! UUIDs generated at insert time.

use crate::task::{Task, TaskUpdate, TaskV2};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Store error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists with the requested identifier.
    #[error("record not found")]
    NotFound,

    /// The underlying database operation failed.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// CRUD adapter over the SQLite connection pool.
#[derive(Clone)]
pub struct TaskStore {
    pool: SqlitePool,
}

impl TaskStore {
    /// Wrap an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool for the given connection string, creating the database
    /// file if it does not exist yet.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Ok(Self::new(pool))
    }

    /// Access the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create both task tables if they are missing.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                completed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS tasks_v2 (
                id BLOB PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                completed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        debug!("database schema ready");
        Ok(())
    }

    /// Connectivity probe used by the health endpoint.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Task (sequential integer id)
    // ------------------------------------------------------------------

    /// Insert a new task and return the stored record.
    pub async fn create_task(
        &self,
        title: &str,
        description: Option<&str>,
    ) -> Result<Task, StoreError> {
        let now = Utc::now();
        let task = sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (title, description, completed, created_at, updated_at)
             VALUES (?1, ?2, 0, ?3, ?3)
             RETURNING id, title, description, completed, created_at, updated_at",
        )
        .bind(title)
        .bind(description)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(task)
    }

    /// Fetch one task by id.
    pub async fn get_task(&self, task_id: i64) -> Result<Task, StoreError> {
        sqlx::query_as::<_, Task>(
            "SELECT id, title, description, completed, created_at, updated_at
             FROM tasks WHERE id = ?1",
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    /// Fetch a page of tasks in id order, optionally filtered by completion
    /// status.
    pub async fn list_tasks(
        &self,
        skip: i64,
        limit: i64,
        completed: Option<bool>,
    ) -> Result<Vec<Task>, StoreError> {
        let tasks = match completed {
            Some(completed) => {
                sqlx::query_as::<_, Task>(
                    "SELECT id, title, description, completed, created_at, updated_at
                     FROM tasks WHERE completed = ?1
                     ORDER BY id LIMIT ?2 OFFSET ?3",
                )
                .bind(completed)
                .bind(limit)
                .bind(skip)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Task>(
                    "SELECT id, title, description, completed, created_at, updated_at
                     FROM tasks ORDER BY id LIMIT ?1 OFFSET ?2",
                )
                .bind(limit)
                .bind(skip)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(tasks)
    }

    /// Apply a partial update; only fields present in `update` are written.
    pub async fn update_task(
        &self,
        task_id: i64,
        update: &TaskUpdate,
    ) -> Result<Task, StoreError> {
        let existing = self.get_task(task_id).await?;

        let title = update.title.as_deref().unwrap_or(&existing.title);
        let description = update
            .description
            .as_deref()
            .or(existing.description.as_deref());
        let completed = update.completed.unwrap_or(existing.completed);
        let now = Utc::now();

        let task = sqlx::query_as::<_, Task>(
            "UPDATE tasks
             SET title = ?1, description = ?2, completed = ?3, updated_at = ?4
             WHERE id = ?5
             RETURNING id, title, description, completed, created_at, updated_at",
        )
        .bind(title)
        .bind(description)
        .bind(completed)
        .bind(now)
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;
        Ok(task)
    }

    /// Delete one task. Deleting an absent id fails with `NotFound`, so a
    /// repeated delete reports not-found rather than succeeding twice.
    pub async fn delete_task(&self, task_id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?1")
            .bind(task_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // TaskV2 (random UUID id)
    // ------------------------------------------------------------------

    /// Insert a new v2 task under a freshly generated UUID.
    pub async fn create_task_v2(
        &self,
        title: &str,
        description: Option<&str>,
    ) -> Result<TaskV2, StoreError> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let task = sqlx::query_as::<_, TaskV2>(
            "INSERT INTO tasks_v2 (id, title, description, completed, created_at, updated_at)
             VALUES (?1, ?2, ?3, 0, ?4, ?4)
             RETURNING id, title, description, completed, created_at, updated_at",
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(task)
    }

    /// Fetch one v2 task by id.
    pub async fn get_task_v2(&self, task_id: Uuid) -> Result<TaskV2, StoreError> {
        sqlx::query_as::<_, TaskV2>(
            "SELECT id, title, description, completed, created_at, updated_at
             FROM tasks_v2 WHERE id = ?1",
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    /// Fetch a page of v2 tasks in insertion order.
    pub async fn list_tasks_v2(
        &self,
        skip: i64,
        limit: i64,
        completed: Option<bool>,
    ) -> Result<Vec<TaskV2>, StoreError> {
        let tasks = match completed {
            Some(completed) => {
                sqlx::query_as::<_, TaskV2>(
                    "SELECT id, title, description, completed, created_at, updated_at
                     FROM tasks_v2 WHERE completed = ?1
                     ORDER BY rowid LIMIT ?2 OFFSET ?3",
                )
                .bind(completed)
                .bind(limit)
                .bind(skip)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, TaskV2>(
                    "SELECT id, title, description, completed, created_at, updated_at
                     FROM tasks_v2 ORDER BY rowid LIMIT ?1 OFFSET ?2",
                )
                .bind(limit)
                .bind(skip)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(tasks)
    }

    /// Apply a partial update to a v2 task.
    pub async fn update_task_v2(
        &self,
        task_id: Uuid,
        update: &TaskUpdate,
    ) -> Result<TaskV2, StoreError> {
        let existing = self.get_task_v2(task_id).await?;

        let title = update.title.as_deref().unwrap_or(&existing.title);
        let description = update
            .description
            .as_deref()
            .or(existing.description.as_deref());
        let completed = update.completed.unwrap_or(existing.completed);
        let now = Utc::now();

        let task = sqlx::query_as::<_, TaskV2>(
            "UPDATE tasks_v2
             SET title = ?1, description = ?2, completed = ?3, updated_at = ?4
             WHERE id = ?5
             RETURNING id, title, description, completed, created_at, updated_at",
        )
        .bind(title)
        .bind(description)
        .bind(completed)
        .bind(now)
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;
        Ok(task)
    }

    /// Delete one v2 task; `NotFound` if the id is absent.
    pub async fn delete_task_v2(&self, task_id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM tasks_v2 WHERE id = ?1")
            .bind(task_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
