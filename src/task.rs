// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Task record types and request payloads.
//!
//! Two record families coexist on purpose:
//!
//! - [`Task`]: sequential integer identifier (original shape)
//! - [`TaskV2`]: random 128-bit identifier, mitigating ID enumeration, with a
//!   wider description bound
//!
//! This is a transitional design, not an inconsistency.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A task record keyed by a sequentially assigned integer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A task record keyed by a randomly generated UUID.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaskV2 {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a task (either family).
#[derive(Debug, Clone, Deserialize)]
pub struct TaskCreate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Payload for partially updating a task.
///
/// Only fields present in the request are applied; absent fields keep their
/// stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl TaskUpdate {
    /// True when the payload carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}
