// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Request validation for task payloads and query parameters.
//!
//! Constraints are enforced here, before anything reaches the store:
//! - `title`: required, trimmed length 1–255 characters
//! - `description`: optional, at most 1000 (Task) or 10000 (TaskV2) characters
//! - `skip` >= 0, `limit` in [1, 1000]; out-of-range values fail rather than
//!   being clamped
//! - `task_id`: non-negative
//!
//! Violations are reported as a list of field-level errors, never as a 5xx.

use crate::task::{TaskCreate, TaskUpdate};
use thiserror::Error;
use tracing::debug;

/// Maximum trimmed title length in characters.
pub const TITLE_MAX: usize = 255;

/// Maximum description length for `Task` records.
pub const TASK_DESCRIPTION_MAX: usize = 1000;

/// Maximum description length for `TaskV2` records.
pub const TASK_V2_DESCRIPTION_MAX: usize = 10_000;

/// Maximum page size for list queries.
pub const LIST_LIMIT_MAX: i64 = 1000;

/// A single field-level constraint violation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title must be between 1 and {TITLE_MAX} characters after trimming, got {len}")]
    TitleLength { len: usize },

    #[error("description must be at most {max} characters, got {len}")]
    DescriptionTooLong { len: usize, max: usize },

    #[error("skip must be non-negative, got {0}")]
    SkipNegative(i64),

    #[error("limit must be between 1 and {LIST_LIMIT_MAX}, got {0}")]
    LimitOutOfRange(i64),

    #[error("task_id must be non-negative, got {0}")]
    TaskIdNegative(i64),
}

impl ValidationError {
    /// Name of the offending field, for structured error bodies.
    pub fn field(&self) -> &'static str {
        match self {
            Self::TitleLength { .. } => "title",
            Self::DescriptionTooLong { .. } => "description",
            Self::SkipNegative(_) => "skip",
            Self::LimitOutOfRange(_) => "limit",
            Self::TaskIdNegative(_) => "task_id",
        }
    }
}

/// Validator for task payloads.
///
/// The two record families share every constraint except the description
/// bound, so a validator is constructed per family.
#[derive(Debug, Clone, Copy)]
pub struct TaskValidator {
    description_max: usize,
}

impl TaskValidator {
    /// Validator for `Task` records (description <= 1000 chars).
    pub fn for_tasks() -> Self {
        Self {
            description_max: TASK_DESCRIPTION_MAX,
        }
    }

    /// Validator for `TaskV2` records (description <= 10000 chars).
    pub fn for_tasks_v2() -> Self {
        Self {
            description_max: TASK_V2_DESCRIPTION_MAX,
        }
    }

    fn check_title(&self, title: &str, violations: &mut Vec<ValidationError>) {
        let len = title.trim().chars().count();
        if len < 1 || len > TITLE_MAX {
            debug!(len, "title length out of range");
            violations.push(ValidationError::TitleLength { len });
        }
    }

    fn check_description(&self, description: &str, violations: &mut Vec<ValidationError>) {
        let len = description.chars().count();
        if len > self.description_max {
            debug!(len, max = self.description_max, "description too long");
            violations.push(ValidationError::DescriptionTooLong {
                len,
                max: self.description_max,
            });
        }
    }

    /// Validate a creation payload.
    pub fn validate_create(&self, payload: &TaskCreate) -> Result<(), Vec<ValidationError>> {
        let mut violations = Vec::new();
        self.check_title(&payload.title, &mut violations);
        if let Some(description) = &payload.description {
            self.check_description(description, &mut violations);
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// Validate a partial-update payload. Absent fields are not checked.
    pub fn validate_update(&self, payload: &TaskUpdate) -> Result<(), Vec<ValidationError>> {
        let mut violations = Vec::new();
        if let Some(title) = &payload.title {
            self.check_title(title, &mut violations);
        }
        if let Some(description) = &payload.description {
            self.check_description(description, &mut violations);
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Validate list-query pagination parameters.
pub fn validate_pagination(skip: i64, limit: i64) -> Result<(), Vec<ValidationError>> {
    let mut violations = Vec::new();
    if skip < 0 {
        violations.push(ValidationError::SkipNegative(skip));
    }
    if limit < 1 || limit > LIST_LIMIT_MAX {
        violations.push(ValidationError::LimitOutOfRange(limit));
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Validate an integer `task_id` path parameter.
pub fn validate_task_id(task_id: i64) -> Result<(), Vec<ValidationError>> {
    if task_id < 0 {
        Err(vec![ValidationError::TaskIdNegative(task_id)])
    } else {
        Ok(())
    }
}
