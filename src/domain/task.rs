//! Task domain model.
//!
//! This module contains the Task Record and the value objects it is built
//! from. Validation lives here so that every store backend enforces the same
//! rules before anything is persisted.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Maximum length of a task text, in characters, after trimming.
pub const MAX_TEXT_LENGTH: usize = 200;

// =============================================================================
// Validation Errors
// =============================================================================

/// Reasons a task text is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Text is missing, empty, or whitespace only.
    #[error("Todo text is required")]
    EmptyText,

    /// Text is longer than [`MAX_TEXT_LENGTH`] after trimming.
    #[error("Todo text cannot exceed {max} characters")]
    TextTooLong { length: usize, max: usize },
}

/// Error returned when a string is not a valid task identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid task id: {0}")]
pub struct TaskIdParseError(String);

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Unique identifier for a task.
///
/// Wraps a time-ordered UUID (v7), so identifiers generated later sort later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a `TaskId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Generates a new `TaskId` with a time-ordered UUID (v7).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = TaskIdParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| TaskIdParseError(value.to_string()))
    }
}

/// The validated text of a task.
///
/// Construction trims the input and enforces the non-empty and length rules,
/// so a `TaskText` that exists is always valid. Deserialization goes through
/// the same check, which means records read back from a store are
/// re-validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskText(String);

impl TaskText {
    /// Trims and validates raw input.
    ///
    /// # Errors
    ///
    /// - [`TaskValidationError::EmptyText`] if nothing is left after trimming
    /// - [`TaskValidationError::TextTooLong`] if more than [`MAX_TEXT_LENGTH`]
    ///   characters remain
    pub fn parse(raw: &str) -> Result<Self, TaskValidationError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(TaskValidationError::EmptyText);
        }

        let length = trimmed.chars().count();
        if length > MAX_TEXT_LENGTH {
            return Err(TaskValidationError::TextTooLong {
                length,
                max: MAX_TEXT_LENGTH,
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Returns the text as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TaskText {
    type Error = TaskValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TaskText> for String {
    fn from(text: TaskText) -> Self {
        text.0
    }
}

impl std::fmt::Display for TaskText {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// A timestamp wrapper for `DateTime<Utc>` with millisecond precision.
///
/// Sub-millisecond digits are dropped on construction so the value that is
/// compared, persisted and serialized is always the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a `Timestamp` from a `DateTime<Utc>`, truncated to milliseconds.
    #[must_use]
    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime.trunc_subsecs(3))
    }

    /// Returns the inner `DateTime<Utc>`.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the current time as a `Timestamp`.
    #[must_use]
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Returns `self` if it is strictly after `previous`, otherwise one
    /// millisecond after `previous`.
    #[must_use]
    pub fn strictly_after(self, previous: Self) -> Self {
        if self > previous {
            self
        } else {
            Self(previous.0 + TimeDelta::milliseconds(1))
        }
    }

    /// Formats as RFC 3339 with millisecond precision, e.g.
    /// `2024-05-01T12:30:00.125Z`.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.to_rfc3339())
    }
}

// =============================================================================
// Task Patch
// =============================================================================

/// A partial update to a task.
///
/// Fields left as `None` are not touched. The text is kept raw here and is
/// validated when the patch is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// Replacement text.
    pub text: Option<String>,
    /// Replacement completion flag.
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Creates an empty patch.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            text: None,
            completed: None,
        }
    }

    /// Sets the replacement text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the replacement completion flag.
    #[must_use]
    pub const fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }
}

// =============================================================================
// Task
// =============================================================================

/// A Task Record: the sole persisted entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier, assigned at creation.
    pub task_id: TaskId,
    /// Validated, trimmed text.
    pub text: TaskText,
    /// Whether the task is done.
    pub completed: bool,
    /// Timestamp when the task was created.
    pub created_at: Timestamp,
    /// Timestamp when the task was last updated.
    pub updated_at: Timestamp,
}

impl Task {
    /// Creates a new, not yet completed task.
    ///
    /// `created_at` and `updated_at` both start at `timestamp`.
    #[must_use]
    pub const fn new(task_id: TaskId, text: TaskText, timestamp: Timestamp) -> Self {
        Self {
            task_id,
            text,
            completed: false,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Applies a patch, returning the updated task.
    ///
    /// The whole patch is rejected when its text is invalid; nothing is
    /// applied in that case. On success `updated_at` is moved strictly past
    /// its previous value.
    ///
    /// # Errors
    ///
    /// Returns [`TaskValidationError`] if `patch.text` fails validation.
    pub fn apply(self, patch: &TaskPatch, now: Timestamp) -> Result<Self, TaskValidationError> {
        let text = match patch.text.as_deref() {
            Some(raw) => TaskText::parse(raw)?,
            None => self.text,
        };

        Ok(Self {
            text,
            completed: patch.completed.unwrap_or(self.completed),
            updated_at: now.strictly_after(self.updated_at),
            ..self
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
