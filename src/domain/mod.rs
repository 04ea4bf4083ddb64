//! Domain module for task tracking.
//!
//! This module contains the Task Record, its value objects, and the
//! validation rules every store backend shares.

pub mod task;

pub use task::{
    MAX_TEXT_LENGTH, Task, TaskId, TaskIdParseError, TaskPatch, TaskText, TaskValidationError,
    Timestamp,
};
