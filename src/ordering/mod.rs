//! Sibling ordering: position encoding and scope reindexing.
//!
//! Tasks carry an opaque, lexicographically-sortable position string that is
//! unique within their scope (parent list + optional parent task). This module
//! owns the two position encodings (sequential for incomplete tasks,
//! completion-recency for completed tasks) and the reindexer that recomputes
//! dense positions whenever scope membership or manual order changes.

pub mod position;
pub mod reindex;

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How the incomplete tasks of a list are ordered.
///
/// Completed tasks always sort after incomplete ones and are ordered by
/// completion recency regardless of the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Manual,
    DueDate,
    Title,
}

impl SortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Manual => "manual",
            SortMode::DueDate => "due_date",
            SortMode::Title => "title",
        }
    }
}

impl FromStr for SortMode {
    type Err = OrderingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(SortMode::Manual),
            "due_date" => Ok(SortMode::DueDate),
            "title" => Ok(SortMode::Title),
            other => Err(OrderingError::UnknownSortMode(other.to_string())),
        }
    }
}

/// Contract violations in the ordering layer.
///
/// These are programming errors, not recoverable sync conditions: they are
/// surfaced immediately and never retried.
#[derive(Debug, thiserror::Error)]
pub enum OrderingError {
    #[error("completed-task ordering received incomplete task {0}")]
    IncompleteTask(Uuid),

    #[error("unknown sort mode: {0}")]
    UnknownSortMode(String),
}
