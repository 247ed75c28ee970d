//! Remote task service contract.
//!
//! This module defines the interface the sync engine requires from the remote
//! REST service, along with the wire-shaped data types and error taxonomy.
//! Transport, retries and auth refresh live behind implementations of
//! [`RemoteApi`] and are out of the engine's scope.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Errors surfaced by remote operations.
///
/// Transport failures are recoverable: the affected unit of work is retried
/// on the next sync pass and local state is never corrupted by them.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Remote error: {0}")]
    Other(String),
}

/// One page of a paginated listing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

/// Remote task list representation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemoteTaskList {
    pub id: String,
    pub title: String,
    /// Last-modification instant assigned by the remote service, epoch ms.
    pub updated_ms: i64,
}

/// Remote task representation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemoteTask {
    pub id: String,
    pub title: String,
    pub notes: Option<String>,
    /// Remote id of the parent task, if any.
    pub parent_id: Option<String>,
    pub position: String,
    pub due_date: Option<String>,
    pub is_completed: bool,
    pub completed_ms: Option<i64>,
    pub updated_ms: i64,
    pub deleted: bool,
    pub hidden: bool,
}

/// Arguments for inserting a new task list.
#[derive(Clone, Debug, Default)]
pub struct InsertListArgs {
    pub title: String,
}

/// Arguments for inserting a new task.
#[derive(Clone, Debug, Default)]
pub struct InsertTaskArgs {
    pub title: String,
    pub notes: Option<String>,
    pub due_date: Option<String>,
    pub is_completed: bool,
    pub completed_ms: Option<i64>,
}

/// Pagination window for task-list listings.
#[derive(Clone, Debug, Default)]
pub struct PageQuery {
    pub max_results: Option<u32>,
    pub page_token: Option<String>,
}

/// Filters for task listings.
#[derive(Clone, Debug, Default)]
pub struct TaskQuery {
    pub show_deleted: bool,
    pub show_hidden: bool,
    pub show_completed: bool,
    /// Lower bound on the last-modification instant, epoch ms.
    pub updated_min: Option<i64>,
    pub completed_min: Option<i64>,
    pub completed_max: Option<i64>,
    pub due_min: Option<String>,
    pub due_max: Option<String>,
    pub max_results: Option<u32>,
    pub page_token: Option<String>,
}

/// Contract the sync engine requires from the remote service.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// List task lists, one page at a time.
    async fn list_task_lists(&self, page: PageQuery) -> Result<Page<RemoteTaskList>, RemoteError>;

    /// Insert a task list; the returned value carries the assigned id and
    /// the remote-authoritative modification instant.
    async fn insert_task_list(&self, args: InsertListArgs) -> Result<RemoteTaskList, RemoteError>;

    /// Delete a task list and everything in it.
    async fn delete_task_list(&self, list_id: &str) -> Result<(), RemoteError>;

    /// List tasks of one list, one page at a time.
    async fn list_tasks(&self, list_id: &str, query: TaskQuery) -> Result<Page<RemoteTask>, RemoteError>;

    /// Insert a task, optionally under a parent task and after a previous
    /// sibling; the returned value carries the assigned id and instant.
    async fn insert_task(
        &self,
        list_id: &str,
        args: InsertTaskArgs,
        parent_id: Option<&str>,
        previous_id: Option<&str>,
    ) -> Result<RemoteTask, RemoteError>;

    /// Delete a single task.
    async fn delete_task(&self, list_id: &str, task_id: &str) -> Result<(), RemoteError>;

    /// Remove all completed tasks from a list.
    async fn clear_completed(&self, list_id: &str) -> Result<(), RemoteError>;
}
