//! Synchronization service module.
//!
//! This module provides the [`SyncService`] struct, the engine's primary data
//! layer: it reconciles the local store with the remote task service and hosts
//! the local hierarchy mutation operations. A sync pass pulls remote changes
//! since the last successful pass, merges them locally (remote wins on pull),
//! pushes local-only entities to the remote, and optionally prunes local
//! entities whose remote counterpart is confirmed gone.
//!
//! Failure semantics: a transport failure while listing remote lists aborts
//! the whole pass with nothing written; a failure while pushing one entity is
//! contained to that entity and its descendants, which stay local-only and
//! are retried on the next pass.

pub mod cleanup;
pub mod hierarchy;
pub mod lists;
pub mod tasks;

use std::sync::Arc;

use anyhow::Result;
use log::{error, info};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};

use crate::config::Config;
use crate::entities::{task, task_list};
use crate::remote::{Page, PageQuery, RemoteApi, RemoteError, RemoteTask, RemoteTaskList, TaskQuery};
use crate::repositories::{TaskListRepository, TaskRepository};
use crate::storage::LocalStorage;
use crate::sync::hierarchy::IndentPlacement;
use crate::utils::datetime;

/// One list with its tasks in position order, as published to observers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListWithTasks {
    pub list: task_list::Model,
    pub tasks: Vec<task::Model>,
}

/// Full-state snapshot published after every committed mutation and sync pass.
pub type Snapshot = Vec<ListWithTasks>;

/// Represents the current status of a synchronization operation.
#[derive(Debug, Clone)]
pub enum SyncStatus {
    /// No sync operation is running.
    Idle,
    /// A sync operation is currently in progress.
    InProgress,
    /// The last sync operation completed successfully.
    Success,
    /// The last sync operation failed with an error.
    Error {
        /// Human-readable error message describing what went wrong.
        message: String,
    },
}

/// Service that reconciles the local store with a remote task service and
/// applies hierarchy mutations locally.
///
/// Mutations and sync passes are expected to run one at a time; overlapping
/// `sync()` calls short-circuit to [`SyncStatus::InProgress`], and all local
/// writes serialize through the storage mutex.
#[derive(Clone)]
pub struct SyncService {
    storage: Arc<Mutex<LocalStorage>>,
    remote: Arc<dyn RemoteApi>,
    /// Instant of the last fully successful pull phase, epoch ms. Reset to
    /// `None` at construction; advanced only after the pull phase completes
    /// for all lists without a list-level abort.
    last_synced: Arc<Mutex<Option<i64>>>,
    sync_in_progress: Arc<Mutex<bool>>,
    snapshots: watch::Sender<Snapshot>,
    page_size: u32,
    indent_placement: IndentPlacement,
    /// Configured request to run cleanup on every pass, folded into the
    /// per-call `delete_stale` argument.
    delete_stale_on_sync: bool,
}

impl SyncService {
    /// Create a service over storage chosen by the configuration (file-backed
    /// when a database path is configured, in-memory otherwise).
    pub async fn new(remote: Arc<dyn RemoteApi>, config: &Config) -> Result<Self> {
        let storage = match &config.storage.database_path {
            Some(path) => LocalStorage::open(path).await?,
            None => LocalStorage::new().await?,
        };
        Ok(Self::with_storage(storage, remote, config))
    }

    /// Create a service over an already-initialized storage.
    pub fn with_storage(storage: LocalStorage, remote: Arc<dyn RemoteApi>, config: &Config) -> Self {
        let (snapshots, _) = watch::channel(Vec::new());
        Self {
            storage: Arc::new(Mutex::new(storage)),
            remote,
            last_synced: Arc::new(Mutex::new(None)),
            sync_in_progress: Arc::new(Mutex::new(false)),
            snapshots,
            page_size: config.sync.page_size,
            indent_placement: config.sync.indent_placement(),
            delete_stale_on_sync: config.sync.delete_stale_on_sync,
        }
    }

    /// Subscribe to full-state snapshots. The current value is the snapshot
    /// as of the last committed mutation.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    /// Checks if a synchronization operation is currently in progress.
    pub async fn is_syncing(&self) -> bool {
        *self.sync_in_progress.lock().await
    }

    /// Instant of the last fully successful pull, if any.
    pub async fn last_synced(&self) -> Option<i64> {
        *self.last_synced.lock().await
    }

    /// Performs a full synchronization pass with the remote service.
    ///
    /// With `delete_stale` (or `sync.delete_stale_on_sync` in the
    /// configuration), the pass ends by pruning local entities whose remote
    /// counterpart is confirmed absent; otherwise nothing is ever deleted
    /// locally.
    pub async fn sync(&self, delete_stale: bool) -> Result<SyncStatus> {
        {
            let mut sync_guard = self.sync_in_progress.lock().await;
            if *sync_guard {
                return Ok(SyncStatus::InProgress);
            }
            *sync_guard = true;
        }

        let result = self
            .perform_sync(delete_stale || self.delete_stale_on_sync)
            .await;

        {
            let mut sync_guard = self.sync_in_progress.lock().await;
            *sync_guard = false;
        }

        result
    }

    /// Internal sync implementation.
    async fn perform_sync(&self, delete_stale: bool) -> Result<SyncStatus> {
        let pass_started = datetime::now_ms();
        let since = self.last_synced().await;
        match since {
            Some(ms) => info!("🔄 Starting sync pass (since {})", datetime::format_ms(ms)),
            None => info!("🔄 Starting full sync pass..."),
        }

        // Step 1: fetch all remote lists. A failure here aborts the whole
        // pass before anything is written locally.
        let remote_lists = match self.fetch_all_remote_lists().await {
            Ok(lists) => {
                info!("✅ Fetched {} task lists from remote", lists.len());
                lists
            }
            Err(e) => {
                error!("❌ Failed to fetch task lists: {e}");
                return Ok(SyncStatus::Error {
                    message: format!("Failed to fetch task lists: {e}"),
                });
            }
        };

        // Step 2: merge remote lists into the local store.
        let synced_lists = {
            let storage = self.storage.lock().await;
            match self.pull_lists(&storage, &remote_lists).await {
                Ok(lists) => lists,
                Err(e) => {
                    error!("❌ Failed to store task lists: {e}");
                    return Ok(SyncStatus::Error {
                        message: format!("Failed to store task lists: {e}"),
                    });
                }
            }
        };

        // Step 3: pull tasks per list, incrementally since the last pass.
        // A failing list does not abort its siblings, but it does hold back
        // the last-sync instant so its changes are re-fetched next time.
        let mut pull_clean = true;
        for list in &synced_lists {
            if let Err(e) = self.pull_tasks_for_list(list, since).await {
                error!("❌ Failed to pull tasks for '{}': {e}", list.title);
                pull_clean = false;
            }
        }

        if pull_clean {
            let mut last = self.last_synced.lock().await;
            *last = Some(pass_started);
        }

        // Replay deferred deletions before inserting, so a recreate of a
        // moved task cannot race its old copy's removal.
        self.push_deletions().await;

        // Steps 4 and 5: push local-only lists, then local-only tasks with
        // parents before children. Failures are contained per subtree.
        if let Err(e) = self.push_lists().await {
            error!("❌ Failed to push local lists: {e}");
            return Ok(SyncStatus::Error {
                message: format!("Failed to push local lists: {e}"),
            });
        }
        let all_lists = {
            let storage = self.storage.lock().await;
            TaskListRepository::get_all(&storage.conn).await?
        };
        for list in &all_lists {
            if let Err(e) = self.push_tasks_for_list(list).await {
                error!("❌ Failed to push tasks for '{}': {e}", list.title);
            }
        }

        // Step 6: optional cleanup. The remote list set is re-fetched so
        // lists pushed earlier in this pass are part of the allowlist.
        if delete_stale {
            match self.fetch_all_remote_lists().await {
                Ok(current_lists) => {
                    if let Err(e) = self.clean_stale(&current_lists).await {
                        error!("❌ Cleanup failed: {e}");
                    }
                }
                Err(e) => error!("❌ Skipping cleanup, remote listing failed: {e}"),
            }
        }

        self.publish_snapshot().await?;
        info!("✅ Sync pass finished");
        Ok(SyncStatus::Success)
    }

    /// Fetch every page of the remote task-list collection.
    pub(super) async fn fetch_all_remote_lists(&self) -> Result<Vec<RemoteTaskList>, RemoteError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page: Page<RemoteTaskList> = self
                .remote
                .list_task_lists(PageQuery {
                    max_results: Some(self.page_size),
                    page_token: page_token.take(),
                })
                .await?;
            items.extend(page.items);
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(items)
    }

    /// Fetch every page of one list's remote tasks.
    pub(super) async fn fetch_all_remote_tasks(
        &self,
        list_id: &str,
        query: TaskQuery,
    ) -> Result<Vec<RemoteTask>, RemoteError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = self
                .remote
                .list_tasks(
                    list_id,
                    TaskQuery {
                        max_results: Some(self.page_size),
                        page_token: page_token.take(),
                        ..query.clone()
                    },
                )
                .await?;
            items.extend(page.items);
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(items)
    }

    pub(super) fn remote(&self) -> &Arc<dyn RemoteApi> {
        &self.remote
    }

    pub(super) fn storage(&self) -> &Arc<Mutex<LocalStorage>> {
        &self.storage
    }

    pub(super) fn indent_placement(&self) -> IndentPlacement {
        self.indent_placement
    }

    /// Read the full state and publish it to snapshot subscribers.
    pub(super) async fn publish_snapshot(&self) -> Result<()> {
        let storage = self.storage.lock().await;
        let lists = TaskListRepository::get_all(&storage.conn).await?;
        let mut snapshot = Vec::with_capacity(lists.len());
        for list in lists {
            let tasks = TaskRepository::get_for_list(&storage.conn, &list.uuid).await?;
            snapshot.push(ListWithTasks { list, tasks });
        }
        // Publishing to zero subscribers is fine.
        let _ = self.snapshots.send(snapshot);
        Ok(())
    }
}
