//! Stale-entity cleanup.
//!
//! A local entity is stale when it carries a remote id that is absent from
//! the authoritative remote id set. Only confirmed-absent entities are ever
//! pruned, and only when cleanup is explicitly requested; local-only entities
//! are never deleted speculatively.

use anyhow::Result;
use log::{error, info};

use crate::remote::{RemoteTaskList, TaskQuery};
use crate::repositories::{TaskListRepository, TaskRepository};
use crate::sync::SyncService;

impl SyncService {
    /// Standalone cleanup entry point: re-fetch the authoritative remote id
    /// sets and remove every local entity whose remote counterpart no longer
    /// exists.
    pub async fn clean_stale_tasks(&self) -> Result<()> {
        let remote_lists = self
            .fetch_all_remote_lists()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to fetch task lists: {e}"))?;
        self.clean_stale(&remote_lists).await?;
        self.publish_snapshot().await?;
        Ok(())
    }

    /// Prune stale lists, then stale tasks per surviving list. Task pruning
    /// is scoped per list: a list's tasks are only compared against that
    /// list's own remote task set, fetched with deleted and hidden entries
    /// included so the set is authoritative.
    pub(super) async fn clean_stale(&self, remote_lists: &[RemoteTaskList]) -> Result<()> {
        let storage = self.storage().lock().await;

        let keep_lists: Vec<String> = remote_lists.iter().map(|l| l.id.clone()).collect();
        let removed = TaskListRepository::delete_stale(&storage.conn, &keep_lists).await?;
        if removed > 0 {
            info!("🧹 Removed {removed} stale task lists");
        }

        for list in TaskListRepository::get_all(&storage.conn).await? {
            let Some(remote_list_id) = &list.remote_id else {
                continue;
            };
            let remote_tasks = match self
                .fetch_all_remote_tasks(
                    remote_list_id,
                    TaskQuery {
                        show_deleted: true,
                        show_hidden: true,
                        show_completed: true,
                        ..TaskQuery::default()
                    },
                )
                .await
            {
                Ok(tasks) => tasks,
                Err(e) => {
                    // Containment: an unreachable list must not trigger
                    // deletions, nor block cleanup of its siblings.
                    error!("❌ Skipping stale check for '{}': {e}", list.title);
                    continue;
                }
            };

            // Only live remote entries keep their local counterpart.
            let keep_tasks: Vec<String> = remote_tasks
                .iter()
                .filter(|t| !t.deleted)
                .map(|t| t.id.clone())
                .collect();
            let removed = TaskRepository::delete_stale(&storage.conn, &list.uuid, &keep_tasks).await?;
            if removed > 0 {
                info!("🧹 Removed {removed} stale tasks from '{}'", list.title);
            }
        }

        Ok(())
    }
}
