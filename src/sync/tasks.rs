//! Task reconciliation: incremental pull, parent-aware push, deferred
//! remote deletions, and read accessors for local task data.

use std::collections::HashSet;

use anyhow::Result;
use log::{debug, info, warn};
use sea_orm::{ActiveValue, IntoActiveModel, TransactionTrait};
use uuid::Uuid;

use crate::entities::{pending_deletion, task, task_list};
use crate::ordering::SortMode;
use crate::remote::{InsertTaskArgs, RemoteError, TaskQuery};
use crate::repositories::{PendingDeletionRepository, TaskRepository};
use crate::sync::SyncService;

impl SyncService {
    /// Retrieves all tasks of a list from local storage, position order.
    pub async fn get_tasks_for_list(&self, list_uuid: &Uuid) -> Result<Vec<task::Model>> {
        let storage = self.storage().lock().await;
        TaskRepository::get_for_list(&storage.conn, list_uuid).await
    }

    /// Get a single task by local id.
    pub async fn get_task(&self, task_uuid: &Uuid) -> Result<Option<task::Model>> {
        let storage = self.storage().lock().await;
        TaskRepository::get_by_id(&storage.conn, task_uuid).await
    }

    /// Merge one list's remote tasks into the local store, fetched
    /// incrementally since the last successful pass (`None` fetches all).
    ///
    /// Positions of already-synced tasks are left untouched on pull; newly
    /// pulled tasks carry the remote position. A non-manual sort mode
    /// triggers a list-wide recomputation afterwards.
    pub(super) async fn pull_tasks_for_list(
        &self,
        list: &task_list::Model,
        since: Option<i64>,
    ) -> Result<()> {
        let Some(remote_list_id) = &list.remote_id else {
            return Ok(());
        };

        let remote_tasks = self
            .fetch_all_remote_tasks(
                remote_list_id,
                TaskQuery {
                    show_completed: true,
                    show_hidden: true,
                    updated_min: since,
                    ..TaskQuery::default()
                },
            )
            .await
            .map_err(|e| anyhow::anyhow!("remote task listing failed: {e}"))?;
        debug!("Pulled {} changed tasks for '{}'", remote_tasks.len(), list.title);

        let storage = self.storage().lock().await;
        let txn = storage.conn.begin().await?;

        // First pass: upsert every task without local parent links.
        for remote in &remote_tasks {
            match TaskRepository::get_by_remote_id(&txn, &remote.id).await? {
                None => {
                    let local = task::ActiveModel {
                        uuid: ActiveValue::Set(Uuid::new_v4()),
                        remote_id: ActiveValue::Set(Some(remote.id.clone())),
                        title: ActiveValue::Set(remote.title.clone()),
                        notes: ActiveValue::Set(remote.notes.clone()),
                        due_date: ActiveValue::Set(remote.due_date.clone()),
                        is_completed: ActiveValue::Set(remote.is_completed),
                        completed_ms: ActiveValue::Set(remote.completed_ms),
                        updated_ms: ActiveValue::Set(remote.updated_ms),
                        position: ActiveValue::Set(remote.position.clone()),
                        list_uuid: ActiveValue::Set(list.uuid),
                        parent_uuid: ActiveValue::Set(None),
                        remote_parent_id: ActiveValue::Set(remote.parent_id.clone()),
                    };
                    TaskRepository::insert(&txn, local).await?;
                }
                Some(local) => {
                    // Remote wins on pull; position stays as locally computed.
                    let mut active: task::ActiveModel = local.into_active_model();
                    active.title = ActiveValue::Set(remote.title.clone());
                    active.notes = ActiveValue::Set(remote.notes.clone());
                    active.due_date = ActiveValue::Set(remote.due_date.clone());
                    active.is_completed = ActiveValue::Set(remote.is_completed);
                    active.completed_ms = ActiveValue::Set(remote.completed_ms);
                    active.updated_ms = ActiveValue::Set(remote.updated_ms);
                    active.remote_parent_id = ActiveValue::Set(remote.parent_id.clone());
                    TaskRepository::update(&txn, active).await?;
                }
            }
        }

        // Second pass: resolve parent links to local ids, now that every
        // parent reconciled in this pass is present.
        for remote in &remote_tasks {
            let Some(child) = TaskRepository::get_by_remote_id(&txn, &remote.id).await? else {
                continue;
            };
            let parent_uuid = match &remote.parent_id {
                Some(parent_remote_id) => TaskRepository::get_by_remote_id(&txn, parent_remote_id)
                    .await?
                    .map(|p| p.uuid),
                None => None,
            };
            if child.parent_uuid != parent_uuid {
                let mut active: task::ActiveModel = child.into_active_model();
                active.parent_uuid = ActiveValue::Set(parent_uuid);
                TaskRepository::update(&txn, active).await?;
            }
        }

        txn.commit().await?;

        let mode = list.sort_mode()?;
        if mode != SortMode::Manual {
            let tasks = TaskRepository::get_for_list(&storage.conn, &list.uuid).await?;
            Self::apply_reindex(&storage.conn, &tasks, mode).await?;
        }

        Ok(())
    }

    /// Insert every local-only task of one list remotely, parents strictly
    /// before children. A parent whose insert fails takes its whole subtree
    /// out of this pass; siblings and other subtrees continue.
    pub(super) async fn push_tasks_for_list(&self, list: &task_list::Model) -> Result<()> {
        let Some(list_remote_id) = list.remote_id.clone() else {
            // The list itself has not been pushed yet; its tasks wait.
            return Ok(());
        };

        let storage = self.storage().lock().await;
        let mut remaining = TaskRepository::get_local_only(&storage.conn, &list.uuid).await?;
        if remaining.is_empty() {
            return Ok(());
        }

        let mut failed: HashSet<Uuid> = HashSet::new();
        loop {
            let mut deferred: Vec<task::Model> = Vec::new();
            let mut progressed = false;

            for local in std::mem::take(&mut remaining) {
                // Resolve the parent's remote id; a still-unpushed parent
                // defers the child to a later round of this pass.
                let parent_remote_id = match local.parent_uuid {
                    None => None,
                    Some(parent_uuid) if failed.contains(&parent_uuid) => {
                        debug!("Skipping '{}': parent push failed", local.title);
                        failed.insert(local.uuid);
                        continue;
                    }
                    Some(parent_uuid) => {
                        match TaskRepository::get_by_id(&storage.conn, &parent_uuid).await? {
                            Some(parent) => match parent.remote_id {
                                Some(remote_id) => Some(remote_id),
                                None => {
                                    deferred.push(local);
                                    continue;
                                }
                            },
                            // Parent vanished mid-pass; push as a root task.
                            None => None,
                        }
                    }
                };

                let previous_id = TaskRepository::previous_sibling(&storage.conn, &local)
                    .await?
                    .and_then(|p| p.remote_id);

                let args = InsertTaskArgs {
                    title: local.title.clone(),
                    notes: local.notes.clone(),
                    due_date: local.due_date.clone(),
                    is_completed: local.is_completed,
                    completed_ms: local.completed_ms,
                };
                match self
                    .remote()
                    .insert_task(&list_remote_id, args, parent_remote_id.as_deref(), previous_id.as_deref())
                    .await
                {
                    Ok(created) => {
                        progressed = true;
                        info!("⬆️ Pushed task '{}' -> {}", local.title, created.id);
                        let mut active: task::ActiveModel = local.into_active_model();
                        active.remote_id = ActiveValue::Set(Some(created.id));
                        active.remote_parent_id = ActiveValue::Set(created.parent_id);
                        active.updated_ms = ActiveValue::Set(created.updated_ms);
                        TaskRepository::update(&storage.conn, active).await?;
                    }
                    Err(e) => {
                        warn!("⚠️ Failed to push task '{}', will retry next pass: {e}", local.title);
                        failed.insert(local.uuid);
                    }
                }
            }

            if deferred.is_empty() || !progressed {
                for local in deferred {
                    debug!("Task '{}' stays local-only until its parent is pushed", local.title);
                }
                break;
            }
            remaining = deferred;
        }

        Ok(())
    }

    /// Replay tombstoned deletions against the remote. A counterpart that is
    /// already gone resolves the tombstone as well; transport failures keep
    /// it for the next pass.
    pub(super) async fn push_deletions(&self) {
        let storage = self.storage().lock().await;
        let tombstones = match PendingDeletionRepository::get_all(&storage.conn).await {
            Ok(tombstones) => tombstones,
            Err(e) => {
                warn!("⚠️ Failed to read pending deletions: {e}");
                return;
            }
        };

        for tombstone in tombstones {
            let outcome = if tombstone.kind == pending_deletion::KIND_LIST {
                self.remote().delete_task_list(&tombstone.remote_id).await
            } else {
                match &tombstone.list_remote_id {
                    Some(list_id) => self.remote().delete_task(list_id, &tombstone.remote_id).await,
                    None => Err(RemoteError::InvalidData(
                        "task tombstone without a list".to_string(),
                    )),
                }
            };

            match outcome {
                Ok(()) | Err(RemoteError::NotFound(_)) | Err(RemoteError::InvalidData(_)) => {
                    if let Err(e) =
                        PendingDeletionRepository::resolve(&storage.conn, &tombstone.uuid).await
                    {
                        warn!("⚠️ Failed to drop tombstone {}: {e}", tombstone.remote_id);
                    }
                }
                Err(e) => {
                    warn!(
                        "⚠️ Remote deletion of {} failed, will retry next pass: {e}",
                        tombstone.remote_id
                    );
                }
            }
        }
    }
}
