//! Task-list reconciliation and local list operations.

use anyhow::Result;
use log::{info, warn};
use sea_orm::{ActiveValue, IntoActiveModel, TransactionTrait};
use uuid::Uuid;

use crate::entities::task_list;
use crate::ordering::SortMode;
use crate::remote::InsertListArgs;
use crate::repositories::{PendingDeletionRepository, TaskListRepository};
use crate::storage::LocalStorage;
use crate::sync::SyncService;
use crate::utils::datetime;

impl SyncService {
    /// Retrieves all task lists from local storage.
    pub async fn get_lists(&self) -> Result<Vec<task_list::Model>> {
        let storage = self.storage().lock().await;
        TaskListRepository::get_all(&storage.conn).await
    }

    /// Get a single task list by local id.
    pub async fn get_list(&self, list_uuid: &Uuid) -> Result<Option<task_list::Model>> {
        let storage = self.storage().lock().await;
        TaskListRepository::get_by_id(&storage.conn, list_uuid).await
    }

    /// Create a local-only task list; it is pushed on the next sync pass.
    pub async fn create_list(&self, title: &str) -> Result<Uuid> {
        let uuid = Uuid::new_v4();
        {
            let storage = self.storage().lock().await;
            let list = task_list::ActiveModel {
                uuid: ActiveValue::Set(uuid),
                remote_id: ActiveValue::Set(None),
                title: ActiveValue::Set(title.to_string()),
                updated_ms: ActiveValue::Set(datetime::now_ms()),
                sorting: ActiveValue::Set(SortMode::Manual.as_str().to_string()),
            };
            TaskListRepository::insert(&storage.conn, list).await?;
        }
        self.publish_snapshot().await?;
        Ok(uuid)
    }

    /// Rename a task list locally.
    pub async fn rename_list(&self, list_uuid: &Uuid, title: &str) -> Result<()> {
        {
            let storage = self.storage().lock().await;
            let Some(list) = TaskListRepository::get_by_id(&storage.conn, list_uuid).await? else {
                anyhow::bail!("Task list not found: {list_uuid}");
            };
            let mut active: task_list::ActiveModel = list.into_active_model();
            active.title = ActiveValue::Set(title.to_string());
            active.updated_ms = ActiveValue::Set(datetime::now_ms());
            TaskListRepository::update(&storage.conn, active).await?;
        }
        self.publish_snapshot().await?;
        Ok(())
    }

    /// Delete a task list and its tasks locally. If the list was synced, the
    /// remote deletion is replayed on the next sync pass.
    pub async fn delete_list(&self, list_uuid: &Uuid) -> Result<()> {
        {
            let storage = self.storage().lock().await;
            let Some(list) = TaskListRepository::get_by_id(&storage.conn, list_uuid).await? else {
                anyhow::bail!("Task list not found: {list_uuid}");
            };
            let txn = storage.conn.begin().await?;
            if let Some(remote_id) = &list.remote_id {
                PendingDeletionRepository::record_list(&txn, remote_id).await?;
            }
            TaskListRepository::delete(&txn, list_uuid).await?;
            txn.commit().await?;
        }
        self.publish_snapshot().await?;
        Ok(())
    }

    /// Merge remote lists into the local store: unknown remote ids become new
    /// local lists, known ones are overwritten when the remote side carries a
    /// newer modification instant. Returns the local models of all reconciled
    /// lists, for the task pull.
    pub(super) async fn pull_lists(
        &self,
        storage: &LocalStorage,
        remote_lists: &[crate::remote::RemoteTaskList],
    ) -> Result<Vec<task_list::Model>> {
        let txn = storage.conn.begin().await?;
        for remote in remote_lists {
            match TaskListRepository::get_by_remote_id(&txn, &remote.id).await? {
                None => {
                    let list = task_list::ActiveModel {
                        uuid: ActiveValue::Set(Uuid::new_v4()),
                        remote_id: ActiveValue::Set(Some(remote.id.clone())),
                        title: ActiveValue::Set(remote.title.clone()),
                        updated_ms: ActiveValue::Set(remote.updated_ms),
                        sorting: ActiveValue::Set(SortMode::Manual.as_str().to_string()),
                    };
                    TaskListRepository::insert(&txn, list).await?;
                }
                Some(local) if remote.updated_ms > local.updated_ms => {
                    let mut active: task_list::ActiveModel = local.into_active_model();
                    active.title = ActiveValue::Set(remote.title.clone());
                    active.updated_ms = ActiveValue::Set(remote.updated_ms);
                    TaskListRepository::update(&txn, active).await?;
                }
                Some(_) => {}
            }
        }
        txn.commit().await?;

        let mut reconciled = Vec::with_capacity(remote_lists.len());
        for remote in remote_lists {
            if let Some(local) = TaskListRepository::get_by_remote_id(&storage.conn, &remote.id).await? {
                reconciled.push(local);
            }
        }
        Ok(reconciled)
    }

    /// Insert every local-only list remotely. On success the local record is
    /// promoted with the assigned remote id, and the remote-assigned
    /// modification instant becomes authoritative so both sides stay
    /// comparable on the next pull. A failed insert leaves the list
    /// local-only for the next pass.
    pub(super) async fn push_lists(&self) -> Result<()> {
        let local_only = {
            let storage = self.storage().lock().await;
            TaskListRepository::get_local_only(&storage.conn).await?
        };

        for list in local_only {
            match self
                .remote()
                .insert_task_list(InsertListArgs {
                    title: list.title.clone(),
                })
                .await
            {
                Ok(created) => {
                    info!("⬆️ Pushed list '{}' -> {}", list.title, created.id);
                    let storage = self.storage().lock().await;
                    let mut active: task_list::ActiveModel = list.into_active_model();
                    active.remote_id = ActiveValue::Set(Some(created.id));
                    active.updated_ms = ActiveValue::Set(created.updated_ms);
                    TaskListRepository::update(&storage.conn, active).await?;
                }
                Err(e) => {
                    warn!("⚠️ Failed to push list '{}', will retry next pass: {e}", list.title);
                }
            }
        }
        Ok(())
    }
}
