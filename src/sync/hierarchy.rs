//! Hierarchy mutation operations.
//!
//! Each operation is a local-only, synchronous state transition followed by a
//! reindex of the affected scope(s), all inside one transaction; none of them
//! talk to the remote service. Remote convergence happens on the next sync
//! pass. Every committed mutation publishes a fresh snapshot.

use std::collections::HashMap;

use anyhow::Result;
use log::debug;
use sea_orm::{ActiveValue, ConnectionTrait, IntoActiveModel, TransactionTrait};
use uuid::Uuid;

use crate::entities::task;
use crate::ordering::position::encode_sequential;
use crate::ordering::reindex::reindex;
use crate::ordering::SortMode;
use crate::repositories::{PendingDeletionRepository, TaskListRepository, TaskRepository};
use crate::sync::SyncService;
use crate::utils::datetime;

/// Where an indented task lands among its new siblings.
///
/// The reference behavior is not conclusively pinned down, so this is a
/// configuration policy rather than hard-coded intent; see DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndentPlacement {
    /// First among the new parent's children.
    Start,
    /// Last among the new parent's children.
    #[default]
    End,
}

impl SyncService {
    /// Write back every position the reindexer changed.
    pub(super) async fn apply_reindex<C>(conn: &C, tasks: &[task::Model], mode: SortMode) -> Result<()>
    where
        C: ConnectionTrait,
    {
        let current: HashMap<Uuid, &task::Model> = tasks.iter().map(|t| (t.uuid, t)).collect();
        for assignment in reindex(tasks, mode) {
            let Some(model) = current.get(&assignment.uuid) else {
                continue;
            };
            if model.position != assignment.position {
                let mut active: task::ActiveModel = (*model).clone().into_active_model();
                active.position = ActiveValue::Set(assignment.position);
                TaskRepository::update(conn, active).await?;
            }
        }
        Ok(())
    }

    /// Create a local-only task at the start of its scope; existing siblings
    /// shift down by one index. Pushed to the remote on the next sync pass.
    pub async fn create_task(
        &self,
        list_uuid: &Uuid,
        parent_uuid: Option<&Uuid>,
        title: &str,
        notes: Option<&str>,
        due_date: Option<&str>,
    ) -> Result<Uuid> {
        if let Some(date) = due_date {
            datetime::parse_date(date)
                .map_err(|e| anyhow::anyhow!("Invalid due date '{date}': {e}"))?;
        }

        let uuid = Uuid::new_v4();
        {
            let storage = self.storage().lock().await;
            let txn = storage.conn.begin().await?;

            let remote_parent_id = match parent_uuid {
                Some(parent_uuid) => {
                    let parent = TaskRepository::get_by_id(&txn, parent_uuid)
                        .await?
                        .ok_or_else(|| anyhow::anyhow!("Parent task not found: {parent_uuid}"))?;
                    if parent.list_uuid != *list_uuid {
                        anyhow::bail!("Parent task belongs to a different list");
                    }
                    parent.remote_id
                }
                None => None,
            };

            let siblings = TaskRepository::get_scope(&txn, list_uuid, parent_uuid).await?;
            let new_task = task::Model {
                uuid,
                remote_id: None,
                title: title.to_string(),
                notes: notes.map(str::to_string),
                due_date: due_date.map(str::to_string),
                is_completed: false,
                completed_ms: None,
                updated_ms: datetime::now_ms(),
                position: encode_sequential(0),
                list_uuid: *list_uuid,
                parent_uuid: parent_uuid.copied(),
                remote_parent_id,
            };
            let active = task::ActiveModel {
                uuid: ActiveValue::Set(new_task.uuid),
                remote_id: ActiveValue::Set(new_task.remote_id.clone()),
                title: ActiveValue::Set(new_task.title.clone()),
                notes: ActiveValue::Set(new_task.notes.clone()),
                due_date: ActiveValue::Set(new_task.due_date.clone()),
                is_completed: ActiveValue::Set(new_task.is_completed),
                completed_ms: ActiveValue::Set(new_task.completed_ms),
                updated_ms: ActiveValue::Set(new_task.updated_ms),
                position: ActiveValue::Set(new_task.position.clone()),
                list_uuid: ActiveValue::Set(new_task.list_uuid),
                parent_uuid: ActiveValue::Set(new_task.parent_uuid),
                remote_parent_id: ActiveValue::Set(new_task.remote_parent_id.clone()),
            };
            TaskRepository::insert(&txn, active).await?;

            // New task first, then the previous order of the scope.
            let mut order = vec![new_task];
            order.extend(siblings);
            Self::apply_reindex(&txn, &order, SortMode::Manual).await?;

            txn.commit().await?;
        }
        self.publish_snapshot().await?;
        Ok(uuid)
    }

    /// Delete a task and its descendants; remaining siblings are compacted.
    pub async fn delete_task(&self, task_uuid: &Uuid) -> Result<()> {
        {
            let storage = self.storage().lock().await;
            let Some(target) = TaskRepository::get_by_id(&storage.conn, task_uuid).await? else {
                anyhow::bail!("Task not found: {task_uuid}");
            };
            let txn = storage.conn.begin().await?;

            // Replay the deletion remotely on the next pass; descendants are
            // tombstoned too so nothing of the subtree can be resurrected by
            // a later pull.
            let list = TaskListRepository::get_by_id(&txn, &target.list_uuid).await?;
            if let Some(list_remote_id) = list.and_then(|l| l.remote_id) {
                let descendants =
                    TaskRepository::descendants(&txn, &target.list_uuid, &target.uuid).await?;
                for model in std::iter::once(&target).chain(descendants.iter()) {
                    if let Some(remote_id) = &model.remote_id {
                        PendingDeletionRepository::record_task(&txn, remote_id, &list_remote_id)
                            .await?;
                    }
                }
            }

            TaskRepository::delete(&txn, task_uuid).await?;

            let remaining =
                TaskRepository::get_scope(&txn, &target.list_uuid, target.parent_uuid.as_ref())
                    .await?;
            Self::apply_reindex(&txn, &remaining, SortMode::Manual).await?;

            txn.commit().await?;
        }
        self.publish_snapshot().await?;
        Ok(())
    }

    /// Mark a task completed; its position becomes derived from the
    /// completion instant and it moves behind all incomplete siblings.
    pub async fn complete_task(&self, task_uuid: &Uuid) -> Result<()> {
        self.set_completion(task_uuid, true).await
    }

    /// Reopen a completed task; it rejoins the incomplete siblings at the
    /// end of their range.
    pub async fn reopen_task(&self, task_uuid: &Uuid) -> Result<()> {
        self.set_completion(task_uuid, false).await
    }

    async fn set_completion(&self, task_uuid: &Uuid, completed: bool) -> Result<()> {
        {
            let storage = self.storage().lock().await;
            let Some(target) = TaskRepository::get_by_id(&storage.conn, task_uuid).await? else {
                anyhow::bail!("Task not found: {task_uuid}");
            };
            if target.is_completed == completed {
                return Ok(());
            }
            let txn = storage.conn.begin().await?;

            let now = datetime::now_ms();
            let mut active: task::ActiveModel = target.clone().into_active_model();
            active.is_completed = ActiveValue::Set(completed);
            active.completed_ms = ActiveValue::Set(completed.then_some(now));
            active.updated_ms = ActiveValue::Set(now);
            TaskRepository::update(&txn, active).await?;

            let scope =
                TaskRepository::get_scope(&txn, &target.list_uuid, target.parent_uuid.as_ref())
                    .await?;
            Self::apply_reindex(&txn, &scope, SortMode::Manual).await?;

            txn.commit().await?;
        }
        self.publish_snapshot().await?;
        Ok(())
    }

    /// Relocate a task to position 0 within its current scope; the other
    /// siblings keep their relative order.
    pub async fn move_to_top(&self, task_uuid: &Uuid) -> Result<()> {
        {
            let storage = self.storage().lock().await;
            let Some(target) = TaskRepository::get_by_id(&storage.conn, task_uuid).await? else {
                anyhow::bail!("Task not found: {task_uuid}");
            };
            let txn = storage.conn.begin().await?;

            let scope =
                TaskRepository::get_scope(&txn, &target.list_uuid, target.parent_uuid.as_ref())
                    .await?;
            let mut order = vec![target.clone()];
            order.extend(scope.into_iter().filter(|t| t.uuid != target.uuid));
            Self::apply_reindex(&txn, &order, SortMode::Manual).await?;

            txn.commit().await?;
        }
        self.publish_snapshot().await?;
        Ok(())
    }

    /// Move a task (with its subtree) to another list, as a root-level task
    /// at the start of the destination. The remote service cannot move tasks
    /// across lists, so the synced identity is tombstoned and the subtree is
    /// re-pushed into the destination list on the next pass.
    pub async fn move_to_list(&self, task_uuid: &Uuid, dest_list_uuid: &Uuid) -> Result<()> {
        {
            let storage = self.storage().lock().await;
            let Some(target) = TaskRepository::get_by_id(&storage.conn, task_uuid).await? else {
                anyhow::bail!("Task not found: {task_uuid}");
            };
            let Some(dest) = TaskListRepository::get_by_id(&storage.conn, dest_list_uuid).await?
            else {
                anyhow::bail!("Task list not found: {dest_list_uuid}");
            };
            let txn = storage.conn.begin().await?;

            // The whole synced subtree is tombstoned, not just the root:
            // a descendant whose old remote copy survives would be pulled
            // back into the source list as a duplicate.
            let source_list = TaskListRepository::get_by_id(&txn, &target.list_uuid).await?;
            let descendants =
                TaskRepository::descendants(&txn, &target.list_uuid, &target.uuid).await?;
            if let Some(list_remote_id) = source_list.and_then(|l| l.remote_id) {
                for model in std::iter::once(&target).chain(descendants.iter()) {
                    if let Some(remote_id) = &model.remote_id {
                        PendingDeletionRepository::record_task(&txn, remote_id, &list_remote_id)
                            .await?;
                    }
                }
            }

            // Descendants follow the list change and shed their remote
            // identity; the old remote subtree dies with its root.
            for descendant in descendants {
                let mut active: task::ActiveModel = descendant.into_active_model();
                active.list_uuid = ActiveValue::Set(dest.uuid);
                active.remote_id = ActiveValue::Set(None);
                active.remote_parent_id = ActiveValue::Set(None);
                TaskRepository::update(&txn, active).await?;
            }

            let now = datetime::now_ms();
            let mut active: task::ActiveModel = target.clone().into_active_model();
            active.list_uuid = ActiveValue::Set(dest.uuid);
            active.parent_uuid = ActiveValue::Set(None);
            active.remote_id = ActiveValue::Set(None);
            active.remote_parent_id = ActiveValue::Set(None);
            active.updated_ms = ActiveValue::Set(now);
            let moved = TaskRepository::update(&txn, active).await?;

            // Close the gap in the source scope.
            let source_scope =
                TaskRepository::get_scope(&txn, &target.list_uuid, target.parent_uuid.as_ref())
                    .await?;
            Self::apply_reindex(&txn, &source_scope, SortMode::Manual).await?;

            // Destination roots: moved task first.
            let dest_roots = TaskRepository::get_scope(&txn, &dest.uuid, None).await?;
            let mut order = vec![moved];
            order.extend(dest_roots.into_iter().filter(|t| t.uuid != target.uuid));
            Self::apply_reindex(&txn, &order, SortMode::Manual).await?;

            txn.commit().await?;
        }
        self.publish_snapshot().await?;
        Ok(())
    }

    /// Re-parent a task under its immediately preceding sibling. The first
    /// task of a scope has nothing to indent under; that is a no-op.
    pub async fn indent_task(&self, task_uuid: &Uuid) -> Result<()> {
        {
            let storage = self.storage().lock().await;
            let Some(target) = TaskRepository::get_by_id(&storage.conn, task_uuid).await? else {
                anyhow::bail!("Task not found: {task_uuid}");
            };
            let Some(new_parent) = TaskRepository::previous_sibling(&storage.conn, &target).await?
            else {
                debug!("'{}' is first in its scope; nothing to indent under", target.title);
                return Ok(());
            };
            let txn = storage.conn.begin().await?;

            let now = datetime::now_ms();
            let mut active: task::ActiveModel = target.clone().into_active_model();
            active.parent_uuid = ActiveValue::Set(Some(new_parent.uuid));
            active.remote_parent_id = ActiveValue::Set(new_parent.remote_id.clone());
            active.updated_ms = ActiveValue::Set(now);
            let moved = TaskRepository::update(&txn, active).await?;

            // New child scope, placement per policy.
            let children = TaskRepository::get_scope(&txn, &target.list_uuid, Some(&new_parent.uuid))
                .await?
                .into_iter()
                .filter(|t| t.uuid != target.uuid)
                .collect::<Vec<_>>();
            let order = match self.indent_placement() {
                IndentPlacement::Start => {
                    let mut order = vec![moved];
                    order.extend(children);
                    order
                }
                IndentPlacement::End => {
                    let mut order = children;
                    order.push(moved);
                    order
                }
            };
            Self::apply_reindex(&txn, &order, SortMode::Manual).await?;

            // Close the gap in the old scope.
            let old_scope =
                TaskRepository::get_scope(&txn, &target.list_uuid, target.parent_uuid.as_ref())
                    .await?;
            Self::apply_reindex(&txn, &old_scope, SortMode::Manual).await?;

            txn.commit().await?;
        }
        self.publish_snapshot().await?;
        Ok(())
    }

    /// Re-parent a task out from under its parent into the parent's own
    /// scope, immediately after the former parent. Root tasks are a no-op.
    pub async fn unindent_task(&self, task_uuid: &Uuid) -> Result<()> {
        {
            let storage = self.storage().lock().await;
            let Some(target) = TaskRepository::get_by_id(&storage.conn, task_uuid).await? else {
                anyhow::bail!("Task not found: {task_uuid}");
            };
            let Some(parent_uuid) = target.parent_uuid else {
                debug!("'{}' is already a root task", target.title);
                return Ok(());
            };
            let Some(parent) = TaskRepository::get_by_id(&storage.conn, &parent_uuid).await? else {
                anyhow::bail!("Parent task not found: {parent_uuid}");
            };
            let txn = storage.conn.begin().await?;

            let now = datetime::now_ms();
            let mut active: task::ActiveModel = target.clone().into_active_model();
            active.parent_uuid = ActiveValue::Set(parent.parent_uuid);
            active.remote_parent_id = ActiveValue::Set(parent.remote_parent_id.clone());
            active.updated_ms = ActiveValue::Set(now);
            let moved = TaskRepository::update(&txn, active).await?;

            // Splice into the parent's scope right behind the parent, using
            // the boundary range queries instead of a full re-sort.
            let before = TaskRepository::tasks_up_to(
                &txn,
                &parent.list_uuid,
                parent.parent_uuid.as_ref(),
                &parent.position,
            )
            .await?;
            let after = TaskRepository::tasks_from(
                &txn,
                &parent.list_uuid,
                parent.parent_uuid.as_ref(),
                &parent.position,
            )
            .await?;

            let mut order: Vec<task::Model> = before
                .into_iter()
                .filter(|t| t.uuid != target.uuid)
                .collect();
            order.push(moved);
            order.extend(
                after
                    .into_iter()
                    .filter(|t| t.uuid != parent.uuid && t.uuid != target.uuid),
            );
            Self::apply_reindex(&txn, &order, SortMode::Manual).await?;

            // Compact the scope the task left.
            let old_scope =
                TaskRepository::get_scope(&txn, &target.list_uuid, Some(&parent_uuid)).await?;
            Self::apply_reindex(&txn, &old_scope, SortMode::Manual).await?;

            txn.commit().await?;
        }
        self.publish_snapshot().await?;
        Ok(())
    }

    /// Change a list's sort mode and recompute all of its positions.
    pub async fn set_sort_mode(&self, list_uuid: &Uuid, mode: SortMode) -> Result<()> {
        {
            let storage = self.storage().lock().await;
            let Some(list) = TaskListRepository::get_by_id(&storage.conn, list_uuid).await? else {
                anyhow::bail!("Task list not found: {list_uuid}");
            };
            let txn = storage.conn.begin().await?;

            let mut active = list.into_active_model();
            active.sorting = ActiveValue::Set(mode.as_str().to_string());
            active.updated_ms = ActiveValue::Set(datetime::now_ms());
            TaskListRepository::update(&txn, active).await?;

            let tasks = TaskRepository::get_for_list(&txn, list_uuid).await?;
            Self::apply_reindex(&txn, &tasks, mode).await?;

            txn.commit().await?;
        }
        self.publish_snapshot().await?;
        Ok(())
    }

    /// The task immediately preceding the given one in manual order within
    /// its scope, or `None` if it is first.
    pub async fn previous_sibling(&self, task_uuid: &Uuid) -> Result<Option<task::Model>> {
        let storage = self.storage().lock().await;
        let Some(target) = TaskRepository::get_by_id(&storage.conn, task_uuid).await? else {
            anyhow::bail!("Task not found: {task_uuid}");
        };
        TaskRepository::previous_sibling(&storage.conn, &target).await
    }

    /// Ordered tasks of a scope with position at or before the reference.
    pub async fn tasks_up_to(
        &self,
        list_uuid: &Uuid,
        parent_uuid: Option<&Uuid>,
        position: &str,
    ) -> Result<Vec<task::Model>> {
        let storage = self.storage().lock().await;
        TaskRepository::tasks_up_to(&storage.conn, list_uuid, parent_uuid, position).await
    }

    /// Ordered tasks of a scope with position at or after the reference.
    pub async fn tasks_from(
        &self,
        list_uuid: &Uuid,
        parent_uuid: Option<&Uuid>,
        position: &str,
    ) -> Result<Vec<task::Model>> {
        let storage = self.storage().lock().await;
        TaskRepository::tasks_from(&storage.conn, list_uuid, parent_uuid, position).await
    }
}
