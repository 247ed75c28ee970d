//! Task repository for database operations.
//!
//! Besides plain CRUD this repository owns the position-scoped queries the
//! hierarchy operations rely on: scope listings ordered by position, the
//! previous-sibling lookup, and the boundary range queries.

use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use crate::entities::task;

/// Repository for task-related database operations.
pub struct TaskRepository;

impl TaskRepository {
    /// Filter matching one ordering scope `(list_uuid, parent_uuid)`.
    fn scope_filter(list_uuid: &Uuid, parent_uuid: Option<&Uuid>) -> Condition {
        let cond = Condition::all().add(task::Column::ListUuid.eq(*list_uuid));
        match parent_uuid {
            Some(parent) => cond.add(task::Column::ParentUuid.eq(*parent)),
            None => cond.add(task::Column::ParentUuid.is_null()),
        }
    }

    /// Get a single task by local id.
    pub async fn get_by_id<C>(conn: &C, uuid: &Uuid) -> Result<Option<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task::Entity::find()
            .filter(task::Column::Uuid.eq(*uuid))
            .one(conn)
            .await?)
    }

    /// Get a single task by remote id.
    pub async fn get_by_remote_id<C>(conn: &C, remote_id: &str) -> Result<Option<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task::Entity::find()
            .filter(task::Column::RemoteId.eq(remote_id))
            .one(conn)
            .await?)
    }

    /// Get all tasks of a list, position order.
    pub async fn get_for_list<C>(conn: &C, list_uuid: &Uuid) -> Result<Vec<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task::Entity::find()
            .filter(task::Column::ListUuid.eq(*list_uuid))
            .order_by_asc(task::Column::Position)
            .all(conn)
            .await?)
    }

    /// Get the tasks of one ordering scope, position order.
    pub async fn get_scope<C>(
        conn: &C,
        list_uuid: &Uuid,
        parent_uuid: Option<&Uuid>,
    ) -> Result<Vec<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task::Entity::find()
            .filter(Self::scope_filter(list_uuid, parent_uuid))
            .order_by_asc(task::Column::Position)
            .all(conn)
            .await?)
    }

    /// Get every task of a list that has never been pushed, position order.
    pub async fn get_local_only<C>(conn: &C, list_uuid: &Uuid) -> Result<Vec<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task::Entity::find()
            .filter(task::Column::ListUuid.eq(*list_uuid))
            .filter(task::Column::RemoteId.is_null())
            .order_by_asc(task::Column::Position)
            .all(conn)
            .await?)
    }

    /// The task immediately preceding `task` in manual order within its
    /// scope, or `None` if it is first.
    pub async fn previous_sibling<C>(conn: &C, task: &task::Model) -> Result<Option<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task::Entity::find()
            .filter(Self::scope_filter(&task.list_uuid, task.parent_uuid.as_ref()))
            .filter(task::Column::Position.lt(task.position.clone()))
            .order_by_desc(task::Column::Position)
            .one(conn)
            .await?)
    }

    /// Contiguous ordered subset of a scope with position `<=` the reference.
    pub async fn tasks_up_to<C>(
        conn: &C,
        list_uuid: &Uuid,
        parent_uuid: Option<&Uuid>,
        position: &str,
    ) -> Result<Vec<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task::Entity::find()
            .filter(Self::scope_filter(list_uuid, parent_uuid))
            .filter(task::Column::Position.lte(position))
            .order_by_asc(task::Column::Position)
            .all(conn)
            .await?)
    }

    /// Contiguous ordered subset of a scope with position `>=` the reference.
    pub async fn tasks_from<C>(
        conn: &C,
        list_uuid: &Uuid,
        parent_uuid: Option<&Uuid>,
        position: &str,
    ) -> Result<Vec<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task::Entity::find()
            .filter(Self::scope_filter(list_uuid, parent_uuid))
            .filter(task::Column::Position.gte(position))
            .order_by_asc(task::Column::Position)
            .all(conn)
            .await?)
    }

    /// All transitive children of `root` within one list.
    pub async fn descendants<C>(conn: &C, list_uuid: &Uuid, root: &Uuid) -> Result<Vec<task::Model>>
    where
        C: ConnectionTrait,
    {
        let all = Self::get_for_list(conn, list_uuid).await?;
        let mut result = Vec::new();
        let mut frontier = vec![*root];
        while let Some(parent) = frontier.pop() {
            for task in &all {
                if task.parent_uuid == Some(parent) {
                    frontier.push(task.uuid);
                    result.push(task.clone());
                }
            }
        }
        Ok(result)
    }

    /// Insert a new task.
    pub async fn insert<C>(conn: &C, task: task::ActiveModel) -> Result<()>
    where
        C: ConnectionTrait,
    {
        task::Entity::insert(task).exec(conn).await?;
        Ok(())
    }

    /// Update a task.
    pub async fn update<C>(conn: &C, task: task::ActiveModel) -> Result<task::Model>
    where
        C: ConnectionTrait,
    {
        Ok(task.update(conn).await?)
    }

    /// Delete a task; descendants go with it via cascade.
    pub async fn delete<C>(conn: &C, uuid: &Uuid) -> Result<()>
    where
        C: ConnectionTrait,
    {
        task::Entity::delete_many()
            .filter(task::Column::Uuid.eq(*uuid))
            .exec(conn)
            .await?;
        Ok(())
    }

    /// Delete every synced task of one list whose remote id is absent from
    /// the allowlist. Local-only tasks are never pruned.
    pub async fn delete_stale<C>(conn: &C, list_uuid: &Uuid, keep_remote_ids: &[String]) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        let result = task::Entity::delete_many()
            .filter(task::Column::ListUuid.eq(*list_uuid))
            .filter(task::Column::RemoteId.is_not_null())
            .filter(task::Column::RemoteId.is_not_in(keep_remote_ids.iter().cloned()))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }
}
