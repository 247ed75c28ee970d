//! Task-list repository for database operations.

use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::entities::task_list;

/// Repository for task-list-related database operations.
pub struct TaskListRepository;

impl TaskListRepository {
    /// Get all task lists, stable by title.
    pub async fn get_all<C>(conn: &C) -> Result<Vec<task_list::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task_list::Entity::find()
            .order_by_asc(task_list::Column::Title)
            .all(conn)
            .await?)
    }

    /// Get a single task list by local id.
    pub async fn get_by_id<C>(conn: &C, uuid: &Uuid) -> Result<Option<task_list::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task_list::Entity::find()
            .filter(task_list::Column::Uuid.eq(*uuid))
            .one(conn)
            .await?)
    }

    /// Get a single task list by remote id.
    pub async fn get_by_remote_id<C>(conn: &C, remote_id: &str) -> Result<Option<task_list::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task_list::Entity::find()
            .filter(task_list::Column::RemoteId.eq(remote_id))
            .one(conn)
            .await?)
    }

    /// Get every list that has never been pushed to the remote.
    pub async fn get_local_only<C>(conn: &C) -> Result<Vec<task_list::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task_list::Entity::find()
            .filter(task_list::Column::RemoteId.is_null())
            .all(conn)
            .await?)
    }

    /// Insert a new task list.
    pub async fn insert<C>(conn: &C, list: task_list::ActiveModel) -> Result<()>
    where
        C: ConnectionTrait,
    {
        task_list::Entity::insert(list).exec(conn).await?;
        Ok(())
    }

    /// Update a task list.
    pub async fn update<C>(conn: &C, list: task_list::ActiveModel) -> Result<task_list::Model>
    where
        C: ConnectionTrait,
    {
        Ok(list.update(conn).await?)
    }

    /// Delete a task list; its tasks go with it via cascade.
    pub async fn delete<C>(conn: &C, uuid: &Uuid) -> Result<()>
    where
        C: ConnectionTrait,
    {
        task_list::Entity::delete_many()
            .filter(task_list::Column::Uuid.eq(*uuid))
            .exec(conn)
            .await?;
        Ok(())
    }

    /// Delete every synced list whose remote id is absent from the allowlist.
    ///
    /// Local-only lists (no remote id) are never touched: they have not been
    /// pushed yet and must not be pruned speculatively.
    pub async fn delete_stale<C>(conn: &C, keep_remote_ids: &[String]) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        let result = task_list::Entity::delete_many()
            .filter(task_list::Column::RemoteId.is_not_null())
            .filter(task_list::Column::RemoteId.is_not_in(keep_remote_ids.iter().cloned()))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }
}
