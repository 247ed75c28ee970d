//! Pending-deletion (tombstone) repository.

use anyhow::Result;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use sea_orm::ActiveValue;
use uuid::Uuid;

use crate::entities::pending_deletion;

/// Repository for deferred remote deletions.
pub struct PendingDeletionRepository;

impl PendingDeletionRepository {
    /// All outstanding tombstones.
    pub async fn get_all<C>(conn: &C) -> Result<Vec<pending_deletion::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(pending_deletion::Entity::find().all(conn).await?)
    }

    /// Record a list deletion to replay against the remote.
    pub async fn record_list<C>(conn: &C, remote_id: &str) -> Result<()>
    where
        C: ConnectionTrait,
    {
        let tombstone = pending_deletion::ActiveModel {
            uuid: ActiveValue::Set(Uuid::new_v4()),
            kind: ActiveValue::Set(pending_deletion::KIND_LIST.to_string()),
            remote_id: ActiveValue::Set(remote_id.to_string()),
            list_remote_id: ActiveValue::Set(None),
        };
        pending_deletion::Entity::insert(tombstone).exec(conn).await?;
        Ok(())
    }

    /// Record a task deletion to replay against the remote.
    pub async fn record_task<C>(conn: &C, remote_id: &str, list_remote_id: &str) -> Result<()>
    where
        C: ConnectionTrait,
    {
        let tombstone = pending_deletion::ActiveModel {
            uuid: ActiveValue::Set(Uuid::new_v4()),
            kind: ActiveValue::Set(pending_deletion::KIND_TASK.to_string()),
            remote_id: ActiveValue::Set(remote_id.to_string()),
            list_remote_id: ActiveValue::Set(Some(list_remote_id.to_string())),
        };
        pending_deletion::Entity::insert(tombstone).exec(conn).await?;
        Ok(())
    }

    /// Drop a tombstone once the remote deletion is confirmed.
    pub async fn resolve<C>(conn: &C, uuid: &Uuid) -> Result<()>
    where
        C: ConnectionTrait,
    {
        pending_deletion::Entity::delete_many()
            .filter(pending_deletion::Column::Uuid.eq(*uuid))
            .exec(conn)
            .await?;
        Ok(())
    }
}
