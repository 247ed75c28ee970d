use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Tombstone for an entity deleted locally while it still had a remote
/// counterpart. Mutation operations never talk to the remote, so the actual
/// remote deletion is deferred to the next sync pass, which drops the
/// tombstone once the remote confirms (or reports the entity already gone).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pending_deletions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: Uuid,
    /// `"list"` or `"task"`.
    pub kind: String,
    pub remote_id: String,
    /// Remote id of the owning list, for task tombstones.
    pub list_remote_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub const KIND_LIST: &str = "list";
pub const KIND_TASK: &str = "task";
