use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: Uuid,
    /// Remote identifier; `None` for local-only tasks. Never changes once set.
    #[sea_orm(unique)]
    pub remote_id: Option<String>,
    pub title: String,
    pub notes: Option<String>,
    /// Calendar due date, `YYYY-MM-DD`.
    pub due_date: Option<String>,
    pub is_completed: bool,
    /// Completion instant, epoch milliseconds; present iff completed.
    pub completed_ms: Option<i64>,
    /// Last-modification instant, epoch milliseconds.
    pub updated_ms: i64,
    /// Opaque position string, unique within `(list_uuid, parent_uuid)`.
    pub position: String,
    pub list_uuid: Uuid,
    /// Local parent task; `None` for root-level tasks. A task always belongs
    /// to the same list as its parent.
    pub parent_uuid: Option<Uuid>,
    /// Remote id of the parent task. Tracked separately from `parent_uuid`
    /// because both replicas assign ids independently during one sync pass.
    pub remote_parent_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::task_list::Entity",
        from = "Column::ListUuid",
        to = "super::task_list::Column::Uuid",
        on_delete = "Cascade"
    )]
    TaskList,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentUuid",
        to = "Column::Uuid",
        on_delete = "Cascade"
    )]
    Parent,
}

impl Related<super::task_list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaskList.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Scope key for sibling ordering.
    pub fn scope(&self) -> (Uuid, Option<Uuid>) {
        (self.list_uuid, self.parent_uuid)
    }
}
