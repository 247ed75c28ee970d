use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ordering::{OrderingError, SortMode};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "task_lists")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: Uuid,
    /// Remote identifier; `None` until the list has been pushed or pulled.
    /// Never changes once assigned.
    #[sea_orm(unique)]
    pub remote_id: Option<String>,
    pub title: String,
    /// Last-modification instant, epoch milliseconds.
    pub updated_ms: i64,
    /// Sort mode for the list's incomplete tasks, see [`SortMode`].
    pub sorting: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::task::Entity")]
    Tasks,
}

impl Related<super::task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tasks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Parsed sort mode. An unknown stored value is a contract violation and
    /// surfaces as an error rather than being coerced to manual ordering.
    pub fn sort_mode(&self) -> Result<SortMode, OrderingError> {
        self.sorting.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_with_sorting(sorting: &str) -> Model {
        Model {
            uuid: Uuid::new_v4(),
            remote_id: None,
            title: "Inbox".to_string(),
            updated_ms: 0,
            sorting: sorting.to_string(),
        }
    }

    #[test]
    fn known_sort_modes_parse() {
        assert_eq!(list_with_sorting("manual").sort_mode().unwrap(), SortMode::Manual);
        assert_eq!(list_with_sorting("due_date").sort_mode().unwrap(), SortMode::DueDate);
        assert_eq!(list_with_sorting("title").sort_mode().unwrap(), SortMode::Title);
    }

    #[test]
    fn unknown_sort_mode_is_an_error() {
        let err = list_with_sorting("priority").sort_mode().unwrap_err();
        assert!(matches!(err, OrderingError::UnknownSortMode(ref s) if s.as_str() == "priority"));
    }
}
