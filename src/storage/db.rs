use std::path::Path;

use anyhow::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

use crate::entities;

/// Local storage manager for task-list data.
pub struct LocalStorage {
    pub conn: DatabaseConnection,
}

impl LocalStorage {
    /// Initialize in-memory storage; data lives as long as the connection.
    pub async fn new() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    /// Open (or create) file-backed storage.
    pub async fn open(path: &Path) -> Result<Self> {
        let url = format!("sqlite://{}?mode=rwc", path.display());
        Self::connect(&url).await
    }

    async fn connect(url: &str) -> Result<Self> {
        let conn = Database::connect(url).await?;
        let storage = LocalStorage { conn };
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Create tables from the entity definitions. Foreign keys carry the
    /// cascades: deleting a list removes its tasks, deleting a task removes
    /// its descendants.
    async fn init_schema(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        let schema = Schema::new(backend);

        let mut lists = schema.create_table_from_entity(entities::TaskList);
        lists.if_not_exists();
        self.conn.execute(backend.build(&lists)).await?;

        let mut tasks = schema.create_table_from_entity(entities::Task);
        tasks.if_not_exists();
        self.conn.execute(backend.build(&tasks)).await?;

        let mut tombstones = schema.create_table_from_entity(entities::PendingDeletion);
        tombstones.if_not_exists();
        self.conn.execute(backend.build(&tombstones)).await?;

        Ok(())
    }

    /// Check if the database has any data.
    pub async fn has_data(&self) -> Result<bool> {
        use sea_orm::EntityTrait;
        Ok(entities::TaskList::find().one(&self.conn).await?.is_some())
    }

    /// Clear all data from the database.
    pub async fn clear_all_data(&self) -> Result<()> {
        use sea_orm::EntityTrait;
        entities::Task::delete_many().exec(&self.conn).await?;
        entities::TaskList::delete_many().exec(&self.conn).await?;
        entities::PendingDeletion::delete_many().exec(&self.conn).await?;
        Ok(())
    }
}
