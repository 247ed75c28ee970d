//! Repository layer for database operations.
//!
//! This module provides repository structs that encapsulate database queries
//! and operations, following the Data Mapper pattern recommended by SeaORM.
//! Repositories keep entities as pure data models while providing reusable
//! database access methods. Every method is generic over
//! [`sea_orm::ConnectionTrait`] so it works on a plain connection or inside a
//! transaction.
//!
//! Together these repositories are the local-store contract the sync engine
//! and the hierarchy operations are written against.

pub mod pending_deletion;
pub mod task;
pub mod task_list;

pub use pending_deletion::PendingDeletionRepository;
pub use task::TaskRepository;
pub use task_list::TaskListRepository;
