//! Local storage module for task-list data persistence.
//!
//! SQLite via SeaORM. The storage owns the database connection and the
//! schema bootstrap; all queries go through the repository layer.

pub mod db;

pub use db::LocalStorage;
