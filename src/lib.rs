//! Tasklane - a local-first task-list engine with remote synchronization
//!
//! This library keeps a local relational store of task lists and tasks
//! synchronized with a remote REST task service that may be offline, slow, or
//! partially unreachable. It maintains a total, stable ordering of sibling
//! tasks through fixed-width position strings and performs hierarchy-aware
//! mutations (create, delete, indent, unindent, cross-list moves) without
//! ever corrupting sibling order.
//!
//! # Modules
//!
//! The library is organized into several key modules:
//!
//! * [`config`] - Application configuration management
//! * [`ordering`] - Position codec and scope reindexing
//! * [`storage`] - Local database and data persistence
//! * [`remote`] - Remote task service contract and data types
//! * [`sync`] - Synchronization engine and hierarchy operations
//! * [`utils`] - Date/time helpers

/// Configuration module for managing application settings
pub mod config;

/// Application constants and default values
pub mod constants;

/// SeaORM entity models for database tables
pub mod entities;

/// Logging bootstrap
pub mod logger;

/// Position encoding and sibling-order recomputation
pub mod ordering;

/// Remote task service contract
pub mod remote;

/// Repository layer for database operations
pub mod repositories;

/// Local storage layer
pub mod storage;

/// Synchronization engine and hierarchy mutation operations
pub mod sync;

/// Utility functions for date/time handling
pub mod utils;

// Re-export entity models for convenient access
pub use entities::{task, task_list};
