//! Utility functions for date/time handling.

pub mod datetime;
