//! Constants and default values used throughout the engine.

/// Directory under the platform config dir holding the configuration file.
pub const CONFIG_DIR: &str = "tasklane";

/// Configuration file name.
pub const CONFIG_FILE: &str = "config.toml";

/// Default page size for remote listings.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Default log file name, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "tasklane.log";
