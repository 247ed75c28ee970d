//! Logging bootstrap.
//!
//! The engine logs through the `log` facade; this wires a `fern` dispatch to
//! a file when logging is enabled. Call once at startup.

use std::path::PathBuf;

use anyhow::Result;
use log::LevelFilter;

use crate::config::LoggingConfig;
use crate::constants::DEFAULT_LOG_FILE;

/// Initialize file logging from the configuration. A disabled configuration
/// is a no-op, leaving the `log` facade unset.
pub fn init(config: &LoggingConfig) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }

    let level = config.level.parse::<LevelFilter>().unwrap_or(LevelFilter::Info);
    let path = config
        .file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(fern::log_file(path)?)
        .apply()?;

    Ok(())
}
