//! CLI command implementations.

pub mod add;
pub mod config;
pub mod init;
pub mod list;
pub mod query;
pub mod reindex;
pub mod show;

use anyhow::{Context, Result};
use lectern_config::{AppPaths, Config};
use tokio::runtime::Runtime;

/// Get the application paths.
pub fn get_paths() -> Result<AppPaths> {
    AppPaths::new().context("Failed to determine application directories")
}

/// Load configuration from the default location.
pub fn load_config() -> Result<Config> {
    Config::load().context("Failed to load configuration")
}

/// Create the runtime the commands drive API calls on.
pub fn runtime() -> Result<Runtime> {
    Runtime::new().context("Failed to create async runtime")
}
