//! Configuration loading and types for docpress.
//!
//! This module handles all aspects of configuration:
//! - Type definitions for config structures (`types`)
//! - Loading configs from files and the environment (`load`)
//! - Resolving a config into absolute paths and literal values (`resolve`)

mod load;
mod resolve;
mod types;

pub use resolve::{Overrides, Settings, base_path_from_config};
pub use types::{Config, FormatTable, OutputFormat, PdfConfig, TokensConfig, ToolsConfig};

/// Default config file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "docpress.yaml";

/// Prefix for environment overrides, e.g. `DOCPRESS__PROJECT__VERSION=2.0`.
pub const ENV_PREFIX: &str = "DOCPRESS";

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to deserialize config: {0}")]
    Deserialize(#[from] config::ConfigError),

    #[error("failed to get current working directory: {0}")]
    CwdFailure(std::io::Error),

    #[error("config file not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("invalid date format '{0}'")]
    DateFormat(String),

    #[error("{0}")]
    Validation(String),
}
