//! Configuration loading from files.
//!
//! The YAML file is layered with `DOCPRESS__*` environment variables through
//! the `config` crate, then validated.

use std::path::{Path, PathBuf};

use config::{Environment, File, FileFormat};

use super::{Config, ConfigError, DEFAULT_CONFIG_FILE, ENV_PREFIX};

impl Config {
    /// Load the config from the command line argument, defaulting to `docpress.yaml`
    pub fn load_from_arg(config_file: Option<&Path>) -> Result<(Self, PathBuf), ConfigError> {
        let config_file = config_file.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        let config_file = if config_file.is_relative() {
            std::env::current_dir()
                .map_err(ConfigError::CwdFailure)?
                .join(config_file)
        } else {
            config_file.to_path_buf()
        };

        let config = Self::load_from_file(&config_file)?;
        Ok((config, config_file))
    }

    /// Load the config from a file path
    pub(crate) fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let config: Config = config::Config::builder()
            .add_source(File::from(path).format(FileFormat::Yaml))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Parse a config from YAML text without environment layering.
    #[cfg(test)]
    pub(crate) fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = config::Config::builder()
            .add_source(File::from_str(text, FileFormat::Yaml))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project.version.trim().is_empty() {
            return Err(ConfigError::Validation(
                "invalid config: 'project.version' must not be empty".to_string(),
            ));
        }
        if self.package.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "invalid config: 'package.name' must not be empty".to_string(),
            ));
        }
        if self.pdf.stop_port.is_some() != self.pdf.stop_key.is_some() {
            return Err(ConfigError::Validation(
                "invalid config: 'pdf.stop_port' and 'pdf.stop_key' must be set together"
                    .to_string(),
            ));
        }
        if self.tokens.date.is_empty() || self.tokens.version.is_empty() {
            return Err(ConfigError::Validation(
                "invalid config: template tokens must not be empty".to_string(),
            ));
        }
        if self.tokens.date == self.tokens.version {
            return Err(ConfigError::Validation(
                "invalid config: 'tokens.date' and 'tokens.version' must differ".to_string(),
            ));
        }
        Ok(())
    }
}
