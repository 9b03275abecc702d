//! Resolve a loaded config into the values a build run uses.
//!
//! Relative paths become absolute against the config file's directory, the
//! document date is fixed to a literal string, and command-line overrides
//! take precedence over file and environment values.

use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};

use super::{Config, ConfigError, FormatTable, PdfConfig, TokensConfig, ToolsConfig};
use crate::util::{normalize, paths_overlap};

/// Values supplied on the command line that win over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub version: Option<String>,
    pub date: Option<String>,
}

/// Fully resolved settings for one build run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub docs_dir: PathBuf,
    pub scripts_dir: PathBuf,
    pub styles_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Where the packaged archive is written
    pub archive_path: PathBuf,
    /// Literal date substituted for the date token
    pub date: String,
    /// Literal version substituted for the version token
    pub version: String,
    pub formats: FormatTable,
    pub tokens: TokensConfig,
    pub tools: ToolsConfig,
    pub pdf: PdfConfig,
}

impl Settings {
    /// Resolve `config` against `base_path` (the config file's directory).
    pub fn resolve(
        config: &Config,
        base_path: &Path,
        overrides: &Overrides,
    ) -> Result<Self, ConfigError> {
        let paths = &config.paths;

        let date = match overrides.date.as_ref().or(config.project.date.as_ref()) {
            Some(date) => date.clone(),
            None => today(&config.project.date_format)?,
        };
        let version = overrides
            .version
            .clone()
            .unwrap_or_else(|| config.project.version.clone());

        let package_dir = resolve_path(base_path, &config.package.dir);
        let archive_path = package_dir.join(format!("{}.zip", config.package.name));

        let settings = Self {
            docs_dir: resolve_path(base_path, &paths.docs),
            scripts_dir: resolve_path(base_path, &paths.scripts),
            styles_dir: resolve_path(base_path, &paths.styles),
            templates_dir: resolve_path(base_path, &paths.templates),
            staging_dir: resolve_path(base_path, &paths.staging),
            output_dir: resolve_path(base_path, &paths.output),
            archive_path,
            date,
            version,
            formats: config.formats.clone(),
            tokens: config.tokens.clone(),
            tools: config.tools.clone(),
            pdf: config.pdf.clone(),
        };
        settings.check_disjoint()?;
        Ok(settings)
    }

    /// Staging and output are wiped or overwritten on every run, so neither
    /// may coincide with, contain, or sit inside an input directory or each
    /// other.
    fn check_disjoint(&self) -> Result<(), ConfigError> {
        let generated = [
            ("paths.staging", &self.staging_dir),
            ("paths.output", &self.output_dir),
        ];
        let inputs = [
            ("paths.docs", &self.docs_dir),
            ("paths.scripts", &self.scripts_dir),
            ("paths.styles", &self.styles_dir),
            ("paths.templates", &self.templates_dir),
        ];

        for (gen_key, gen_dir) in generated {
            for (in_key, in_dir) in inputs {
                if paths_overlap(gen_dir, in_dir) {
                    return Err(ConfigError::Validation(format!(
                        "invalid config: '{gen_key}' ({}) overlaps '{in_key}' ({})",
                        gen_dir.display(),
                        in_dir.display()
                    )));
                }
            }
        }
        if paths_overlap(&self.staging_dir, &self.output_dir) {
            return Err(ConfigError::Validation(format!(
                "invalid config: 'paths.staging' ({}) overlaps 'paths.output' ({})",
                self.staging_dir.display(),
                self.output_dir.display()
            )));
        }
        Ok(())
    }
}

/// Resolve a relative path against a base path, normalized lexically
fn resolve_path(base_path: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        normalize(&base_path.join(path))
    } else {
        normalize(path)
    }
}

/// Format today's local date, rejecting malformed format strings up front
/// (chrono only reports those while displaying).
fn today(date_format: &str) -> Result<String, ConfigError> {
    if StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::DateFormat(date_format.to_string()));
    }
    Ok(chrono::Local::now().format(date_format).to_string())
}

/// Get the base path from a config file path (its parent directory).
pub fn base_path_from_config(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        let mut config = Config::starter("guide");
        config.project.version = "1.2.3".to_string();
        config
    }

    #[test]
    fn test_relative_paths_resolve_against_base() {
        let settings = Settings::resolve(&config(), Path::new("/project"), &Overrides::default())
            .unwrap();

        assert_eq!(settings.docs_dir, PathBuf::from("/project/docs"));
        assert_eq!(settings.staging_dir, PathBuf::from("/project/_staging"));
        assert_eq!(settings.output_dir, PathBuf::from("/project/_build"));
        assert_eq!(settings.archive_path, PathBuf::from("/project/guide.zip"));
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let mut config = config();
        config.paths.output = PathBuf::from("/tmp/out");
        let settings =
            Settings::resolve(&config, Path::new("/project"), &Overrides::default()).unwrap();

        assert_eq!(settings.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_overrides_win() {
        let mut config = config();
        config.project.date = Some("January 1, 2020".to_string());
        let overrides = Overrides {
            version: Some("9.9".to_string()),
            date: Some("March 3, 2033".to_string()),
        };
        let settings = Settings::resolve(&config, Path::new("/p"), &overrides).unwrap();

        assert_eq!(settings.version, "9.9");
        assert_eq!(settings.date, "March 3, 2033");
    }

    #[test]
    fn test_configured_date_is_literal() {
        let mut config = config();
        config.project.date = Some("sometime".to_string());
        let settings = Settings::resolve(&config, Path::new("/p"), &Overrides::default()).unwrap();

        assert_eq!(settings.date, "sometime");
        assert_eq!(settings.version, "1.2.3");
    }

    #[test]
    fn test_bad_date_format() {
        let mut config = config();
        config.project.date_format = "%Q".to_string();
        let err = Settings::resolve(&config, Path::new("/p"), &Overrides::default()).unwrap_err();

        assert!(matches!(err, ConfigError::DateFormat(_)));
    }

    #[test]
    fn test_parent_segments_are_folded() {
        let mut config = config();
        config.package.dir = PathBuf::from("_build/..");
        let settings =
            Settings::resolve(&config, Path::new("/project"), &Overrides::default()).unwrap();

        assert_eq!(settings.archive_path, PathBuf::from("/project/guide.zip"));
    }

    #[test]
    fn test_staging_over_sources_rejected() {
        let mut config = config();
        config.paths.staging = PathBuf::from("docs");
        let err = Settings::resolve(&config, Path::new("/p"), &Overrides::default()).unwrap_err();
        assert!(matches!(&err, ConfigError::Validation(m) if m.contains("paths.staging")));

        // A parent of the sources would be wiped along with them
        let mut config = self::config();
        config.paths.output = PathBuf::from(".");
        let err = Settings::resolve(&config, Path::new("/p"), &Overrides::default()).unwrap_err();
        assert!(matches!(&err, ConfigError::Validation(m) if m.contains("paths.output")));

        let mut config = self::config();
        config.paths.staging = PathBuf::from("work/../templates/stage");
        assert!(Settings::resolve(&config, Path::new("/p"), &Overrides::default()).is_err());
    }

    #[test]
    fn test_staging_inside_output_rejected() {
        let mut config = config();
        config.paths.staging = PathBuf::from("_build/stage");
        let err = Settings::resolve(&config, Path::new("/p"), &Overrides::default()).unwrap_err();

        assert!(matches!(&err, ConfigError::Validation(m) if m.contains("paths.output")));
    }

    #[test]
    fn test_base_path_from_config() {
        assert_eq!(
            base_path_from_config(Path::new("/project/docpress.yaml")),
            PathBuf::from("/project")
        );
        assert_eq!(
            base_path_from_config(Path::new("docpress.yaml")),
            PathBuf::from("")
        );
    }
}
