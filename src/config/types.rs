//! Configuration type definitions.
//!
//! This module contains all the data structures used in docpress configuration files.
//! These types are pure data - no I/O or complex logic.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// =============================================================================
// Root config
// =============================================================================

/// Full build configuration, as read from `docpress.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub project: ProjectConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    /// Document type -> output formats it is rendered into
    #[serde(default = "default_formats")]
    pub formats: FormatTable,
    #[serde(default)]
    pub tokens: TokensConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub pdf: PdfConfig,
    #[serde(default)]
    pub package: PackageConfig,
}

// =============================================================================
// Project metadata
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    /// Version string substituted into templates
    pub version: String,
    /// Literal date substituted into templates (defaults to today)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// chrono format used when `date` is not set
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_date_format() -> String {
    "%B %d, %Y".to_string()
}

// =============================================================================
// Directory layout
// =============================================================================

/// Input and output directories. Relative paths are resolved against the
/// config file's directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root holding one subdirectory per document type
    #[serde(default = "default_docs")]
    pub docs: PathBuf,
    #[serde(default = "default_scripts")]
    pub scripts: PathBuf,
    #[serde(default = "default_styles")]
    pub styles: PathBuf,
    #[serde(default = "default_templates")]
    pub templates: PathBuf,
    /// Flattened working directory, rebuilt each run
    #[serde(default = "default_staging")]
    pub staging: PathBuf,
    /// Final output tree (html/, ebook/, pdf/), archived by the package stage
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_docs() -> PathBuf {
    PathBuf::from("docs")
}

fn default_scripts() -> PathBuf {
    PathBuf::from("scripts")
}

fn default_styles() -> PathBuf {
    PathBuf::from("styles")
}

fn default_templates() -> PathBuf {
    PathBuf::from("templates")
}

fn default_staging() -> PathBuf {
    PathBuf::from("_staging")
}

fn default_output() -> PathBuf {
    PathBuf::from("_build")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            docs: default_docs(),
            scripts: default_scripts(),
            styles: default_styles(),
            templates: default_templates(),
            staging: default_staging(),
            output: default_output(),
        }
    }
}

// =============================================================================
// Format table
// =============================================================================

/// An output format a document type can be rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Html,
    Ebook,
    Pdf,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Html => "html",
            OutputFormat::Ebook => "ebook",
            OutputFormat::Pdf => "pdf",
        };
        f.write_str(name)
    }
}

/// Static mapping from document type to the formats it requires.
pub type FormatTable = BTreeMap<String, BTreeSet<OutputFormat>>;

fn default_formats() -> FormatTable {
    use OutputFormat::*;

    BTreeMap::from([
        ("articles".to_string(), BTreeSet::from([Html, Pdf])),
        ("manual".to_string(), BTreeSet::from([Html, Ebook, Pdf])),
    ])
}

// =============================================================================
// Template tokens
// =============================================================================

/// Literal markers replaced in template files while staging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokensConfig {
    #[serde(default = "default_date_token")]
    pub date: String,
    #[serde(default = "default_version_token")]
    pub version: String,
}

fn default_date_token() -> String {
    "@DATE@".to_string()
}

fn default_version_token() -> String {
    "@VERSION@".to_string()
}

impl Default for TokensConfig {
    fn default() -> Self {
        Self {
            date: default_date_token(),
            version: default_version_token(),
        }
    }
}

// =============================================================================
// External tools
// =============================================================================

/// Program names (or paths) of the external converters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Markdown -> HTML/EPUB converter
    #[serde(default = "default_markdown_tool")]
    pub markdown: String,
    /// EPUB -> e-reader format converter
    #[serde(default = "default_ebook_tool")]
    pub ebook: String,
    /// CSS preprocessor compiler
    #[serde(default = "default_css_tool")]
    pub css: String,
    /// HTML -> PDF renderer
    #[serde(default = "default_pdf_tool")]
    pub pdf: String,
}

fn default_markdown_tool() -> String {
    "pandoc".to_string()
}

fn default_ebook_tool() -> String {
    "ebook-convert".to_string()
}

fn default_css_tool() -> String {
    "lessc".to_string()
}

fn default_pdf_tool() -> String {
    "wkhtmltopdf".to_string()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            markdown: default_markdown_tool(),
            ebook: default_ebook_tool(),
            css: default_css_tool(),
            pdf: default_pdf_tool(),
        }
    }
}

// =============================================================================
// PDF rendering
// =============================================================================

/// Settings for the local server the PDF renderer reads pages from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Port for the page server; 0 picks a free port
    #[serde(default)]
    pub port: u16,
    /// Port of the optional stop-control listener
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_port: Option<u16>,
    /// Shared secret expected by the stop-control listener
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_key: Option<String>,
    /// Comment that opens the analytics snippet stripped before rendering
    #[serde(default = "default_strip_marker")]
    pub strip_marker: String,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_strip_marker() -> String {
    "<!-- analytics -->".to_string()
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: 0,
            stop_port: None,
            stop_key: None,
            strip_marker: default_strip_marker(),
        }
    }
}

// =============================================================================
// Packaging
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageConfig {
    /// Archive base name, `<name>.zip`
    #[serde(default = "default_package_name")]
    pub name: String,
    /// Directory the archive is written to
    #[serde(default = "default_package_dir")]
    pub dir: PathBuf,
}

fn default_package_name() -> String {
    "docs".to_string()
}

fn default_package_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            name: default_package_name(),
            dir: default_package_dir(),
        }
    }
}

impl Config {
    /// A starter configuration, as written by `docpress init`.
    pub fn starter(name: &str) -> Self {
        Self {
            project: ProjectConfig {
                name: name.to_string(),
                version: "0.1.0".to_string(),
                date: None,
                date_format: default_date_format(),
            },
            paths: PathsConfig::default(),
            formats: default_formats(),
            tokens: TokensConfig::default(),
            tools: ToolsConfig::default(),
            pdf: PdfConfig::default(),
            package: PackageConfig {
                name: name.to_string(),
                dir: default_package_dir(),
            },
        }
    }
}
