//! Pipeline error types.

use std::path::PathBuf;

use crate::server::ServerError;
use crate::util::FsError;

/// Errors that abort a build.
///
/// Converter failures are not errors; they land in the build report.
#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("required directory does not exist: {0}")]
    MissingDirectory(PathBuf),

    #[error("failed to compile stylesheet {path}: {message}")]
    Stylesheet { path: PathBuf, message: String },

    #[error("invalid strip marker pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("local server error: {0}")]
    Server(#[from] ServerError),

    #[error("failed to write archive {path}: {source}")]
    Archive {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    #[error("stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },
}

impl BuildError {
    /// Create a stage-specific error.
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
            message: message.into(),
        }
    }
}
