//! What a build run produced and which tool invocations failed.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// A converter invocation that did not succeed.
///
/// Failures are logged and collected; the pipeline keeps going.
#[derive(Debug, Clone, Serialize)]
pub struct ToolFailure {
    /// Pipeline stage that ran the tool
    pub stage: &'static str,
    pub tool: String,
    /// Document or file the tool was converting
    pub input: PathBuf,
    /// Exit code, if the tool ran and exited normally
    pub status: Option<i32>,
    /// Captured stderr, or the launch error
    pub message: String,
}

/// Summary of a build run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    /// Documents found while staging
    pub documents: usize,
    /// Files written by the converters, in the order they were produced
    pub produced: Vec<PathBuf>,
    pub failures: Vec<ToolFailure>,
    /// Archive written by the package stage, if it ran
    pub archive: Option<PathBuf>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Produced files with the given extension.
    pub fn produced_with_extension<'a>(
        &'a self,
        extension: &'a str,
    ) -> impl Iterator<Item = &'a Path> + 'a {
        self.produced
            .iter()
            .map(PathBuf::as_path)
            .filter(move |p| crate::util::has_extension(p, extension))
    }

    /// Write the report as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}
