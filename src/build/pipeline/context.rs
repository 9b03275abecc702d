//! Pipeline context for sharing state across stages.

use std::path::Path;

use crate::build::documents::DocumentIndex;
use crate::build::report::{BuildReport, ToolFailure};
use crate::build::runner::{Invocation, ToolRunner};
use crate::config::Settings;

/// Shared state for one build run.
///
/// Replaces what would otherwise be process-wide state: the document index
/// is filled by the staging stage and read by every later stage.
pub struct BuildContext<'a> {
    // === Configuration ===
    /// Resolved paths, literal token values, format table and tools
    pub settings: &'a Settings,

    // === Services ===
    /// Runs the external converters
    pub runner: &'a dyn ToolRunner,

    // === Run state ===
    /// Document base name -> document type, built while staging
    pub index: DocumentIndex,

    /// Outputs and failures collected so far
    pub report: BuildReport,

    /// Name of the stage currently running
    pub(super) stage: &'static str,
}

impl<'a> BuildContext<'a> {
    pub fn new(settings: &'a Settings, runner: &'a dyn ToolRunner) -> Self {
        Self {
            settings,
            runner,
            index: DocumentIndex::new(),
            report: BuildReport::default(),
            stage: "",
        }
    }

    /// Run a converter, log-and-continue style.
    ///
    /// On success `output` is recorded as produced (if the tool actually wrote
    /// it). Any failure, including a tool that cannot be launched, is logged
    /// with its stderr and recorded in the report. Returns whether the tool
    /// succeeded.
    pub fn convert(&mut self, invocation: &Invocation, input: &Path, output: &Path) -> bool {
        let result = self.runner.run(invocation);

        let (status, message) = match result {
            Ok(out) if out.success => {
                if output.exists() {
                    self.report.produced.push(output.to_path_buf());
                } else {
                    tracing::warn!(
                        tool = %invocation.program,
                        output = %output.display(),
                        "tool reported success but wrote no output"
                    );
                }
                return true;
            }
            Ok(out) => (out.status, out.stderr),
            Err(e) => (None, e.to_string()),
        };

        tracing::error!(
            stage = self.stage,
            tool = %invocation.program,
            input = %input.display(),
            status = ?status,
            "{}",
            message.trim_end()
        );
        self.report.failures.push(ToolFailure {
            stage: self.stage,
            tool: invocation.program.clone(),
            input: input.to_path_buf(),
            status,
            message,
        });
        false
    }

    pub fn into_report(self) -> BuildReport {
        self.report
    }
}
