//! External tool invocation.
//!
//! Every converter the pipeline drives goes through [`ToolRunner`], so stages
//! can be exercised with a fake runner instead of the real binaries.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process::Command;

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
}

// =============================================================================
// Invocation
// =============================================================================

/// One external command: program, literal arguments, optional working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Argument list as lossy strings, for logs and assertions.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub status: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// A successful result with empty output.
    #[cfg(test)]
    pub fn ok() -> Self {
        Self {
            status: Some(0),
            success: true,
            ..Self::default()
        }
    }

    /// A failed result carrying the given stderr text.
    #[cfg(test)]
    pub fn failed(code: i32, stderr: &str) -> Self {
        Self {
            status: Some(code),
            success: false,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }
}

// =============================================================================
// Runners
// =============================================================================

/// Runs an external tool to completion and captures its result.
pub trait ToolRunner {
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput, RunError>;
}

/// Runs tools as child processes, blocking until each one exits.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput, RunError> {
        tracing::debug!(command = %invocation, "running external tool");

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }

        let output = command.output().map_err(|source| RunError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

        Ok(ToolOutput {
            status: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
