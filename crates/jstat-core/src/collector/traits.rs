//! Abstraction over invoking `jstat` to enable testing and mocking.
//!
//! The `CommandRunner` trait lets the collector work with the real `jstat`
//! binary or with canned output in tests.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use super::jstat::{ParseError, ReportMode};

/// Error type for collection failures.
#[derive(Debug)]
pub enum CollectError {
    /// The diagnostic tool does not exist or is not executable.
    ToolNotFound(PathBuf),
    /// The tool could not be spawned, exited non-zero, or printed non-UTF-8.
    CommandFailed { mode: ReportMode, reason: String },
    /// The tool's output did not match the mode's column layout.
    Parse { mode: ReportMode, error: ParseError },
    /// A parsed value could not be published as a gauge.
    Registry { mode: ReportMode, reason: String },
}

impl fmt::Display for CollectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectError::ToolNotFound(path) => {
                write!(f, "jstat not found at {}", path.display())
            }
            CollectError::CommandFailed { mode, reason } => {
                write!(f, "jstat -{} failed: {}", mode, reason)
            }
            CollectError::Parse { mode, error } => {
                write!(f, "jstat -{} output: {}", mode, error)
            }
            CollectError::Registry { mode, reason } => {
                write!(f, "jstat -{} gauge: {}", mode, reason)
            }
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::Parse { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Runs one `jstat` report against a target VM.
pub trait CommandRunner: Send + Sync {
    /// Returns the captured standard output of `jstat -<mode> <target>`.
    fn run(&self, mode: ReportMode, target: &str) -> Result<String, CollectError>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for Box<T> {
    fn run(&self, mode: ReportMode, target: &str) -> Result<String, CollectError> {
        (**self).run(mode, target)
    }
}

impl<T: CommandRunner + ?Sized> CommandRunner for Arc<T> {
    fn run(&self, mode: ReportMode, target: &str) -> Result<String, CollectError> {
        (**self).run(mode, target)
    }
}

/// Runner that spawns the real `jstat` binary.
#[derive(Debug, Clone)]
pub struct JstatRunner {
    tool: PathBuf,
}

impl JstatRunner {
    /// Creates a runner for an already resolved tool path (see [`resolve_tool`]).
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self { tool: tool.into() }
    }

    pub fn tool(&self) -> &Path {
        &self.tool
    }
}

impl CommandRunner for JstatRunner {
    fn run(&self, mode: ReportMode, target: &str) -> Result<String, CollectError> {
        let output = Command::new(&self.tool)
            .arg(mode.flag())
            .arg(target)
            .output()
            .map_err(|e| CollectError::CommandFailed {
                mode,
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            let reason = if stderr.is_empty() {
                output.status.to_string()
            } else {
                format!("{}: {}", output.status, stderr)
            };
            return Err(CollectError::CommandFailed { mode, reason });
        }

        String::from_utf8(output.stdout).map_err(|e| CollectError::CommandFailed {
            mode,
            reason: format!("non-UTF-8 output: {}", e),
        })
    }
}

/// Resolves the `jstat` executable.
///
/// A path with a directory component must name an executable file. A bare
/// name is looked up in `PATH`.
pub fn resolve_tool(path: &Path) -> Result<PathBuf, CollectError> {
    if path.components().count() > 1 || path.is_absolute() {
        return if is_executable(path) {
            Ok(path.to_path_buf())
        } else {
            Err(CollectError::ToolNotFound(path.to_path_buf()))
        };
    }

    env::var_os("PATH")
        .and_then(|paths| {
            env::split_paths(&paths)
                .map(|dir| dir.join(path))
                .find(|candidate| is_executable(candidate))
        })
        .ok_or_else(|| CollectError::ToolNotFound(path.to_path_buf()))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
