//! Mock command runner serving canned `jstat` output per report mode.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::collector::jstat::ReportMode;
use crate::collector::traits::{CollectError, CommandRunner};

/// Runner that answers from memory.
///
/// Modes without a registered response fail with `CommandFailed`, which is
/// what the real tool does for an unsupported option.
#[derive(Debug, Default)]
pub struct MockRunner {
    /// Map from mode to stdout (`Ok`) or failure reason (`Err`).
    responses: HashMap<ReportMode, Result<String, String>>,
    /// Every `(mode, target)` the runner was asked for, in order.
    calls: Mutex<Vec<(ReportMode, String)>>,
}

impl MockRunner {
    /// Creates a runner with no responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output printed for `mode`.
    pub fn add_output(&mut self, mode: ReportMode, output: impl Into<String>) {
        self.responses.insert(mode, Ok(output.into()));
    }

    /// Makes `mode` fail as if the tool exited with an error.
    pub fn add_failure(&mut self, mode: ReportMode, reason: impl Into<String>) {
        self.responses.insert(mode, Err(reason.into()));
    }

    /// Invocations so far.
    pub fn calls(&self) -> Vec<(ReportMode, String)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, mode: ReportMode, target: &str) -> Result<String, CollectError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((mode, target.to_string()));
        }

        match self.responses.get(&mode) {
            Some(Ok(output)) => Ok(output.clone()),
            Some(Err(reason)) => Err(CollectError::CommandFailed {
                mode,
                reason: reason.clone(),
            }),
            None => Err(CollectError::CommandFailed {
                mode,
                reason: format!("no mock output for -{}", mode),
            }),
        }
    }
}
