// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell execution adapter
//!
//! The seam between provisioning logic and the machines it mutates.
//! [`LocalRunner`] shells out for real; [`FakeRunner`] records every
//! invocation and supports scripted outputs and failures for tests.

use crate::steps::Step;
use async_trait::async_trait;
use kup_core::topology::MachineName;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors from running a step
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to spawn {step} on {machine}: {source}")]
    Spawn {
        machine: MachineName,
        step: String,
        source: std::io::Error,
    },
}

/// Captured result of one step execution
#[derive(Debug, Clone)]
pub struct StepOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl StepOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code: Some(exit_code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Adapter for executing a provisioning step on a machine
#[async_trait]
pub trait ShellRunner: Clone + Send + Sync + 'static {
    async fn run(&self, machine: &MachineName, step: &Step) -> Result<StepOutput, RunnerError>;
}

// =============================================================================
// Local runner
// =============================================================================

/// Runs step scripts through a local shell
#[derive(Debug, Clone)]
pub struct LocalRunner {
    shell: PathBuf,
}

impl LocalRunner {
    pub fn new() -> Self {
        Self {
            shell: PathBuf::from("/bin/sh"),
        }
    }

    pub fn with_shell(shell: impl Into<PathBuf>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for LocalRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShellRunner for LocalRunner {
    async fn run(&self, machine: &MachineName, step: &Step) -> Result<StepOutput, RunnerError> {
        tracing::debug!(%machine, step = %step.name, "running step");

        let output = tokio::process::Command::new(&self.shell)
            .arg("-c")
            .arg(&step.script)
            .output()
            .await
            .map_err(|source| RunnerError::Spawn {
                machine: machine.clone(),
                step: step.name.clone(),
                source,
            })?;

        Ok(StepOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

// =============================================================================
// Fake runner
// =============================================================================

/// A recorded run call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerCall {
    pub machine: MachineName,
    pub step: String,
    pub script: String,
}

#[derive(Default)]
struct FakeState {
    calls: Vec<RunnerCall>,
    /// Step name -> scripted stdout
    outputs: HashMap<String, String>,
    /// Step name -> scripted stderr; the step reports failure
    failures: HashMap<String, String>,
}

/// Fake runner with call recording for tests
#[derive(Clone, Default)]
pub struct FakeRunner {
    state: Arc<Mutex<FakeState>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the stdout of a step (by name) on any machine.
    pub fn with_output(self, step: &str, stdout: &str) -> Self {
        self.lock().outputs.insert(step.to_string(), stdout.to_string());
        self
    }

    /// Script a failure for a step (by name) on any machine.
    pub fn fail_step(self, step: &str, stderr: &str) -> Self {
        self.lock().failures.insert(step.to_string(), stderr.to_string());
        self
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<RunnerCall> {
        self.lock().calls.clone()
    }

    /// Recorded calls for one machine, in order.
    pub fn calls_for(&self, machine: &str) -> Vec<RunnerCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.machine.0 == machine)
            .cloned()
            .collect()
    }

    /// How many times a step (by name) ran on a machine.
    pub fn step_count(&self, machine: &str, step: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.machine.0 == machine && c.step == step)
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ShellRunner for FakeRunner {
    async fn run(&self, machine: &MachineName, step: &Step) -> Result<StepOutput, RunnerError> {
        let mut state = self.lock();
        state.calls.push(RunnerCall {
            machine: machine.clone(),
            step: step.name.clone(),
            script: step.script.clone(),
        });

        if let Some(stderr) = state.failures.get(&step.name) {
            return Ok(StepOutput::failed(1, stderr.clone()));
        }
        let stdout = state.outputs.get(&step.name).cloned().unwrap_or_default();
        Ok(StepOutput::ok(stdout))
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
