//! Execution engine: run a scratch unit under the interpreter and normalize the result.

use std::time::Instant;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    config::EngineSettings,
    process::{self, Captured, Exit},
    workspace::ScratchUnit,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    Failure,
    TimedOut,
    SpawnError,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Success => "success",
            ExecutionStatus::Failure => "failure",
            ExecutionStatus::TimedOut => "timed_out",
            ExecutionStatus::SpawnError => "spawn_error",
        }
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single result of one execution request.
///
/// `status` is `Success` only when the interpreter exited with code 0
/// before the timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub status: ExecutionStatus,
    pub stdout: String,
    pub stderr: String,
    pub elapsed_millis: u64,
    /// `None` when the process was killed, died by signal, or never started.
    #[serde(default)]
    pub exit_code: Option<i32>,
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }
}

/// Run the scratch unit's file and wait, at most `settings.timeout`, for it to finish.
pub async fn run(unit: &ScratchUnit, settings: &EngineSettings) -> ExecutionOutcome {
    let started = Instant::now();

    let handle = match process::spawn(&settings.interpreter, unit.path(), unit.dir()) {
        Ok(h) => h,
        Err(e) => {
            warn!("failed to launch {}: {}", settings.interpreter, e);
            return ExecutionOutcome {
                status: ExecutionStatus::SpawnError,
                stdout: String::new(),
                stderr: format!("failed to launch {}: {}", settings.interpreter, e),
                elapsed_millis: elapsed_millis(started),
                exit_code: None,
            };
        }
    };

    let captured = process::supervise(handle, settings.timeout).await;
    let outcome = classify(captured, elapsed_millis(started));
    info!(
        "{} finished: {} in {}ms",
        unit.path().display(),
        outcome.status,
        outcome.elapsed_millis
    );
    outcome
}

fn classify(captured: Captured, elapsed_millis: u64) -> ExecutionOutcome {
    let stdout = String::from_utf8_lossy(&captured.stdout).into_owned();
    let mut stderr = String::from_utf8_lossy(&captured.stderr).into_owned();

    let (status, exit_code) = match captured.exit {
        Exit::Exited(s) if s.success() => (ExecutionStatus::Success, s.code()),
        Exit::Exited(s) => (ExecutionStatus::Failure, s.code()),
        Exit::TimedOut => (ExecutionStatus::TimedOut, None),
        Exit::WaitFailed(e) => {
            if !stderr.is_empty() && !stderr.ends_with('\n') {
                stderr.push('\n');
            }
            stderr.push_str(&format!("waiting for process failed: {}", e));
            (ExecutionStatus::Failure, None)
        }
    };

    ExecutionOutcome {
        status,
        stdout,
        stderr,
        elapsed_millis,
        exit_code,
    }
}

fn elapsed_millis(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
