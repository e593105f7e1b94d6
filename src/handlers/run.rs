//! Run handler: execute a stored script or a file and report the outcome.

use std::path::Path;

use anyhow::{Context, Result};

use scriptrun::{
    store::{HistoryLog, ScriptStore},
    Config, EngineSettings, ExecError, ExecutionOutcome, ExecutionStatus, Runner,
};

use crate::printer::TextPrinter;

/// Process exit code for a finished run.
pub fn exit_code(outcome: &ExecutionOutcome) -> i32 {
    match outcome.status {
        ExecutionStatus::Success => 0,
        ExecutionStatus::Failure => 1,
        ExecutionStatus::TimedOut => 124,
        ExecutionStatus::SpawnError => 127,
    }
}

pub async fn run(cfg: &Config, id: Option<&str>, file: Option<&Path>, json: bool) -> Result<i32> {
    let runner = Runner::new(
        ScriptStore::from_config(cfg),
        HistoryLog::from_config(cfg),
        EngineSettings::from_config(cfg),
    );

    let result = match file {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("reading script file: {}", path.display()))?;
            let id = match id {
                Some(id) => id.to_string(),
                None => path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "script".into()),
            };
            runner.execute_script(&id, &source).await
        }
        None => {
            let id = id.context("Provide a script ID or --file")?;
            runner.execute(id).await
        }
    };

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e @ ExecError::NotFound(_)) => {
            if json {
                println!("{}", serde_json::json!({ "error": e.to_string() }));
            } else {
                eprintln!("{}", e);
            }
            return Ok(2);
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        TextPrinter::for_terminal(cfg.get("DEFAULT_COLOR")).print_outcome(&outcome);
    }
    Ok(exit_code(&outcome))
}
