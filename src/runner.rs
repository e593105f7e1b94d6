//! `execute(id)`: look up, materialize, run, clean up, record.

use log::{debug, warn};

use crate::{
    config::EngineSettings,
    errors::ExecError,
    execution::{self, ExecutionOutcome},
    store::{OutcomeSink, ScriptSource},
    workspace::{self, ExecutionRequest},
};

pub struct Runner<S, H> {
    scripts: S,
    history: H,
    settings: EngineSettings,
}

impl<S, H> Runner<S, H>
where
    S: ScriptSource,
    H: OutcomeSink,
{
    pub fn new(scripts: S, history: H, settings: EngineSettings) -> Self {
        Self {
            scripts,
            history,
            settings,
        }
    }

    /// Run the stored script `id`.
    ///
    /// Only a missing script or a scratch storage failure is an `Err`; every
    /// other result, including spawn failures and timeouts, is an outcome.
    pub async fn execute(&self, id: &str) -> Result<ExecutionOutcome, ExecError> {
        let source = self
            .scripts
            .get_executable_source(id)
            .map_err(|e| ExecError::lookup(id, e))?
            .ok_or_else(|| ExecError::NotFound(id.to_string()))?;
        self.execute_script(id, &source).await
    }

    /// Run `source` directly, recording the outcome under `id`.
    pub async fn execute_script(
        &self,
        id: &str,
        source: &str,
    ) -> Result<ExecutionOutcome, ExecError> {
        let request = ExecutionRequest {
            source_text: source,
            execution_id: id,
        };
        let unit = workspace::acquire(&self.settings.scratch_root, &self.settings.extension, &request)?;
        let outcome = execution::run(&unit, &self.settings).await;
        unit.release();

        if let Err(e) = self.history.persist_outcome(id, &outcome) {
            warn!("failed to record outcome for {}: {:#}", id, e);
        } else {
            debug!("recorded outcome for {}", id);
        }
        Ok(outcome)
    }
}
