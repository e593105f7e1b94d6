//! Collaborator seams: where scripts come from and where outcomes go.

use anyhow::Result;

use crate::execution::ExecutionOutcome;

pub mod history;
pub mod scripts;

pub use history::{HistoryLog, HistoryRecord};
pub use scripts::ScriptStore;

pub trait ScriptSource {
    /// `Ok(None)` when no script with this id exists.
    fn get_executable_source(&self, id: &str) -> Result<Option<String>>;
}

pub trait OutcomeSink {
    fn persist_outcome(&self, id: &str, outcome: &ExecutionOutcome) -> Result<()>;
}

impl<T: ScriptSource + ?Sized> ScriptSource for &T {
    fn get_executable_source(&self, id: &str) -> Result<Option<String>> {
        (**self).get_executable_source(id)
    }
}

impl<T: OutcomeSink + ?Sized> OutcomeSink for &T {
    fn persist_outcome(&self, id: &str, outcome: &ExecutionOutcome) -> Result<()> {
        (**self).persist_outcome(id, outcome)
    }
}

/// Script ids name files directly, so they must stay a single path component.
pub(crate) fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\', '\0'])
}
