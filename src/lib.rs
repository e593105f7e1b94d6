//! Run stored scripts under an external interpreter with a hard timeout,
//! capturing stdout and stderr into a single normalized outcome.

pub mod config;
pub mod errors;
pub mod execution;
pub mod process;
pub mod runner;
pub mod store;
pub mod workspace;

pub use config::{Config, EngineSettings, Interpreter};
pub use errors::ExecError;
pub use execution::{ExecutionOutcome, ExecutionStatus};
pub use runner::Runner;
