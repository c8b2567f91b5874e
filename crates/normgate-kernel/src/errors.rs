use serde::Serialize;
use thiserror::Error;

use crate::pipeline::{PipelineRun, StageRecord};
use crate::stages::{StageName, StageOutput};

/// Reason attached to every blocking halt.
pub const BLOCKING_REASON: &str = "Stage failed with blocking=True";

/// Reason attached to recorded non-blocking failures.
pub const NON_BLOCKING_REASON: &str = "Stage failed with blocking=False";

/// Kernel construction and context errors.
#[derive(Error, Debug)]
pub enum KernelError {
    /// Two stage definitions share a name.
    #[error("duplicate stage '{0}' in pipeline")]
    DuplicateStage(StageName),
    /// The context's snapshot record is malformed or its id does not match.
    #[error("invalid facts snapshot: {0}")]
    Snapshot(#[source] serde_json::Error),
    /// Hashing the subject failed.
    #[error("subject id computation failed: {0}")]
    Subject(#[from] normgate_canonical::ContentIdError),
}

/// The failing stage's error and output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureDetails {
    /// Error message reported by the stage.
    pub error: Option<String>,
    /// Output reported by the stage.
    pub output: Option<StageOutput>,
}

/// A blocking stage failed and the run stopped.
///
/// Carries the results recorded up to and including the failing stage.
#[derive(Error, Debug, Clone)]
#[error("Blocking stage '{stage_name}' failed: {reason}")]
pub struct BlockingStageError {
    /// Failing stage.
    pub stage_name: StageName,
    /// Always [`BLOCKING_REASON`].
    pub reason: String,
    /// Error and output of the failing stage.
    pub details: FailureDetails,
    /// Partial run.
    pub run: PipelineRun,
}

impl BlockingStageError {
    /// Results recorded before the halt, failing stage last.
    pub fn results(&self) -> &[StageRecord] {
        self.run.records()
    }
}

/// A non-blocking stage failure, as reported by [`PipelineRun::non_blocking_failures`].
///
/// The executor never returns this as an error.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Non-blocking stage '{stage_name}' failed: {reason}")]
pub struct NonBlockingStageError {
    /// Failing stage.
    pub stage_name: StageName,
    /// Always [`NON_BLOCKING_REASON`].
    pub reason: String,
    /// Error and output of the failing stage.
    pub details: FailureDetails,
}
