use normgate_core::CoreError;
use normgate_kernel::BlockingStageError;
use thiserror::Error;

/// Decision engine errors.
#[derive(Error, Debug)]
pub enum DecisionError {
    /// The decision record could not be built.
    #[error("decision construction failed: {0}")]
    Record(#[from] CoreError),
    /// The pipeline halted before a decision could be made.
    #[error(transparent)]
    Halted(#[from] BlockingStageError),
}
