//! Deterministic stage pipeline for normgate audits.
//!
//! The kernel orchestrates; it never evaluates content. A [`Pipeline`] runs
//! its stages in declared order against one immutable [`PipelineContext`]
//! and halts on the first result with `ok = false` and `blocking = true`.
//!
//! Stages are plain `Fn(&PipelineContext) -> StageResult` values. Two
//! content-neutral stages ship here ([`checks::intake_stage`],
//! [`checks::integrity_stage`]); rule evaluation and decision stages live in
//! their own crates.
//!
#![deny(missing_docs)]

/// Built-in intake and integrity stages.
pub mod checks;
/// Immutable run context.
pub mod context;
/// Kernel error types.
pub mod errors;
/// The pipeline executor and run record.
pub mod pipeline;
/// Stage names, results and definitions.
pub mod stages;

pub use context::PipelineContext;
pub use errors::{
    BlockingStageError, FailureDetails, KernelError, NonBlockingStageError, BLOCKING_REASON,
    NON_BLOCKING_REASON,
};
pub use pipeline::{Pipeline, PipelineRun, StageRecord};
pub use stages::{StageControl, StageDefinition, StageFn, StageName, StageOutput, StageResult};
