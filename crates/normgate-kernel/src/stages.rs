use normgate_core::{Evidence, Verdict};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::context::PipelineContext;

/// Closed set of pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    /// Request sanity checks.
    Intake,
    /// Snapshot identity check.
    Integrity,
    /// Layout rule evaluation.
    LayoutConformance,
    /// Final decision.
    Decision,
}

impl StageName {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            StageName::Intake => "intake",
            StageName::Integrity => "integrity",
            StageName::LayoutConformance => "layout_conformance",
            StageName::Decision => "decision",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data a stage hands back: audit records plus a free-form payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StageOutput {
    /// Verdicts produced by the stage, in evaluation order.
    pub verdicts: Vec<Verdict>,
    /// Evidence backing those verdicts.
    pub evidence: Vec<Evidence>,
    /// Stage-specific report data.
    pub payload: Value,
}

impl StageOutput {
    /// Output carrying only a payload.
    pub fn payload(payload: Value) -> Self {
        Self {
            payload,
            ..Self::default()
        }
    }
}

/// What the executor does after a stage returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageControl {
    /// Stage succeeded.
    Continue,
    /// Stage failed without blocking; record and keep going.
    ContinueAfterFailure,
    /// Stage failed and blocks; stop the run.
    Halt,
}

/// Immutable result of one stage execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageResult {
    /// Whether the stage succeeded.
    pub ok: bool,
    /// Whether a failure stops the run. Authoritative over the definition.
    pub blocking: bool,
    /// Data produced by the stage.
    pub output: Option<StageOutput>,
    /// Technical error message, if any.
    pub error: Option<String>,
}

impl StageResult {
    /// Successful result.
    pub fn pass(blocking: bool, output: Option<StageOutput>) -> Self {
        Self {
            ok: true,
            blocking,
            output,
            error: None,
        }
    }

    /// Failed result.
    pub fn fail(blocking: bool, output: Option<StageOutput>, error: Option<String>) -> Self {
        Self {
            ok: false,
            blocking,
            output,
            error,
        }
    }

    /// Maps the `(ok, blocking)` pair to a control decision.
    pub fn control(&self) -> StageControl {
        match (self.ok, self.blocking) {
            (true, _) => StageControl::Continue,
            (false, false) => StageControl::ContinueAfterFailure,
            (false, true) => StageControl::Halt,
        }
    }
}

/// Stage function signature.
pub type StageFn = dyn Fn(&PipelineContext) -> StageResult + Send + Sync;

/// A named stage with its declared blocking flag.
#[derive(Clone)]
pub struct StageDefinition {
    name: StageName,
    blocking: bool,
    run: Arc<StageFn>,
}

impl StageDefinition {
    /// Wraps a stage function.
    pub fn new<F>(name: StageName, blocking: bool, run: F) -> Self
    where
        F: Fn(&PipelineContext) -> StageResult + Send + Sync + 'static,
    {
        Self {
            name,
            blocking,
            run: Arc::new(run),
        }
    }

    /// Stage name.
    pub fn name(&self) -> StageName {
        self.name
    }

    /// Declared blocking flag; informational only.
    pub fn blocking(&self) -> bool {
        self.blocking
    }

    /// Invokes the stage.
    pub fn run(&self, context: &PipelineContext) -> StageResult {
        (self.run)(context)
    }
}

impl fmt::Debug for StageDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageDefinition")
            .field("name", &self.name)
            .field("blocking", &self.blocking)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_follows_ok_and_blocking() {
        assert_eq!(StageResult::pass(true, None).control(), StageControl::Continue);
        assert_eq!(StageResult::pass(false, None).control(), StageControl::Continue);
        assert_eq!(
            StageResult::fail(false, None, None).control(),
            StageControl::ContinueAfterFailure
        );
        assert_eq!(StageResult::fail(true, None, None).control(), StageControl::Halt);
    }

    #[test]
    fn stage_names_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&StageName::LayoutConformance).unwrap(),
            "\"layout_conformance\""
        );
        assert!(serde_json::from_str::<StageName>("\"stage_a\"").is_err());
    }
}
