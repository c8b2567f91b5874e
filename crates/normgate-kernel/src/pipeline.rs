use normgate_core::{Evidence, Verdict};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{error, info, info_span, warn};

use crate::context::PipelineContext;
use crate::errors::{
    BlockingStageError, FailureDetails, KernelError, NonBlockingStageError, BLOCKING_REASON,
    NON_BLOCKING_REASON,
};
use crate::stages::{StageControl, StageDefinition, StageName, StageResult};

/// One executed stage and what it returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRecord {
    /// Stage that ran.
    pub stage: StageName,
    /// Its result.
    pub result: StageResult,
}

impl StageRecord {
    fn details(&self) -> FailureDetails {
        FailureDetails {
            error: self.result.error.clone(),
            output: self.result.output.clone(),
        }
    }
}

/// Ordered results of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineRun {
    run_id: String,
    records: Vec<StageRecord>,
}

impl PipelineRun {
    /// Run identifier copied from the context.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Executed stages in order.
    pub fn records(&self) -> &[StageRecord] {
        &self.records
    }

    /// Stage results in execution order.
    pub fn results(&self) -> impl Iterator<Item = &StageResult> + '_ {
        self.records.iter().map(|r| &r.result)
    }

    /// Result of a named stage, if it ran.
    pub fn result(&self, stage: StageName) -> Option<&StageResult> {
        self.records
            .iter()
            .find(|r| r.stage == stage)
            .map(|r| &r.result)
    }

    /// Recorded failures of stages that did not block.
    pub fn non_blocking_failures(&self) -> Vec<NonBlockingStageError> {
        self.records
            .iter()
            .filter(|r| r.result.control() == StageControl::ContinueAfterFailure)
            .map(|r| NonBlockingStageError {
                stage_name: r.stage,
                reason: NON_BLOCKING_REASON.to_string(),
                details: r.details(),
            })
            .collect()
    }

    /// Every verdict in stage order.
    pub fn verdicts(&self) -> impl Iterator<Item = &Verdict> + '_ {
        self.records
            .iter()
            .filter_map(|r| r.result.output.as_ref())
            .flat_map(|o| o.verdicts.iter())
    }

    /// Every evidence record in stage order.
    pub fn evidence(&self) -> impl Iterator<Item = &Evidence> + '_ {
        self.records
            .iter()
            .filter_map(|r| r.result.output.as_ref())
            .flat_map(|o| o.evidence.iter())
    }
}

/// Ordered, named stages executed against one context at a time.
#[derive(Debug, Clone)]
pub struct Pipeline {
    stages: Vec<StageDefinition>,
}

impl Pipeline {
    /// Builds a pipeline, rejecting duplicate stage names.
    pub fn new(stages: Vec<StageDefinition>) -> Result<Self, KernelError> {
        let mut seen = BTreeSet::new();
        for stage in &stages {
            if !seen.insert(stage.name()) {
                return Err(KernelError::DuplicateStage(stage.name()));
            }
        }
        Ok(Self { stages })
    }

    /// Runs every stage in order.
    ///
    /// A result with `ok = false, blocking = true` stops the run; the error
    /// keeps everything recorded so far. Non-blocking failures are recorded
    /// and execution continues. The blocking flag on the returned result
    /// decides, not the one on the definition.
    pub fn execute(&self, context: &PipelineContext) -> Result<PipelineRun, BlockingStageError> {
        let _span = info_span!("normgate.run", run_id = %context.run_id()).entered();
        info!(
            event = "run.started",
            document_ref = %context.document_ref(),
            stages = self.stages.len(),
        );

        let mut records: Vec<StageRecord> = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            let name = stage.name();
            info!(event = "stage.started", stage = %name);
            let result = stage.run(context);

            if result.blocking != stage.blocking() {
                warn!(
                    event = "stage.blocking_mismatch",
                    stage = %name,
                    declared = stage.blocking(),
                    returned = result.blocking,
                );
            }

            let control = result.control();
            let record = StageRecord {
                stage: name,
                result,
            };

            match control {
                StageControl::Continue => {
                    info!(event = "stage.completed", stage = %name, ok = true);
                }
                StageControl::ContinueAfterFailure => {
                    warn!(event = "stage.failed", stage = %name, blocking = false);
                }
                StageControl::Halt => {
                    let details = record.details();
                    error!(
                        event = "run.halted",
                        stage = %name,
                        error = details.error.as_deref().unwrap_or(""),
                    );
                    records.push(record);
                    return Err(BlockingStageError {
                        stage_name: name,
                        reason: BLOCKING_REASON.to_string(),
                        details,
                        run: PipelineRun {
                            run_id: context.run_id().to_string(),
                            records,
                        },
                    });
                }
            }
            records.push(record);
        }

        info!(event = "run.completed", stages = records.len());
        Ok(PipelineRun {
            run_id: context.run_id().to_string(),
            records,
        })
    }
}
