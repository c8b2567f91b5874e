use normgate_core::{CoreOutput, Decision, DecisionStatus, Verdict};
use normgate_kernel::{
    FailureDetails, Pipeline, PipelineContext, PipelineRun, StageName, StageResult,
};
use tracing::warn;

use crate::engine::{decide, decision_stage_result};
use crate::errors::DecisionError;

/// A completed run and the decision made from its verdicts.
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    run: PipelineRun,
    decision: Decision,
    halted_at: Option<StageName>,
}

impl AuditOutcome {
    /// The pipeline run.
    pub fn run(&self) -> &PipelineRun {
        &self.run
    }

    /// The decision.
    pub fn decision(&self) -> &Decision {
        &self.decision
    }

    /// Stage whose rule failures stopped the run early, if any.
    pub fn halted_at(&self) -> Option<StageName> {
        self.halted_at
    }

    /// The decision rendered as a stage result.
    pub fn decision_result(&self) -> StageResult {
        decision_stage_result(&self.decision)
    }
}

fn stage_state(result: &StageResult) -> &'static str {
    match (result.ok, result.blocking) {
        (true, _) => "ok",
        (false, true) => "failed (blocking)",
        (false, false) => "failed (non-blocking)",
    }
}

fn verdict_lines(title: &str, verdicts: &[Verdict]) -> String {
    let mut lines = format!("{} ({}):\n", title, verdicts.len());
    for verdict in verdicts {
        lines.push_str(&format!(
            "  - [{}] {} ({})\n",
            verdict.severity(),
            verdict.reasoning(),
            verdict.verdict_id().short(12)
        ));
    }
    lines
}

impl CoreOutput for AuditOutcome {
    fn get_verdicts(&self) -> Vec<Verdict> {
        self.decision.all_verdicts().to_vec()
    }

    fn get_report(&self) -> String {
        let mut report = format!("run: {}\n", self.run.run_id());
        for record in self.run.records() {
            report.push_str(&format!(
                "stage {}: {}\n",
                record.stage,
                stage_state(&record.result)
            ));
        }
        if let Some(stage) = self.halted_at {
            report.push_str(&format!("halted after: {}\n", stage));
        }
        report.push_str(&format!(
            "stage {}: {}\n",
            StageName::Decision,
            stage_state(&self.decision_result())
        ));
        report.push_str(&format!("status: {}\n", self.decision.status()));
        report.push_str(&format!("decision_hash: {}\n", self.decision.decision_hash()));
        report.push_str(&format!("verdicts: {}\n", self.decision.all_verdicts().len()));
        if self.decision.status() == DecisionStatus::Fail
            || !self.decision.non_blocking_failures().is_empty()
        {
            report.push_str(&verdict_lines(
                "blocking failures",
                self.decision.blocking_failures(),
            ));
            report.push_str(&verdict_lines(
                "non-blocking failures",
                self.decision.non_blocking_failures(),
            ));
        }
        report
    }
}

/// Runs the pipeline and decides on every verdict it produced.
///
/// Verdicts are collected in stage order. A blocking halt caused by failing
/// rules (the stage reported verdicts and no error) still yields a decision
/// over the verdicts recorded so far, which is then necessarily FAIL. Any
/// other halt is returned as [`DecisionError::Halted`] with the partial run
/// inside.
pub fn run_audit(
    pipeline: &Pipeline,
    context: &PipelineContext,
) -> Result<AuditOutcome, DecisionError> {
    let (run, halted_at) = match pipeline.execute(context) {
        Ok(run) => (run, None),
        Err(halt) if is_rule_failure(&halt.details) => {
            warn!(event = "audit.halted_on_rules", stage = %halt.stage_name);
            (halt.run, Some(halt.stage_name))
        }
        Err(halt) => return Err(halt.into()),
    };
    let verdicts: Vec<Verdict> = run.verdicts().cloned().collect();
    let decision = decide(&verdicts)?;
    Ok(AuditOutcome {
        run,
        decision,
        halted_at,
    })
}

fn is_rule_failure(details: &FailureDetails) -> bool {
    details.error.is_none()
        && details
            .output
            .as_ref()
            .is_some_and(|output| output.verdicts.iter().any(Verdict::is_blocking_failure))
}
