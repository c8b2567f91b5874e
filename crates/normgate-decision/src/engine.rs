use normgate_core::{Decision, DecisionStatus, Verdict};
use normgate_kernel::{StageOutput, StageResult};
use tracing::info;

use crate::aggregator::aggregate;
use crate::errors::DecisionError;
use crate::precedence::apply_precedence;

/// Seals a decision; the hash covers the status and the sorted verdict ids
/// of each list.
pub fn build_decision(
    status: DecisionStatus,
    blocking_failures: Vec<Verdict>,
    non_blocking_failures: Vec<Verdict>,
    all_verdicts: Vec<Verdict>,
) -> Result<Decision, DecisionError> {
    Ok(Decision::new(
        status,
        blocking_failures,
        non_blocking_failures,
        all_verdicts,
    )?)
}

/// Aggregates, applies precedence and builds the decision in one step.
///
/// An empty verdict list yields PASS.
pub fn decide(verdicts: &[Verdict]) -> Result<Decision, DecisionError> {
    let aggregation = aggregate(verdicts);
    let status = apply_precedence(&aggregation.blocking_failures);
    let decision = build_decision(
        status,
        aggregation.blocking_failures,
        aggregation.non_blocking_failures,
        verdicts.to_vec(),
    )?;
    info!(
        event = "decision.made",
        status = %decision.status(),
        blocking_failures = decision.blocking_failures().len(),
        non_blocking_failures = decision.non_blocking_failures().len(),
        decision_hash = %decision.decision_hash(),
    );
    Ok(decision)
}

/// Renders a decision as a blocking stage result, `ok` iff PASS.
///
/// The verdicts stay with the stages that produced them; the payload holds
/// the decision's id-list shape.
pub fn decision_stage_result(decision: &Decision) -> StageResult {
    let output = StageOutput::payload(serde_json::json!({ "decision": decision }));
    match decision.status() {
        DecisionStatus::Pass => StageResult::pass(true, Some(output)),
        DecisionStatus::Fail => StageResult::fail(true, Some(output), None),
    }
}
