use normgate_kernel::{PipelineContext, StageDefinition, StageName, StageOutput, StageResult};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{LayoutError, TECHNICAL_ERROR_PREFIX};
use crate::evaluate::evaluate;
use crate::facts::extract_facts;

fn run(context: &PipelineContext) -> Result<StageResult, LayoutError> {
    let facts = extract_facts(context)?;
    let subject = context.subject_id()?;
    let evaluation = evaluate(&facts, &subject)?;
    let verdict_hash = evaluation.verdict_hash()?;

    debug!(
        event = "layout.evaluated",
        total = evaluation.total_rules(),
        failed = evaluation.failed_rules(),
        verdict_hash = %verdict_hash.short(12),
    );

    let output = StageOutput {
        verdicts: evaluation.verdicts(),
        evidence: evaluation.evidence(),
        payload: json!({
            "report": evaluation.report(),
            "metadata": {
                "verdict_hash": verdict_hash,
                "total_rules": evaluation.total_rules(),
                "passed_rules": evaluation.passed_rules(),
                "failed_rules": evaluation.failed_rules(),
            },
        }),
    };

    // Rule failures are data: ok=false with error left empty.
    Ok(if evaluation.ok() {
        StageResult::pass(true, Some(output))
    } else {
        StageResult::fail(true, Some(output), None)
    })
}

/// Evaluates the layout rules for the context's document.
///
/// Always blocking. Technical failures come back as `ok = false` with an
/// empty output and an error message starting with
/// [`TECHNICAL_ERROR_PREFIX`]; this function never panics on bad input.
pub fn check_layout(context: &PipelineContext) -> StageResult {
    match run(context) {
        Ok(result) => result,
        Err(err) => {
            warn!(event = "layout.technical_error", error = %err);
            StageResult::fail(
                true,
                Some(StageOutput::payload(Value::Object(Default::default()))),
                Some(format!("{} {}", TECHNICAL_ERROR_PREFIX, err)),
            )
        }
    }
}

/// Blocking `layout_conformance` stage.
pub fn layout_stage() -> StageDefinition {
    StageDefinition::new(StageName::LayoutConformance, true, check_layout)
}
