//! Audit command implementation.

use normgate_core::{AdapterInput, CoreOutput, DecisionStatus, Rule};
use normgate_decision::{run_audit, AuditOutcome, DecisionError};
use normgate_kernel::{
    checks::{intake_stage, integrity_stage},
    BlockingStageError, Pipeline, PipelineContext, PipelineRun, StageName, StageResult,
};
use normgate_layout::{layout_stage, rule_table};
use serde_json::{json, Value};
use tracing::info;

use crate::config::Config;
use crate::output::format_json;
use crate::request::RequestAdapter;

/// Exit code for a run halted by a technical failure.
pub const EXIT_HALTED: i32 = 2;

pub fn run(
    request: String,
    json: bool,
    strict: bool,
    run_id: Option<String>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let adapter = RequestAdapter::load(&request)?;
    let rules = pinned_rules(&adapter)?;

    let run_id = run_id.unwrap_or_else(|| adapter.default_run_id());
    let normative_context = adapter
        .request()
        .normative_context
        .clone()
        .unwrap_or_else(|| config.audit.normative_context.clone());
    let mut context = PipelineContext::new(
        adapter.request().document_ref.clone(),
        normative_context,
        run_id,
    )
    .with_meta(adapter.meta()?);
    if let Some(snapshot) = &adapter.request().snapshot {
        context = context.with_snapshot(snapshot.clone());
    }

    let pipeline = Pipeline::new(vec![intake_stage(), integrity_stage(), layout_stage()])?;
    match run_audit(&pipeline, &context) {
        Ok(outcome) => {
            info!(
                event = "audit.finished",
                run_id = outcome.run().run_id(),
                status = %outcome.decision().status(),
                pinned_rules = rules.len()
            );
            if json {
                println!("{}", format_json(&outcome_json(&outcome)?));
            } else {
                print!("{}", outcome.get_report());
            }
            if strict && outcome.decision().status() == DecisionStatus::Fail {
                std::process::exit(1);
            }
            Ok(())
        }
        Err(DecisionError::Halted(halt)) => {
            if json {
                println!("{}", format_json(&halt_json(&halt)));
            } else {
                print!("{}", halt_report(&halt));
            }
            std::process::exit(EXIT_HALTED);
        }
        Err(e) => Err(e.into()),
    }
}

/// Rules pinned by the request must match the built-in table exactly.
fn pinned_rules(adapter: &RequestAdapter) -> Result<Vec<Rule>, Box<dyn std::error::Error>> {
    let pinned = adapter.get_rules()?;
    let table = rule_table()?;
    for rule in &pinned {
        if !table.iter().any(|entry| &entry.rule == rule) {
            return Err(format!(
                "pinned rule {} ({}) does not match the built-in layout rules",
                rule.code(),
                rule.rule_id().short(16)
            )
            .into());
        }
    }
    Ok(pinned)
}

fn stage_json(stage: StageName, result: &StageResult) -> Value {
    json!({
        "stage": stage,
        "ok": result.ok,
        "blocking": result.blocking,
        "error": result.error,
    })
}

fn stages_json(run: &PipelineRun) -> Vec<Value> {
    run.records()
        .iter()
        .map(|record| stage_json(record.stage, &record.result))
        .collect()
}

fn outcome_json(outcome: &AuditOutcome) -> Result<Value, Box<dyn std::error::Error>> {
    let run = outcome.run();
    let decision = outcome.decision();
    let rules: Vec<&Rule> = rule_table()?.iter().map(|entry| &entry.rule).collect();
    let evidence: Vec<_> = run.evidence().collect();
    let layout = run
        .result(StageName::LayoutConformance)
        .and_then(|result| result.output.as_ref())
        .map(|output| output.payload["metadata"].clone())
        .unwrap_or(Value::Null);
    let mut stages = stages_json(run);
    stages.push(stage_json(StageName::Decision, &outcome.decision_result()));

    Ok(json!({
        "run_id": run.run_id(),
        "status": decision.status(),
        "decision_hash": decision.decision_hash(),
        "halted_at": outcome.halted_at(),
        "stages": stages,
        "layout": layout,
        "rules": rules,
        "evidence": evidence,
        "verdicts": decision.all_verdicts(),
        "decisions": [decision],
    }))
}

fn halt_json(halt: &BlockingStageError) -> Value {
    json!({
        "run_id": halt.run.run_id(),
        "status": "HALTED",
        "halted_at": halt.stage_name,
        "reason": halt.reason,
        "error": halt.details.error,
        "stages": stages_json(&halt.run),
    })
}

fn halt_report(halt: &BlockingStageError) -> String {
    let mut report = format!("run: {}\n", halt.run.run_id());
    for record in halt.run.records() {
        let state = if record.result.ok { "ok" } else { "failed" };
        report.push_str(&format!("stage {}: {}\n", record.stage, state));
    }
    report.push_str(&format!("HALTED at {}: {}\n", halt.stage_name, halt.reason));
    if let Some(error) = &halt.details.error {
        report.push_str(&format!("error: {}\n", error));
    }
    report
}
