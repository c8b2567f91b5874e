//! Content-neutral stages that guard a run before any rule is evaluated.

use normgate_canonical::{default_canonicalizer, hash_value};
use normgate_core::Snapshot;
use serde_json::{json, Map, Value};

use crate::context::PipelineContext;
use crate::stages::{StageDefinition, StageName, StageOutput, StageResult};

/// Rejects contexts with a blank `document_ref`, `normative_context` or `run_id`.
pub fn check_intake(context: &PipelineContext) -> StageResult {
    let blank: Vec<&str> = [
        ("document_ref", context.document_ref()),
        ("normative_context", context.normative_context()),
        ("run_id", context.run_id()),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
    .collect();

    let output = StageOutput::payload(json!({
        "document_ref": context.document_ref(),
        "normative_context": context.normative_context(),
        "has_snapshot": context.facts_snapshot().is_some(),
        "meta_keys": context.meta().keys().collect::<Vec<_>>(),
    }));

    if blank.is_empty() {
        StageResult::pass(true, Some(output))
    } else {
        StageResult::fail(
            true,
            Some(output),
            Some(format!("blank request fields: {}", blank.join(", "))),
        )
    }
}

/// Re-derives the snapshot id, when a snapshot is attached.
///
/// Metadata keys that also appear in the snapshot's extracted fields must
/// carry the same canonical value, so verdicts naming the snapshot are
/// about the facts it holds.
pub fn check_integrity(context: &PipelineContext) -> StageResult {
    let snapshot = match context.snapshot() {
        None => {
            return StageResult::pass(
                true,
                Some(StageOutput::payload(json!({"snapshot_id": null}))),
            )
        }
        Some(Ok(snapshot)) => snapshot,
        Some(Err(err)) => return StageResult::fail(true, None, Some(err.to_string())),
    };

    let output = StageOutput::payload(json!({
        "snapshot_id": snapshot.snapshot_id(),
        "document_name": snapshot.document_name(),
    }));
    let diverging = diverging_keys(context.meta(), &snapshot);
    if diverging.is_empty() {
        StageResult::pass(true, Some(output))
    } else {
        StageResult::fail(
            true,
            Some(output),
            Some(format!(
                "meta disagrees with snapshot {} on: {}",
                snapshot.snapshot_id().short(12),
                diverging.join(", ")
            )),
        )
    }
}

/// Shared keys whose values differ once canonicalized (`1` equals `1.0`).
fn diverging_keys<'a>(meta: &'a Map<String, Value>, snapshot: &Snapshot) -> Vec<&'a str> {
    meta.iter()
        .filter(|(key, value)| match snapshot.extracted_fields().get(key.as_str()) {
            None => false,
            Some(extracted) => !same_canonical(value, extracted),
        })
        .map(|(key, _)| key.as_str())
        .collect()
}

fn same_canonical(a: &Value, b: &Value) -> bool {
    let canonicalizer = default_canonicalizer();
    match (hash_value(a, canonicalizer), hash_value(b, canonicalizer)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Blocking `intake` stage.
pub fn intake_stage() -> StageDefinition {
    StageDefinition::new(StageName::Intake, true, check_intake)
}

/// Blocking `integrity` stage.
pub fn integrity_stage() -> StageDefinition {
    StageDefinition::new(StageName::Integrity, true, check_integrity)
}
