use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use normgate_canonical::{hash_str, Timestamp};
use normgate_core::{Snapshot, SnapshotContent};
use normgate_kernel::{
    checks::{integrity_stage, intake_stage},
    KernelError, Pipeline, PipelineContext, StageDefinition, StageName, StageOutput, StageResult,
    BLOCKING_REASON,
};
use serde_json::json;

fn make_context() -> PipelineContext {
    let meta = json!({"layout": {"margin_top": 1.0}})
        .as_object()
        .cloned()
        .unwrap();
    PipelineContext::new("thesis.docx", "apa7", "run-001").with_meta(meta)
}

fn make_snapshot() -> Snapshot {
    Snapshot::new(SnapshotContent {
        document_name: "thesis.docx".to_string(),
        document_hash: hash_str("thesis bytes"),
        extracted_fields: json!({"layout": {"margin_top": 1.0}})
            .as_object()
            .cloned()
            .unwrap(),
        extraction_timestamp: Timestamp::parse("2025-01-01T00:00:00Z").unwrap(),
        extraction_version: "1.0.0".to_string(),
    })
    .unwrap()
}

fn ok_stage(name: StageName, calls: Arc<AtomicUsize>) -> StageDefinition {
    StageDefinition::new(name, true, move |_ctx| {
        calls.fetch_add(1, Ordering::SeqCst);
        StageResult::pass(true, Some(StageOutput::payload(json!({"stage": name.as_str()}))))
    })
}

fn failing_stage(name: StageName, blocking: bool) -> StageDefinition {
    StageDefinition::new(name, blocking, move |_ctx| {
        StageResult::fail(
            blocking,
            Some(StageOutput::payload(json!({"why": "bad"}))),
            Some(format!("{} failed", name)),
        )
    })
}

#[test]
fn test_blocking_failure_halts_after_second_stage() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pipeline = Pipeline::new(vec![
        ok_stage(StageName::Intake, calls.clone()),
        failing_stage(StageName::Integrity, true),
        ok_stage(StageName::LayoutConformance, calls.clone()),
    ])
    .unwrap();

    let err = pipeline.execute(&make_context()).unwrap_err();
    assert_eq!(err.stage_name, StageName::Integrity);
    assert_eq!(err.reason, BLOCKING_REASON);
    assert_eq!(err.details.error.as_deref(), Some("integrity failed"));
    assert_eq!(
        err.details.output.as_ref().map(|o| o.payload.clone()),
        Some(json!({"why": "bad"}))
    );
    assert_eq!(err.results().len(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(err.to_string().contains("Blocking stage 'integrity' failed"));
}

#[test]
fn test_non_blocking_failure_runs_every_stage() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pipeline = Pipeline::new(vec![
        ok_stage(StageName::Intake, calls.clone()),
        failing_stage(StageName::Integrity, false),
        ok_stage(StageName::LayoutConformance, calls.clone()),
    ])
    .unwrap();

    let run = pipeline.execute(&make_context()).unwrap();
    assert_eq!(run.records().len(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(run.run_id(), "run-001");

    let failures = run.non_blocking_failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].stage_name, StageName::Integrity);
    assert_eq!(failures[0].details.error.as_deref(), Some("integrity failed"));
}

#[test]
fn test_returned_blocking_flag_is_authoritative() {
    // Declared non-blocking, but the result says blocking.
    let stage = StageDefinition::new(StageName::Integrity, false, |_ctx| {
        StageResult::fail(true, None, Some("boom".to_string()))
    });
    let calls = Arc::new(AtomicUsize::new(0));
    let pipeline = Pipeline::new(vec![stage, ok_stage(StageName::Decision, calls.clone())]).unwrap();
    assert!(pipeline.execute(&make_context()).is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    // Declared blocking, but the result says non-blocking.
    let stage = StageDefinition::new(StageName::Integrity, true, |_ctx| {
        StageResult::fail(false, None, Some("soft".to_string()))
    });
    let pipeline = Pipeline::new(vec![stage, ok_stage(StageName::Decision, calls.clone())]).unwrap();
    assert!(pipeline.execute(&make_context()).is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_duplicate_stage_names_are_rejected() {
    let calls = Arc::new(AtomicUsize::new(0));
    let result = Pipeline::new(vec![
        ok_stage(StageName::Intake, calls.clone()),
        ok_stage(StageName::Intake, calls),
    ]);
    assert!(matches!(
        result,
        Err(KernelError::DuplicateStage(StageName::Intake))
    ));
}

#[test]
fn test_rerun_reproduces_results() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pipeline = Pipeline::new(vec![
        intake_stage(),
        failing_stage(StageName::Integrity, false),
        ok_stage(StageName::LayoutConformance, calls),
    ])
    .unwrap();
    let context = make_context();
    let first = pipeline.execute(&context).unwrap();
    let second = pipeline.execute(&context).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_empty_pipeline_completes() {
    let run = Pipeline::new(vec![]).unwrap().execute(&make_context()).unwrap();
    assert!(run.records().is_empty());
    assert_eq!(run.verdicts().count(), 0);
}

#[test]
fn test_intake_halts_on_blank_document_ref() {
    let pipeline = Pipeline::new(vec![intake_stage(), integrity_stage()]).unwrap();
    let context = PipelineContext::new("", "apa7", "run-001");
    let err = pipeline.execute(&context).unwrap_err();
    assert_eq!(err.stage_name, StageName::Intake);
    assert_eq!(err.results().len(), 1);
}

#[test]
fn test_integrity_accepts_valid_snapshot() {
    let snapshot = make_snapshot();
    let context = make_context().with_snapshot(serde_json::to_value(&snapshot).unwrap());
    let pipeline = Pipeline::new(vec![intake_stage(), integrity_stage()]).unwrap();
    let run = pipeline.execute(&context).unwrap();
    assert!(run.result(StageName::Integrity).unwrap().ok);
    assert_eq!(&context.subject_id().unwrap(), snapshot.snapshot_id());
}

#[test]
fn test_integrity_halts_on_tampered_snapshot() {
    let mut raw = serde_json::to_value(make_snapshot()).unwrap();
    raw["extraction_version"] = json!("9.9.9");
    let context = make_context().with_snapshot(raw);
    let pipeline = Pipeline::new(vec![intake_stage(), integrity_stage()]).unwrap();

    let err = pipeline.execute(&context).unwrap_err();
    assert_eq!(err.stage_name, StageName::Integrity);
    let message = err.details.error.unwrap();
    assert!(message.contains("snapshot_id mismatch"), "{}", message);
}

#[test]
fn test_context_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PipelineContext>();
    assert_send_sync::<Pipeline>();
}

#[test]
fn test_integrity_halts_when_meta_disagrees_with_snapshot() {
    let snapshot = serde_json::to_value(make_snapshot()).unwrap();
    let meta = json!({"layout": {"margin_top": 0.5}, "reviewer": "desk"})
        .as_object()
        .cloned()
        .unwrap();
    let context = PipelineContext::new("thesis.docx", "apa7", "run-001")
        .with_meta(meta)
        .with_snapshot(snapshot);
    let pipeline = Pipeline::new(vec![intake_stage(), integrity_stage()]).unwrap();

    let err = pipeline.execute(&context).unwrap_err();
    assert_eq!(err.stage_name, StageName::Integrity);
    let message = err.details.error.unwrap();
    assert!(message.contains("meta disagrees with snapshot"));
    assert!(message.ends_with(": layout"));
}

#[test]
fn test_integrity_accepts_meta_matching_snapshot() {
    let snapshot = serde_json::to_value(make_snapshot()).unwrap();
    let meta = json!({"layout": {"margin_top": 1}, "reviewer": "desk"})
        .as_object()
        .cloned()
        .unwrap();
    let context = PipelineContext::new("thesis.docx", "apa7", "run-001")
        .with_meta(meta)
        .with_snapshot(snapshot);
    let pipeline = Pipeline::new(vec![intake_stage(), integrity_stage()]).unwrap();
    assert!(pipeline.execute(&context).is_ok());
}
