use normgate_canonical::hash_str;
use normgate_core::{
    compute_decision_hash, CoreOutput, DecisionManifest, DecisionStatus, Severity, Verdict,
    VerdictContent, VerdictResult,
};
use normgate_decision::{
    aggregate, apply_precedence, build_decision, decide, decision_stage_result, run_audit,
    DecisionError,
};
use normgate_kernel::{
    checks::{integrity_stage, intake_stage},
    Pipeline, PipelineContext, StageName,
};
use normgate_layout::layout_stage;
use serde_json::{json, Value};

fn make_verdict(tag: &str, result: VerdictResult, severity: Severity) -> Verdict {
    Verdict::new(VerdictContent {
        rule_id: hash_str(tag),
        snapshot_id: hash_str("subject"),
        result,
        evidence_ids: vec![hash_str(&format!("evidence-{}", tag))],
        reasoning: format!("{} evaluated", tag),
        severity,
    })
    .unwrap()
}

fn make_pipeline() -> Pipeline {
    Pipeline::new(vec![intake_stage(), integrity_stage(), layout_stage()]).unwrap()
}

fn make_context(layout: Value) -> PipelineContext {
    let meta = json!({ "layout": layout }).as_object().cloned().unwrap();
    PipelineContext::new("thesis.docx", "apa7", "run-audit").with_meta(meta)
}

fn compliant_layout() -> Value {
    json!({
        "margin_top": 1.0,
        "margin_bottom": 1.0,
        "margin_left": 1.0,
        "margin_right": 1.0,
        "font_name": "Arial",
        "font_size": 11.0,
        "line_spacing": 2.0,
        "page_numbering": true
    })
}

#[test]
fn test_blocking_and_warning_failures() {
    let error_fail = make_verdict("a", VerdictResult::Fail, Severity::Error);
    let warning_fail = make_verdict("b", VerdictResult::Fail, Severity::Warning);
    let decision = decide(&[error_fail.clone(), warning_fail.clone()]).unwrap();

    assert_eq!(decision.status(), DecisionStatus::Fail);
    assert_eq!(decision.blocking_failures(), &[error_fail]);
    assert_eq!(decision.non_blocking_failures(), &[warning_fail]);
    assert_eq!(decision.all_verdicts().len(), 2);
}

#[test]
fn test_only_non_blocking_failures_pass() {
    let decision = decide(&[
        make_verdict("a", VerdictResult::Pass, Severity::Error),
        make_verdict("b", VerdictResult::Fail, Severity::Warning),
        make_verdict("c", VerdictResult::Fail, Severity::Info),
    ])
    .unwrap();
    assert_eq!(decision.status(), DecisionStatus::Pass);
    assert_eq!(decision.non_blocking_failures().len(), 2);
}

#[test]
fn test_empty_verdicts_pass() {
    let decision = decide(&[]).unwrap();
    assert_eq!(decision.status(), DecisionStatus::Pass);
    assert!(decision.all_verdicts().is_empty());
    assert_eq!(apply_precedence(&[]), DecisionStatus::Pass);
}

#[test]
fn test_decision_hash_is_order_independent() {
    let verdicts = vec![
        make_verdict("a", VerdictResult::Fail, Severity::Error),
        make_verdict("b", VerdictResult::Fail, Severity::Warning),
        make_verdict("c", VerdictResult::Pass, Severity::Error),
        make_verdict("d", VerdictResult::Fail, Severity::Error),
    ];
    let mut reversed = verdicts.clone();
    reversed.reverse();

    let forward = decide(&verdicts).unwrap();
    let backward = decide(&reversed).unwrap();
    assert_eq!(forward.decision_hash(), backward.decision_hash());
    assert_eq!(decide(&verdicts).unwrap().decision_hash(), forward.decision_hash());
}

#[test]
fn test_decision_hash_tracks_content() {
    let a = decide(&[make_verdict("a", VerdictResult::Pass, Severity::Error)]).unwrap();
    let b = decide(&[make_verdict("b", VerdictResult::Pass, Severity::Error)]).unwrap();
    assert_ne!(a.decision_hash(), b.decision_hash());
}

#[test]
fn test_decision_manifest_verifies() {
    let verdicts = vec![
        make_verdict("a", VerdictResult::Fail, Severity::Error),
        make_verdict("b", VerdictResult::Pass, Severity::Info),
    ];
    let decision = decide(&verdicts).unwrap();
    let manifest: DecisionManifest =
        serde_json::from_value(serde_json::to_value(&decision).unwrap()).unwrap();
    assert!(manifest.verify().unwrap());
    assert_eq!(
        &compute_decision_hash(
            manifest.status,
            &manifest.blocking_failures,
            &manifest.non_blocking_failures,
            &manifest.all_verdicts,
        )
        .unwrap(),
        decision.decision_hash()
    );
}

#[test]
fn test_build_decision_rejects_wrong_status() {
    let failing = make_verdict("a", VerdictResult::Fail, Severity::Error);
    let agg = aggregate(std::slice::from_ref(&failing));
    let result = build_decision(
        DecisionStatus::Pass,
        agg.blocking_failures,
        agg.non_blocking_failures,
        vec![failing],
    );
    assert!(matches!(result, Err(DecisionError::Record(_))));
}

#[test]
fn test_decision_stage_result_is_blocking() {
    let pass = decide(&[make_verdict("a", VerdictResult::Pass, Severity::Error)]).unwrap();
    let result = decision_stage_result(&pass);
    assert!(result.ok && result.blocking);

    let fail = decide(&[make_verdict("a", VerdictResult::Fail, Severity::Error)]).unwrap();
    let result = decision_stage_result(&fail);
    assert!(!result.ok && result.blocking);
    assert_eq!(
        result.output.unwrap().payload["decision"]["status"],
        "FAIL"
    );
}

#[test]
fn test_audit_of_compliant_document_passes() {
    let outcome = run_audit(&make_pipeline(), &make_context(compliant_layout())).unwrap();
    assert_eq!(outcome.decision().status(), DecisionStatus::Pass);
    assert_eq!(outcome.run().records().len(), 3);
    assert_eq!(outcome.get_verdicts().len(), 8);
    assert!(outcome.halted_at().is_none());
    let report = outcome.get_report();
    assert!(report.contains("status: PASS"));
    assert!(report.contains("stage decision: ok"));
    assert!(outcome.decision_result().ok);
}

#[test]
fn test_audit_with_failing_layout_decides_fail() {
    let mut layout = compliant_layout();
    layout["margin_top"] = json!(0.75);
    let outcome = run_audit(&make_pipeline(), &make_context(layout)).unwrap();

    assert_eq!(outcome.halted_at(), Some(StageName::LayoutConformance));
    let decision = outcome.decision();
    assert_eq!(decision.status(), DecisionStatus::Fail);
    assert_eq!(decision.blocking_failures().len(), 1);
    assert!(decision.blocking_failures()[0]
        .reasoning()
        .contains("margin_top is 0.75"));

    let report = outcome.get_report();
    assert!(report.contains("status: FAIL"));
    assert!(report.contains("stage decision: failed (blocking)"));
    assert!(report.contains("blocking failures (1):"));
    assert!(report.contains("non-blocking failures (0):"));
}

#[test]
fn test_audit_technical_error_is_returned() {
    let err = run_audit(&make_pipeline(), &make_context(json!(42))).unwrap_err();
    match err {
        DecisionError::Halted(halt) => {
            assert_eq!(halt.stage_name, StageName::LayoutConformance);
            assert!(halt.details.error.is_some());
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_audit_halts_at_intake() {
    let context = PipelineContext::new("thesis.docx", " ", "run-audit");
    let err = run_audit(&make_pipeline(), &context).unwrap_err();
    assert!(matches!(
        err,
        DecisionError::Halted(ref halt) if halt.stage_name == StageName::Intake
    ));
}
