//! Integration tests for CLI commands.

use normgate_canonical::{hash_str, Timestamp};
use normgate_core::{Snapshot, SnapshotContent};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_normgate"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
    path
}

fn compliant_layout() -> Value {
    json!({
        "margin_top": 1.0,
        "margin_bottom": 1.0,
        "margin_left": 1.0,
        "margin_right": 1.0,
        "font_name": "Times New Roman",
        "font_size": 12.0,
        "line_spacing": 2.0,
        "page_numbering": true
    })
}

fn request(layout: Value) -> Value {
    json!({
        "document_ref": "thesis.docx",
        "meta": { "layout": layout }
    })
}

fn make_snapshot(layout: Value) -> Snapshot {
    Snapshot::new(SnapshotContent {
        document_name: "thesis.docx".to_string(),
        document_hash: hash_str("thesis bytes"),
        extracted_fields: json!({ "layout": layout }).as_object().cloned().unwrap(),
        extraction_timestamp: Timestamp::parse("2025-01-01T00:00:00Z").unwrap(),
        extraction_version: "extractor-1.0".to_string(),
    })
    .unwrap()
}

#[test]
fn test_canonicalize_prints_bytes_and_digest() {
    let temp = TempDir::new().unwrap();
    let input = write_json(temp.path(), "input.json", &json!({"b": 1, "a": [true, null]}));

    let output = run_cli(&["canonicalize", input.to_str().unwrap()]);
    assert!(output.status.success());
    let text = stdout(&output);
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some(r#"{"a":[true,null],"b":1}"#));
    assert_eq!(
        lines.next(),
        Some(format!("sha256: {}", hash_str(r#"{"a":[true,null],"b":1}"#)).as_str())
    );
}

#[test]
fn test_rules_lists_table() {
    let output = run_cli(&["rules"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("APA7-MARGIN-TOP"));
    assert!(text.contains("APA7-PAGE-NUMBERING"));
    assert!(text.contains("11 rules"));

    let output = run_cli(&["rules", "--json"]);
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["rules"].as_array().unwrap().len(), 11);
}

#[test]
fn test_audit_compliant_document_passes() {
    let temp = TempDir::new().unwrap();
    let path = write_json(temp.path(), "request.json", &request(compliant_layout()));

    let output = run_cli(&["audit", path.to_str().unwrap(), "--strict"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("status: PASS"));
    assert!(text.contains("stage layout_conformance: ok"));
}

#[test]
fn test_audit_failure_exit_codes() {
    let temp = TempDir::new().unwrap();
    let mut layout = compliant_layout();
    layout["line_spacing"] = json!(1.5);
    let path = write_json(temp.path(), "request.json", &request(layout));

    let lenient = run_cli(&["audit", path.to_str().unwrap()]);
    assert_eq!(lenient.status.code(), Some(0));
    assert!(stdout(&lenient).contains("status: FAIL"));

    let strict = run_cli(&["audit", path.to_str().unwrap(), "--strict"]);
    assert_eq!(strict.status.code(), Some(1));
}

#[test]
fn test_strict_from_config() {
    let temp = TempDir::new().unwrap();
    let mut layout = compliant_layout();
    layout["page_numbering"] = json!(false);
    let path = write_json(temp.path(), "request.json", &request(layout));
    let config = temp.path().join("normgate.toml");
    std::fs::write(&config, "[audit]\nstrict = true\n").unwrap();

    let output = run_cli(&[
        "--config",
        config.to_str().unwrap(),
        "audit",
        path.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_audit_technical_halt_exits_2() {
    let temp = TempDir::new().unwrap();
    let path = write_json(temp.path(), "request.json", &request(json!("not an object")));

    let output = run_cli(&["audit", path.to_str().unwrap(), "--json"]);
    assert_eq!(output.status.code(), Some(2));
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["status"], "HALTED");
    assert_eq!(value["halted_at"], "layout_conformance");
}

#[test]
fn test_audit_json_is_stable_and_verifiable() {
    let temp = TempDir::new().unwrap();
    let mut layout = compliant_layout();
    layout["margin_left"] = json!(1.25);
    let path = write_json(temp.path(), "request.json", &request(layout));

    let first = run_cli(&["audit", path.to_str().unwrap(), "--json", "--run-id", "r1"]);
    let second = run_cli(&["audit", path.to_str().unwrap(), "--json", "--run-id", "r1"]);
    assert_eq!(first.stdout, second.stdout);

    let report: Value = serde_json::from_slice(&first.stdout).unwrap();
    assert_eq!(report["status"], "FAIL");
    assert_eq!(report["run_id"], "r1");
    assert_eq!(report["decisions"].as_array().unwrap().len(), 1);
    let stages = report["stages"].as_array().unwrap();
    assert_eq!(stages.last().unwrap()["stage"], "decision");
    assert_eq!(stages.last().unwrap()["ok"], false);

    let records = write_json(temp.path(), "records.json", &report);
    let verify = run_cli(&["verify", records.to_str().unwrap(), "--strict", "--json"]);
    assert!(verify.status.success());
    let summary: Value = serde_json::from_slice(&verify.stdout).unwrap();
    assert_eq!(summary["failed"], 0);
}

#[test]
fn test_verify_detects_tampering() {
    let temp = TempDir::new().unwrap();
    let path = write_json(temp.path(), "request.json", &request(compliant_layout()));
    let output = run_cli(&["audit", path.to_str().unwrap(), "--json"]);
    let mut report: Value = serde_json::from_slice(&output.stdout).unwrap();

    report["verdicts"][0]["reasoning"] = json!("edited after the fact");
    report["decisions"][0]["status"] = json!("FAIL");
    let records = write_json(temp.path(), "records.json", &report);

    let verify = run_cli(&["verify", records.to_str().unwrap(), "--strict", "--json"]);
    assert_eq!(verify.status.code(), Some(1));
    let summary: Value = serde_json::from_slice(&verify.stdout).unwrap();
    let invalid: Vec<&str> = summary["entries"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|entry| entry["valid"] == false)
        .map(|entry| entry["kind"].as_str().unwrap())
        .collect();
    assert!(invalid.contains(&"verdict"));
    assert!(invalid.contains(&"decision"));
}

#[test]
fn test_audit_reads_layout_from_snapshot() {
    let temp = TempDir::new().unwrap();
    let snapshot = make_snapshot(compliant_layout());
    let path = write_json(
        temp.path(),
        "request.json",
        &json!({
            "document_ref": "thesis.docx",
            "snapshot": snapshot,
        }),
    );

    let output = run_cli(&["audit", path.to_str().unwrap(), "--json"]);
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["status"], "PASS");
    assert_eq!(report["stages"][1]["stage"], "integrity");
    assert_eq!(report["stages"][1]["ok"], true);
    let stages = report["stages"].as_array().unwrap();
    assert_eq!(stages.last().unwrap()["stage"], "decision");
    assert_eq!(stages.last().unwrap()["ok"], true);
}

#[test]
fn test_audit_tampered_snapshot_halts_at_integrity() {
    let temp = TempDir::new().unwrap();
    let mut snapshot = serde_json::to_value(make_snapshot(compliant_layout())).unwrap();
    snapshot["extraction_version"] = json!("extractor-2.0");
    let path = write_json(
        temp.path(),
        "request.json",
        &json!({
            "document_ref": "thesis.docx",
            "meta": { "layout": compliant_layout() },
            "snapshot": snapshot,
        }),
    );

    let output = run_cli(&["audit", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("HALTED at integrity"));
}

#[test]
fn test_pinned_rules_must_match_table() {
    let temp = TempDir::new().unwrap();
    let listing = run_cli(&["rules", "--json"]);
    let table: Value = serde_json::from_slice(&listing.stdout).unwrap();

    let mut pinned = request(compliant_layout());
    pinned["rules"] = json!([table["rules"][0].clone()]);
    let path = write_json(temp.path(), "pinned.json", &pinned);
    assert!(run_cli(&["audit", path.to_str().unwrap()]).status.success());

    let mut foreign = table["rules"][0].clone();
    foreign["description"] = json!("Top margin must be two inches");
    foreign.as_object_mut().unwrap().remove("rule_id");
    pinned["rules"] = json!([foreign]);
    let path = write_json(temp.path(), "foreign.json", &pinned);
    let output = run_cli(&["audit", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not match"));
}

#[test]
fn test_missing_request_file_fails() {
    let output = run_cli(&["audit", "/nonexistent/request.json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Error:"));
}

#[test]
fn test_canonicalize_report_lists_metrics() {
    let temp = TempDir::new().unwrap();
    let input = write_json(temp.path(), "input.json", &json!({"sizes": [11, 12.0]}));

    let output = run_cli(&["canonicalize", input.to_str().unwrap(), "--report"]);
    assert!(output.status.success());
    let text = stdout(&output);
    // bytes, digest, then the pretty-printed report
    let report_text = text.lines().skip(2).collect::<Vec<_>>().join("\n");
    let report: Value = serde_json::from_str(&report_text).unwrap();
    assert_eq!(report["status"], "ok");
    assert_eq!(report["metrics"]["numbers"], 2);
    assert_eq!(report["metrics"]["integral_floats"], 1);
}
