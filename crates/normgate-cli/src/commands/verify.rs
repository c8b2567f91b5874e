//! Verify command implementation.
//!
//! Recomputes the id of every record in a records file. Any JSON object with
//! `rules`, `snapshots`, `evidence`, `verdicts` or `decisions` arrays is
//! accepted, including the output of `normgate audit --json`.

use normgate_canonical::Digest;
use normgate_core::{ContentAddressed, DecisionManifest, Evidence, Rule, Snapshot, Verdict};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::output::{format_json, format_table_row, print_table_header};

const COLUMNS: [(&str, usize); 4] = [("KIND", 10), ("ID", 16), ("STATUS", 8), ("DETAIL", 60)];

#[derive(Debug, Default, Deserialize)]
struct RecordsFile {
    #[serde(default)]
    rules: Vec<Value>,
    #[serde(default)]
    snapshots: Vec<Value>,
    #[serde(default)]
    evidence: Vec<Value>,
    #[serde(default)]
    verdicts: Vec<Value>,
    #[serde(default)]
    decisions: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct Entry {
    kind: &'static str,
    id: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl Entry {
    fn valid(kind: &'static str, id: &Digest) -> Self {
        Self {
            kind,
            id: id.to_string(),
            valid: true,
            detail: None,
        }
    }

    fn invalid(kind: &'static str, id: String, detail: impl Into<String>) -> Self {
        Self {
            kind,
            id,
            valid: false,
            detail: Some(detail.into()),
        }
    }
}

pub fn run(records: String, strict: bool, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(&records)
        .map_err(|e| format!("Failed to read file {}: {}", records, e))?;
    let file: RecordsFile =
        serde_json::from_str(&text).map_err(|e| format!("Invalid records file: {}", e))?;

    let entries = verify_records(&file);
    let failed = entries.iter().filter(|entry| !entry.valid).count();

    if json {
        let report = serde_json::json!({
            "total": entries.len(),
            "failed": failed,
            "entries": entries,
        });
        println!("{}", format_json(&report));
    } else {
        print_table_header(&COLUMNS);
        for entry in &entries {
            let status = if entry.valid { "OK" } else { "INVALID" };
            let detail = entry.detail.as_deref().unwrap_or("");
            let id = short_id(&entry.id);
            let cells = [entry.kind, id, status, detail];
            println!("{}", format_table_row(&cells, &COLUMNS));
        }
        println!("\n{} records, {} invalid", entries.len(), failed);
    }

    if strict && failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn short_id(id: &str) -> &str {
    id.get(..16).unwrap_or(id)
}

fn verify_records(file: &RecordsFile) -> Vec<Entry> {
    let mut entries = Vec::new();
    check_kind::<Rule>("rule", &file.rules, &mut entries);
    check_kind::<Snapshot>("snapshot", &file.snapshots, &mut entries);
    let evidence = check_kind::<Evidence>("evidence", &file.evidence, &mut entries);
    let verdicts = check_kind::<Verdict>("verdict", &file.verdicts, &mut entries);

    let evidence_ids: BTreeSet<&Digest> = evidence.iter().map(|e| e.evidence_id()).collect();
    if !file.evidence.is_empty() {
        for verdict in &verdicts {
            let missing = verdict
                .evidence_ids()
                .iter()
                .filter(|id| !evidence_ids.contains(id))
                .count();
            if missing > 0 {
                entries.push(Entry::invalid(
                    "verdict",
                    verdict.verdict_id().to_string(),
                    format!("{} evidence ids not found in file", missing),
                ));
            }
        }
    }

    let verdict_ids: BTreeSet<&Digest> = verdicts.iter().map(|v| v.verdict_id()).collect();
    for value in &file.decisions {
        entries.push(check_decision(value, &verdict_ids, !file.verdicts.is_empty()));
    }
    entries
}

/// Deserializes each record, which recomputes and checks its id.
fn check_kind<T>(kind: &'static str, values: &[Value], entries: &mut Vec<Entry>) -> Vec<T>
where
    T: DeserializeOwned + ContentAddressed,
{
    let mut records = Vec::new();
    for value in values {
        match serde_json::from_value::<T>(value.clone()) {
            Ok(record) => {
                entries.push(Entry::valid(kind, record.content_id()));
                records.push(record);
            }
            Err(e) => entries.push(Entry::invalid(
                kind,
                claimed_id(value, T::ID_FIELD),
                e.to_string(),
            )),
        }
    }
    records
}

fn check_decision(value: &Value, verdict_ids: &BTreeSet<&Digest>, check_refs: bool) -> Entry {
    let claimed = claimed_id(value, "decision_hash");
    let manifest: DecisionManifest = match serde_json::from_value(value.clone()) {
        Ok(manifest) => manifest,
        Err(e) => return Entry::invalid("decision", claimed, e.to_string()),
    };
    match manifest.verify() {
        Ok(true) => {}
        Ok(false) => return Entry::invalid("decision", claimed, "decision_hash mismatch"),
        Err(e) => return Entry::invalid("decision", claimed, e.to_string()),
    }
    if check_refs {
        let missing = manifest
            .all_verdicts
            .iter()
            .filter(|id| !verdict_ids.contains(id))
            .count();
        if missing > 0 {
            return Entry::invalid(
                "decision",
                claimed,
                format!("{} verdict ids not found in file", missing),
            );
        }
    }
    Entry::valid("decision", &manifest.decision_hash)
}

fn claimed_id(value: &Value, field: &str) -> String {
    value
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or("?")
        .to_string()
}
