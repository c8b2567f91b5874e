//! Audit requests read from disk.
//!
//! A request names the document, carries the extracted layout under
//! `meta.layout`, and may include a snapshot record plus a pinned rule set.

use normgate_canonical::{hash_bytes, Digest};
use normgate_core::{AdapterInput, Rule, Snapshot};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid request: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("request has no snapshot")]
    NoSnapshot,
    #[error("invalid snapshot: {0}")]
    Snapshot(#[source] serde_json::Error),
    #[error("invalid rule at index {index}: {source}")]
    Rule {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditRequest {
    pub document_ref: String,
    #[serde(default)]
    pub normative_context: Option<String>,
    #[serde(default)]
    pub meta: Option<Map<String, Value>>,
    #[serde(default)]
    pub snapshot: Option<Value>,
    #[serde(default)]
    pub rules: Option<Vec<Value>>,
}

/// Adapter over a request file.
#[derive(Debug, Clone)]
pub struct RequestAdapter {
    request: AuditRequest,
    digest: Digest,
}

impl RequestAdapter {
    pub fn load(path: &str) -> Result<Self, RequestError> {
        let bytes = std::fs::read(path).map_err(|source| RequestError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_slice(&bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, RequestError> {
        let request = serde_json::from_slice(bytes).map_err(RequestError::Parse)?;
        Ok(Self {
            request,
            digest: hash_bytes(bytes),
        })
    }

    pub fn request(&self) -> &AuditRequest {
        &self.request
    }

    /// `run-` followed by the first 16 hex digits of the request digest.
    pub fn default_run_id(&self) -> String {
        format!("run-{}", self.digest.short(16))
    }

    /// Request meta, falling back to the snapshot's extracted fields.
    pub fn meta(&self) -> Result<Map<String, Value>, RequestError> {
        match (&self.request.meta, &self.request.snapshot) {
            (Some(meta), _) => Ok(meta.clone()),
            (None, Some(_)) => Ok(self.get_snapshot()?.extracted_fields().clone()),
            (None, None) => Ok(Map::new()),
        }
    }
}

impl AdapterInput for RequestAdapter {
    type Error = RequestError;

    fn get_snapshot(&self) -> Result<Snapshot, RequestError> {
        let value = self.request.snapshot.clone().ok_or(RequestError::NoSnapshot)?;
        serde_json::from_value(value).map_err(RequestError::Snapshot)
    }

    fn get_rules(&self) -> Result<Vec<Rule>, RequestError> {
        self.request
            .rules
            .iter()
            .flatten()
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value(value.clone())
                    .map_err(|source| RequestError::Rule { index, source })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn adapter(value: Value) -> RequestAdapter {
        RequestAdapter::from_slice(value.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn run_id_follows_request_bytes() {
        let a = adapter(json!({"document_ref": "a.docx"}));
        let b = adapter(json!({"document_ref": "b.docx"}));
        assert!(a.default_run_id().starts_with("run-"));
        assert_eq!(a.default_run_id().len(), 20);
        assert_ne!(a.default_run_id(), b.default_run_id());
    }

    #[test]
    fn missing_parts_are_empty() {
        let a = adapter(json!({"document_ref": "a.docx"}));
        assert!(a.meta().unwrap().is_empty());
        assert!(a.get_rules().unwrap().is_empty());
        assert!(matches!(a.get_snapshot(), Err(RequestError::NoSnapshot)));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = RequestAdapter::from_slice(br#"{"document_ref": "a", "extra": 1}"#).unwrap_err();
        assert!(matches!(err, RequestError::Parse(_)));
    }

    #[test]
    fn bad_rule_reports_its_index() {
        let a = adapter(json!({"document_ref": "a.docx", "rules": [{"code": 1}]}));
        assert!(matches!(a.get_rules(), Err(RequestError::Rule { index: 0, .. })));
    }
}
