use normgate_canonical::{default_canonicalizer, hash_value, Digest};
use normgate_core::Snapshot;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::KernelError;

/// Read-only input shared by every stage of one run.
///
/// Fields are fixed at construction; stages receive `&PipelineContext` and
/// have no way to change it. `facts_snapshot` is kept as the raw record the
/// adapter supplied so the integrity stage can check it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineContext {
    document_ref: String,
    normative_context: String,
    facts_snapshot: Option<Value>,
    run_id: String,
    meta: Map<String, Value>,
}

impl PipelineContext {
    /// Creates a context with no snapshot and empty metadata.
    pub fn new(
        document_ref: impl Into<String>,
        normative_context: impl Into<String>,
        run_id: impl Into<String>,
    ) -> Self {
        Self {
            document_ref: document_ref.into(),
            normative_context: normative_context.into(),
            facts_snapshot: None,
            run_id: run_id.into(),
            meta: Map::new(),
        }
    }

    /// Attaches the snapshot record.
    pub fn with_snapshot(mut self, snapshot: Value) -> Self {
        self.facts_snapshot = Some(snapshot);
        self
    }

    /// Replaces the metadata map.
    pub fn with_meta(mut self, meta: Map<String, Value>) -> Self {
        self.meta = meta;
        self
    }

    /// Reference to the audited document.
    pub fn document_ref(&self) -> &str {
        &self.document_ref
    }

    /// Normative framework identifier (e.g. `apa7`).
    pub fn normative_context(&self) -> &str {
        &self.normative_context
    }

    /// Raw snapshot record, if one was supplied.
    pub fn facts_snapshot(&self) -> Option<&Value> {
        self.facts_snapshot.as_ref()
    }

    /// Reads the snapshot record, verifying its id.
    pub fn snapshot(&self) -> Option<Result<Snapshot, KernelError>> {
        self.facts_snapshot.as_ref().map(|raw| {
            serde_json::from_value::<Snapshot>(raw.clone()).map_err(KernelError::Snapshot)
        })
    }

    /// Run identifier.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Metadata map.
    pub fn meta(&self) -> &Map<String, Value> {
        &self.meta
    }

    /// Id of the thing being audited.
    ///
    /// The snapshot id when a snapshot is attached, otherwise the content hash
    /// of `{document_ref, meta}`.
    pub fn subject_id(&self) -> Result<Digest, KernelError> {
        if let Some(snapshot) = self.snapshot() {
            return Ok(snapshot?.snapshot_id().clone());
        }
        let subject = serde_json::json!({
            "document_ref": self.document_ref,
            "meta": self.meta,
        });
        Ok(hash_value(&subject, default_canonicalizer())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn subject_id_without_snapshot_tracks_meta() {
        let a = PipelineContext::new("doc-1", "apa7", "run-1");
        let b = PipelineContext::new("doc-1", "apa7", "run-2");
        assert_eq!(a.subject_id().unwrap(), b.subject_id().unwrap());

        let meta = json!({"layout": {"margin_top": 1.0}}).as_object().cloned().unwrap();
        let c = PipelineContext::new("doc-1", "apa7", "run-1").with_meta(meta);
        assert_ne!(a.subject_id().unwrap(), c.subject_id().unwrap());
    }

    #[test]
    fn malformed_snapshot_has_no_subject() {
        let ctx = PipelineContext::new("doc-1", "apa7", "run-1").with_snapshot(json!({"x": 1}));
        assert!(matches!(ctx.subject_id(), Err(KernelError::Snapshot(_))));
    }
}
