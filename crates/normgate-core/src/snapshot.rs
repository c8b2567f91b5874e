use normgate_canonical::{require_text, Digest, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::errors::CoreError;
use crate::identity::{check_claimed, content_addressed, derive_id, ContentAddressed};

/// Everything that makes up a snapshot except its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotContent {
    /// Name or identifier of the source document.
    pub document_name: String,
    /// Digest of the original document bytes.
    pub document_hash: Digest,
    /// Extracted fields; any JSON tree within the canonical depth limit.
    pub extracted_fields: Map<String, Value>,
    /// Explicit extraction time supplied by the extractor.
    pub extraction_timestamp: Timestamp,
    /// Version of the extraction engine.
    pub extraction_version: String,
}

/// Immutable extracted representation of one document at one point in time.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    snapshot_id: Digest,
    #[serde(flatten)]
    content: SnapshotContent,
}

#[derive(Deserialize)]
struct SnapshotWire {
    #[serde(default)]
    snapshot_id: Option<Digest>,
    #[serde(flatten)]
    content: SnapshotContent,
}

impl Snapshot {
    /// Validates the content and derives `snapshot_id` from it.
    ///
    /// Hashing walks `extracted_fields`, so a tree that exceeds the canonical
    /// depth limit is rejected here rather than at evaluation time.
    pub fn new(content: SnapshotContent) -> Result<Self, CoreError> {
        require_text("document_name", &content.document_name)?;
        require_text("extraction_version", &content.extraction_version)?;
        let snapshot_id = derive_id(&content, Self::ID_FIELD)?;
        Ok(Self {
            snapshot_id,
            content,
        })
    }

    /// Content id.
    pub fn snapshot_id(&self) -> &Digest {
        &self.snapshot_id
    }

    /// Source document name.
    pub fn document_name(&self) -> &str {
        &self.content.document_name
    }

    /// Digest of the original document.
    pub fn document_hash(&self) -> &Digest {
        &self.content.document_hash
    }

    /// Extracted fields.
    pub fn extracted_fields(&self) -> &Map<String, Value> {
        &self.content.extracted_fields
    }

    /// Extraction timestamp.
    pub fn extraction_timestamp(&self) -> &Timestamp {
        &self.content.extraction_timestamp
    }

    /// Extraction engine version.
    pub fn extraction_version(&self) -> &str {
        &self.content.extraction_version
    }

    /// All content fields.
    pub fn content(&self) -> &SnapshotContent {
        &self.content
    }
}

content_addressed!(Snapshot, snapshot_id);

impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = SnapshotWire::deserialize(deserializer)?;
        let snapshot = Snapshot::new(wire.content).map_err(serde::de::Error::custom)?;
        check_claimed(Self::ID_FIELD, wire.snapshot_id, &snapshot.snapshot_id)
            .map_err(serde::de::Error::custom)?;
        Ok(snapshot)
    }
}
