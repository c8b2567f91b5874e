use normgate_canonical::{require_text, Digest, ValidationError};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::CoreError;
use crate::identity::{check_claimed, content_addressed, derive_id, ContentAddressed};

/// Everything that makes up an evidence record except its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceContent {
    /// Path of the fact in the document (e.g. `layout.margin_top`).
    pub field_path: String,
    /// Value as extracted; `null` records an absent fact.
    pub extracted_value: Value,
    /// Type label of the value (`number`, `string`, `absent`, ...).
    pub value_type: String,
    /// Extraction confidence in `[0, 1]`.
    pub confidence: f64,
    /// Optional snippet of surrounding document context.
    pub source_context: Option<String>,
}

/// Immutable record of one measured fact. Carries no decision content.
#[derive(Debug, Clone, Serialize)]
pub struct Evidence {
    evidence_id: Digest,
    #[serde(flatten)]
    content: EvidenceContent,
}

#[derive(Deserialize)]
struct EvidenceWire {
    #[serde(default)]
    evidence_id: Option<Digest>,
    #[serde(flatten)]
    content: EvidenceContent,
}

impl Evidence {
    /// Validates the content and derives `evidence_id` from it.
    pub fn new(content: EvidenceContent) -> Result<Self, CoreError> {
        require_text("field_path", &content.field_path)?;
        require_text("value_type", &content.value_type)?;
        if !content.confidence.is_finite() || !(0.0..=1.0).contains(&content.confidence) {
            return Err(ValidationError::OutOfBounds {
                field: "confidence",
                value: content.confidence.to_string(),
            }
            .into());
        }
        let evidence_id = derive_id(&content, Self::ID_FIELD)?;
        Ok(Self {
            evidence_id,
            content,
        })
    }

    /// Content id.
    pub fn evidence_id(&self) -> &Digest {
        &self.evidence_id
    }

    /// Path of the fact in the document.
    pub fn field_path(&self) -> &str {
        &self.content.field_path
    }

    /// Extracted value.
    pub fn extracted_value(&self) -> &Value {
        &self.content.extracted_value
    }

    /// Type label of the value.
    pub fn value_type(&self) -> &str {
        &self.content.value_type
    }

    /// Extraction confidence.
    pub fn confidence(&self) -> f64 {
        self.content.confidence
    }

    /// Optional document context.
    pub fn source_context(&self) -> Option<&str> {
        self.content.source_context.as_deref()
    }

    /// All content fields.
    pub fn content(&self) -> &EvidenceContent {
        &self.content
    }
}

content_addressed!(Evidence, evidence_id);

impl<'de> Deserialize<'de> for Evidence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = EvidenceWire::deserialize(deserializer)?;
        let evidence = Evidence::new(wire.content).map_err(serde::de::Error::custom)?;
        check_claimed(Self::ID_FIELD, wire.evidence_id, &evidence.evidence_id)
            .map_err(serde::de::Error::custom)?;
        Ok(evidence)
    }
}

/// JSON type label used for `value_type`; `null` reads as `absent`.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "absent",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
