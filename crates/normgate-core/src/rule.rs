use normgate_canonical::{require_text, Digest, RuleCode, RuleVersion};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::CoreError;
use crate::identity::{check_claimed, content_addressed, derive_id, ContentAddressed};
use crate::vocabulary::{LogicType, Severity};

/// Everything that makes up a rule except its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleContent {
    /// Stable rule code (e.g., `APA7-MARGIN-TOP`).
    pub code: RuleCode,
    /// Rule version.
    pub version: RuleVersion,
    /// Human-readable requirement.
    pub description: String,
    /// Shape of the rule's logic.
    pub logic_type: LogicType,
    /// Optional applicability condition; serialized as `null` when absent.
    pub condition: Option<String>,
    /// Expected outcome when the rule holds.
    pub consequent: String,
    /// Document field the rule evaluates.
    pub evidence_field: String,
    /// Severity copied onto every verdict for this rule.
    pub severity: Severity,
}

/// Immutable, versioned normative rule.
#[derive(Debug, Clone, Serialize)]
pub struct Rule {
    rule_id: Digest,
    #[serde(flatten)]
    content: RuleContent,
}

#[derive(Deserialize)]
struct RuleWire {
    #[serde(default)]
    rule_id: Option<Digest>,
    #[serde(flatten)]
    content: RuleContent,
}

impl Rule {
    /// Validates the content and derives `rule_id` from it.
    pub fn new(content: RuleContent) -> Result<Self, CoreError> {
        require_text("description", &content.description)?;
        require_text("consequent", &content.consequent)?;
        require_text("evidence_field", &content.evidence_field)?;
        if let Some(condition) = &content.condition {
            require_text("condition", condition)?;
        }
        let rule_id = derive_id(&content, Self::ID_FIELD)?;
        Ok(Self { rule_id, content })
    }

    /// Content id.
    pub fn rule_id(&self) -> &Digest {
        &self.rule_id
    }

    /// Rule code.
    pub fn code(&self) -> &RuleCode {
        &self.content.code
    }

    /// Rule version.
    pub fn version(&self) -> &RuleVersion {
        &self.content.version
    }

    /// Human-readable requirement.
    pub fn description(&self) -> &str {
        &self.content.description
    }

    /// Shape of the rule's logic.
    pub fn logic_type(&self) -> LogicType {
        self.content.logic_type
    }

    /// Optional applicability condition.
    pub fn condition(&self) -> Option<&str> {
        self.content.condition.as_deref()
    }

    /// Expected outcome when the rule holds.
    pub fn consequent(&self) -> &str {
        &self.content.consequent
    }

    /// Document field the rule evaluates.
    pub fn evidence_field(&self) -> &str {
        &self.content.evidence_field
    }

    /// Severity.
    pub fn severity(&self) -> Severity {
        self.content.severity
    }

    /// All content fields.
    pub fn content(&self) -> &RuleContent {
        &self.content
    }
}

content_addressed!(Rule, rule_id);

impl<'de> Deserialize<'de> for Rule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = RuleWire::deserialize(deserializer)?;
        let rule = Rule::new(wire.content).map_err(serde::de::Error::custom)?;
        check_claimed(Self::ID_FIELD, wire.rule_id, &rule.rule_id)
            .map_err(serde::de::Error::custom)?;
        Ok(rule)
    }
}
