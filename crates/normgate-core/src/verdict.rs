use normgate_canonical::{require_text, Digest, ValidationError};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::CoreError;
use crate::evidence::Evidence;
use crate::identity::{check_claimed, content_addressed, derive_id, ContentAddressed};
use crate::rule::Rule;
use crate::vocabulary::{Severity, VerdictResult};

/// Everything that makes up a verdict except its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictContent {
    /// Rule that was evaluated.
    pub rule_id: Digest,
    /// Subject the rule was evaluated against.
    pub snapshot_id: Digest,
    /// Binary outcome.
    pub result: VerdictResult,
    /// Supporting evidence; treated as a set.
    pub evidence_ids: Vec<Digest>,
    /// Human-readable explanation of the outcome.
    pub reasoning: String,
    /// Severity of the evaluated rule.
    pub severity: Severity,
}

/// Immutable atomic outcome of evaluating one rule against one subject.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    verdict_id: Digest,
    #[serde(flatten)]
    content: VerdictContent,
}

#[derive(Deserialize)]
struct VerdictWire {
    #[serde(default)]
    verdict_id: Option<Digest>,
    #[serde(flatten)]
    content: VerdictContent,
}

impl Verdict {
    /// Validates the content and derives `verdict_id` from it.
    ///
    /// `evidence_ids` is sorted and deduplicated first, so supply order never
    /// affects the id.
    pub fn new(mut content: VerdictContent) -> Result<Self, CoreError> {
        require_text("reasoning", &content.reasoning)?;
        content.evidence_ids.sort();
        content.evidence_ids.dedup();
        if content.evidence_ids.is_empty() {
            return Err(ValidationError::Empty {
                field: "evidence_ids",
            }
            .into());
        }
        let verdict_id = derive_id(&content, Self::ID_FIELD)?;
        Ok(Self {
            verdict_id,
            content,
        })
    }

    /// Builds a verdict for `rule`, copying its severity.
    pub fn for_rule(
        rule: &Rule,
        snapshot_id: &Digest,
        result: VerdictResult,
        evidence: &[Evidence],
        reasoning: impl Into<String>,
    ) -> Result<Self, CoreError> {
        Self::new(VerdictContent {
            rule_id: rule.rule_id().clone(),
            snapshot_id: snapshot_id.clone(),
            result,
            evidence_ids: evidence.iter().map(|e| e.evidence_id().clone()).collect(),
            reasoning: reasoning.into(),
            severity: rule.severity(),
        })
    }

    /// Content id.
    pub fn verdict_id(&self) -> &Digest {
        &self.verdict_id
    }

    /// Evaluated rule.
    pub fn rule_id(&self) -> &Digest {
        &self.content.rule_id
    }

    /// Evaluated subject.
    pub fn snapshot_id(&self) -> &Digest {
        &self.content.snapshot_id
    }

    /// Outcome.
    pub fn result(&self) -> VerdictResult {
        self.content.result
    }

    /// Sorted, deduplicated evidence ids.
    pub fn evidence_ids(&self) -> &[Digest] {
        &self.content.evidence_ids
    }

    /// Explanation.
    pub fn reasoning(&self) -> &str {
        &self.content.reasoning
    }

    /// Severity copied from the rule.
    pub fn severity(&self) -> Severity {
        self.content.severity
    }

    /// True for a failing verdict of a blocking severity.
    pub fn is_blocking_failure(&self) -> bool {
        self.content.result == VerdictResult::Fail && self.content.severity.is_blocking()
    }

    /// All content fields.
    pub fn content(&self) -> &VerdictContent {
        &self.content
    }
}

content_addressed!(Verdict, verdict_id);

impl<'de> Deserialize<'de> for Verdict {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = VerdictWire::deserialize(deserializer)?;
        let verdict = Verdict::new(wire.content).map_err(serde::de::Error::custom)?;
        check_claimed(Self::ID_FIELD, wire.verdict_id, &verdict.verdict_id)
            .map_err(serde::de::Error::custom)?;
        Ok(verdict)
    }
}
