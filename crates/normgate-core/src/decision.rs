use normgate_canonical::Digest;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;

use crate::errors::CoreError;
use crate::identity::{content_addressed, derive_id, ContentAddressed};
use crate::vocabulary::{DecisionStatus, VerdictResult};
use crate::verdict::Verdict;

/// Hash input for a decision: status plus the sorted verdict ids per bucket.
#[derive(Serialize)]
struct DecisionHashInput<'a> {
    status: DecisionStatus,
    blocking_failures: Vec<&'a Digest>,
    non_blocking_failures: Vec<&'a Digest>,
    all_verdicts: Vec<&'a Digest>,
}

fn sorted(ids: &[Digest]) -> Vec<&Digest> {
    let mut ids: Vec<&Digest> = ids.iter().collect();
    ids.sort();
    ids
}

/// Computes a decision hash from its external shape.
///
/// Each id list is sorted before hashing, so the hash does not depend on the
/// order verdicts were supplied in.
pub fn compute_decision_hash(
    status: DecisionStatus,
    blocking_ids: &[Digest],
    non_blocking_ids: &[Digest],
    all_ids: &[Digest],
) -> Result<Digest, CoreError> {
    let input = DecisionHashInput {
        status,
        blocking_failures: sorted(blocking_ids),
        non_blocking_failures: sorted(non_blocking_ids),
        all_verdicts: sorted(all_ids),
    };
    derive_id(&input, Decision::ID_FIELD)
}

/// Final audited outcome of one run.
///
/// Serializes as `{decision_hash, status, blocking_failures, non_blocking_failures,
/// all_verdicts}` where each list holds verdict ids in the order supplied.
#[derive(Debug, Clone)]
pub struct Decision {
    decision_hash: Digest,
    status: DecisionStatus,
    blocking_failures: Vec<Verdict>,
    non_blocking_failures: Vec<Verdict>,
    all_verdicts: Vec<Verdict>,
}

impl Decision {
    /// Builds a decision, checking it against the precedence rule.
    ///
    /// Rejects a status that disagrees with `blocking_failures`, a blocking
    /// failure that is not an `error`-severity `FAIL`, a non-blocking failure
    /// that is not a non-`error` `FAIL`, any failure missing from
    /// `all_verdicts`, and any failing verdict left out of both failure lists.
    pub fn new(
        status: DecisionStatus,
        blocking_failures: Vec<Verdict>,
        non_blocking_failures: Vec<Verdict>,
        all_verdicts: Vec<Verdict>,
    ) -> Result<Self, CoreError> {
        let expected = if blocking_failures.is_empty() {
            DecisionStatus::Pass
        } else {
            DecisionStatus::Fail
        };
        if status != expected {
            return Err(CoreError::InvalidDecision(format!(
                "status {} with {} blocking failures",
                status,
                blocking_failures.len()
            )));
        }
        if let Some(v) = blocking_failures.iter().find(|v| !v.is_blocking_failure()) {
            return Err(CoreError::InvalidDecision(format!(
                "verdict {} is not a blocking failure",
                v.verdict_id()
            )));
        }
        if let Some(v) = non_blocking_failures
            .iter()
            .find(|v| v.result() != VerdictResult::Fail || v.severity().is_blocking())
        {
            return Err(CoreError::InvalidDecision(format!(
                "verdict {} is not a non-blocking failure",
                v.verdict_id()
            )));
        }
        let known: BTreeSet<&Digest> = all_verdicts.iter().map(Verdict::verdict_id).collect();
        if let Some(v) = blocking_failures
            .iter()
            .chain(&non_blocking_failures)
            .find(|v| !known.contains(v.verdict_id()))
        {
            return Err(CoreError::InvalidDecision(format!(
                "verdict {} is missing from all_verdicts",
                v.verdict_id()
            )));
        }
        let classified: BTreeSet<&Digest> = blocking_failures
            .iter()
            .chain(&non_blocking_failures)
            .map(Verdict::verdict_id)
            .collect();
        if let Some(v) = all_verdicts
            .iter()
            .find(|v| v.result() == VerdictResult::Fail && !classified.contains(v.verdict_id()))
        {
            return Err(CoreError::InvalidDecision(format!(
                "failing verdict {} is not classified",
                v.verdict_id()
            )));
        }

        let decision_hash = compute_decision_hash(
            status,
            &ids(&blocking_failures),
            &ids(&non_blocking_failures),
            &ids(&all_verdicts),
        )?;
        Ok(Self {
            decision_hash,
            status,
            blocking_failures,
            non_blocking_failures,
            all_verdicts,
        })
    }

    /// Content hash.
    pub fn decision_hash(&self) -> &Digest {
        &self.decision_hash
    }

    /// Final status.
    pub fn status(&self) -> DecisionStatus {
        self.status
    }

    /// Failing verdicts with severity `error`.
    pub fn blocking_failures(&self) -> &[Verdict] {
        &self.blocking_failures
    }

    /// Failing verdicts with severity `warning` or `info`.
    pub fn non_blocking_failures(&self) -> &[Verdict] {
        &self.non_blocking_failures
    }

    /// Every verdict considered.
    pub fn all_verdicts(&self) -> &[Verdict] {
        &self.all_verdicts
    }

    /// External shape of this decision.
    pub fn manifest(&self) -> DecisionManifest {
        DecisionManifest {
            decision_hash: self.decision_hash.clone(),
            status: self.status,
            blocking_failures: ids(&self.blocking_failures),
            non_blocking_failures: ids(&self.non_blocking_failures),
            all_verdicts: ids(&self.all_verdicts),
        }
    }
}

fn ids(verdicts: &[Verdict]) -> Vec<Digest> {
    verdicts.iter().map(|v| v.verdict_id().clone()).collect()
}

content_addressed!(Decision, decision_hash);

impl Serialize for Decision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Decision", 5)?;
        state.serialize_field("decision_hash", &self.decision_hash)?;
        state.serialize_field("status", &self.status)?;
        state.serialize_field("blocking_failures", &ids(&self.blocking_failures))?;
        state.serialize_field("non_blocking_failures", &ids(&self.non_blocking_failures))?;
        state.serialize_field("all_verdicts", &ids(&self.all_verdicts))?;
        state.end()
    }
}

/// A decision as it appears on the wire: status and verdict ids only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionManifest {
    /// Claimed hash.
    pub decision_hash: Digest,
    /// Claimed status.
    pub status: DecisionStatus,
    /// Blocking failure ids.
    pub blocking_failures: Vec<Digest>,
    /// Non-blocking failure ids.
    pub non_blocking_failures: Vec<Digest>,
    /// All verdict ids.
    pub all_verdicts: Vec<Digest>,
}

impl DecisionManifest {
    /// Recomputes the hash and compares it with the claimed one.
    pub fn verify(&self) -> Result<bool, CoreError> {
        let computed = compute_decision_hash(
            self.status,
            &self.blocking_failures,
            &self.non_blocking_failures,
            &self.all_verdicts,
        )?;
        Ok(computed == self.decision_hash)
    }
}
