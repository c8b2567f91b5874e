use normgate_core::{DecisionStatus, Verdict};

/// FAIL if any blocking failure exists, PASS otherwise.
///
/// No weighting, quorum or partial score: one blocking failure is enough.
pub fn apply_precedence(blocking_failures: &[Verdict]) -> DecisionStatus {
    if blocking_failures.is_empty() {
        DecisionStatus::Pass
    } else {
        DecisionStatus::Fail
    }
}
