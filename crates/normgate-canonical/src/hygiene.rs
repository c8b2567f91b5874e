use crate::identifiers::ProfileId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of the validation walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HygieneStatus {
    /// Every node passed.
    Ok,
    /// The value was rejected.
    Invalid,
}

/// Stable warning code, e.g. `DepthExceeded` or `NonFiniteNumber`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HygieneWarning(String);

impl HygieneWarning {
    pub(crate) fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Warning code.
    pub fn code(&self) -> &str {
        &self.0
    }
}

/// What the canonicalizer saw while walking a value.
///
/// Metrics are node counts per kind (`objects`, `arrays`, `numbers`,
/// `strings`, `integral_floats`) plus `max_depth`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HygieneReport {
    /// Overall status.
    pub status: HygieneStatus,
    /// Warning codes in the order they were raised.
    pub warnings: Vec<HygieneWarning>,
    /// Counters keyed by metric name.
    pub metrics: BTreeMap<String, u64>,
    /// Profile of the canonicalizer that produced the report.
    pub profile_id: ProfileId,
}

impl HygieneReport {
    pub(crate) fn new(profile_id: ProfileId) -> Self {
        Self {
            status: HygieneStatus::Ok,
            warnings: Vec::new(),
            metrics: BTreeMap::new(),
            profile_id,
        }
    }

    /// A metric's value, zero when never recorded.
    pub fn metric(&self, name: &str) -> u64 {
        self.metrics.get(name).copied().unwrap_or(0)
    }

    /// True when the walk raised no warning.
    pub fn is_clean(&self) -> bool {
        self.status == HygieneStatus::Ok && self.warnings.is_empty()
    }

    pub(crate) fn bump(&mut self, metric: &str) {
        *self.metrics.entry(metric.to_string()).or_insert(0) += 1;
    }

    pub(crate) fn record_depth(&mut self, depth: u64) {
        let max = self.metrics.entry("max_depth".to_string()).or_insert(0);
        *max = (*max).max(depth);
    }

    pub(crate) fn reject(&mut self, code: &str) {
        self.status = HygieneStatus::Invalid;
        self.warnings.push(HygieneWarning::new(code));
    }
}
