use serde::{Deserialize, Serialize};
use std::fmt;

/// Rule severity, copied verbatim onto every verdict for that rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Failure forces an overall FAIL.
    Error,
    /// Reported, never decisive.
    Warning,
    /// Reported, never decisive.
    Info,
}

impl Severity {
    /// Whether a failing verdict of this severity blocks the decision.
    pub fn is_blocking(self) -> bool {
        match self {
            Severity::Error => true,
            Severity::Warning | Severity::Info => false,
        }
    }

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary outcome of evaluating one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerdictResult {
    /// The requirement holds.
    Pass,
    /// The requirement does not hold.
    Fail,
}

impl VerdictResult {
    /// `Pass` when `holds`, otherwise `Fail`.
    pub fn from_bool(holds: bool) -> Self {
        if holds {
            VerdictResult::Pass
        } else {
            VerdictResult::Fail
        }
    }

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            VerdictResult::Pass => "PASS",
            VerdictResult::Fail => "FAIL",
        }
    }
}

impl fmt::Display for VerdictResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final status of a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DecisionStatus {
    /// No blocking failure was found.
    Pass,
    /// At least one blocking failure was found.
    Fail,
}

impl DecisionStatus {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            DecisionStatus::Pass => "PASS",
            DecisionStatus::Fail => "FAIL",
        }
    }
}

impl fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of a rule's logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicType {
    /// A single pass/fail comparison.
    Binary,
    /// Ordered checks that must all hold.
    Sequential,
    /// Applies only when `condition` holds.
    Conditional,
}
