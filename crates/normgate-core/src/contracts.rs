//! Seams between the core and the layers around it.
//!
//! Adapters feed records in; reporters read verdicts out. The core crates
//! depend on neither implementation.

use crate::rule::Rule;
use crate::snapshot::Snapshot;
use crate::verdict::Verdict;

/// Source of audit input.
///
/// Implementations must return identical records for identical input.
pub trait AdapterInput {
    /// Error raised while reading or parsing input.
    type Error: std::error::Error;

    /// The document snapshot under audit.
    fn get_snapshot(&self) -> Result<Snapshot, Self::Error>;

    /// The rules to evaluate.
    fn get_rules(&self) -> Result<Vec<Rule>, Self::Error>;
}

/// Read side of a finished audit.
pub trait CoreOutput {
    /// Every verdict produced, in stage order.
    fn get_verdicts(&self) -> Vec<Verdict>;

    /// Human-readable report.
    fn get_report(&self) -> String;
}
