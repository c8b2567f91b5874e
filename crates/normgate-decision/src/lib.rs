//! Decision engine for normgate audits.
//!
//! Verdicts from every stage are partitioned by `result x severity`
//! ([`aggregate`]), reduced to a status by one fixed law
//! ([`apply_precedence`]: FAIL iff an `error`-severity verdict failed), and
//! sealed into a content-hashed [`normgate_core::Decision`]. [`run_audit`]
//! joins this to the pipeline kernel.
//!
#![deny(missing_docs)]

/// Verdict partitioning.
pub mod aggregator;
/// Audit runner joining pipeline and decision.
pub mod audit;
/// Decision construction.
pub mod engine;
/// Decision error types.
pub mod errors;
/// The precedence law.
pub mod precedence;

pub use aggregator::{aggregate, Aggregation};
pub use audit::{run_audit, AuditOutcome};
pub use engine::{build_decision, decide, decision_stage_result};
pub use errors::DecisionError;
pub use precedence::apply_precedence;
