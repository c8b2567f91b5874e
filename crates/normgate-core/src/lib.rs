//! Immutable audit records for normgate.
//!
//! This crate provides:
//! - Record types: [`Rule`], [`Snapshot`], [`Evidence`], [`Verdict`], [`Decision`]
//! - Closed vocabularies for severity, verdict result, decision status and rule logic
//! - Identity-checked deserialization so any record can be verified offline
//! - The adapter contracts ([`AdapterInput`], [`CoreOutput`]) external layers implement
//!
//! Core invariants:
//! - Every record's id is `sha256(jcs(content))`, computed once in its constructor
//! - Records expose no mutation; equality and hashing use the id only
//! - Nothing here performs I/O or reads the clock
//!
#![deny(missing_docs)]

/// Adapter contracts between external layers and the core.
pub mod contracts;
/// Final pass/fail decision record.
pub mod decision;
/// Error types for record construction.
pub mod errors;
/// Evidence record: one measured fact.
pub mod evidence;
/// Shared identity plumbing for content-addressed records.
pub mod identity;
/// Normative rule record.
pub mod rule;
/// Document snapshot record.
pub mod snapshot;
/// Verdict record: one rule evaluated against one snapshot.
pub mod verdict;
/// Closed enumerations shared by the records.
pub mod vocabulary;

pub use contracts::{AdapterInput, CoreOutput};
pub use decision::{compute_decision_hash, Decision, DecisionManifest};
pub use errors::CoreError;
pub use evidence::{json_type_name, Evidence, EvidenceContent};
pub use identity::ContentAddressed;
pub use rule::{Rule, RuleContent};
pub use snapshot::{Snapshot, SnapshotContent};
pub use verdict::{Verdict, VerdictContent};
pub use vocabulary::{DecisionStatus, LogicType, Severity, VerdictResult};
