//! Canonical encoding and content-addressed identity for normgate records.
//!
//! Every record in the audit model (rules, snapshots, evidence, verdicts,
//! decisions) derives its identifier from the bytes produced here:
//! `sha256(jcs(record_without_id_field))`, rendered as lowercase hex.
//! Nothing in this crate reads the clock, the environment, or randomness.
//!
#![deny(missing_docs)]

/// Canonicalization helpers for deterministic hashing.
pub mod canonicalizer;
/// Content id computation and verification.
pub mod content_id;
/// Digest primitive (hex-encoded SHA-256).
pub mod digest;
/// Hygiene report types emitted during canonicalization.
pub mod hygiene;
/// Validated identifier newtypes shared by the domain model.
pub mod identifiers;
/// Validation helpers used by canonical types.
pub mod validation;

pub use canonicalizer::{
    default_canonicalizer, CanonicalizationError, CanonicalizationResult, Canonicalizer,
    DEFAULT_PROFILE, MAX_DEPTH,
};
pub use content_id::{
    compute_content_id, hash_bytes, hash_str, hash_value, verify_content_id, ContentIdError,
};
pub use digest::Digest;
pub use hygiene::{HygieneReport, HygieneStatus, HygieneWarning};
pub use identifiers::{ProfileId, RuleCode, RuleVersion, Timestamp};
pub use validation::{require_text, ValidationError};
