use normgate_canonical::Digest;
use thiserror::Error;

/// Core error types.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Content id computation failed.
    #[error("content id computation failed: {0}")]
    ContentId(#[from] normgate_canonical::ContentIdError),
    /// A record field failed validation.
    #[error("invalid record: {0}")]
    Validation(#[from] normgate_canonical::ValidationError),
    /// A supplied identifier does not match the recomputed one.
    #[error("{field} mismatch: claimed {claimed}, computed {computed}")]
    IdMismatch {
        /// Name of the identity field.
        field: &'static str,
        /// Identifier supplied with the record.
        claimed: Digest,
        /// Identifier derived from the record's content.
        computed: Digest,
    },
    /// Decision lists are inconsistent with the precedence rule.
    #[error("invalid decision: {0}")]
    InvalidDecision(String),
}
