use thiserror::Error;

/// Prefix of every technical error message reported by the layout stage.
pub const TECHNICAL_ERROR_PREFIX: &str = "Technical error in layout conformance validation:";

/// Failures that stop layout evaluation before any verdict is meaningful.
///
/// Ordinary rule failures are verdicts, not errors.
#[derive(Error, Debug)]
pub enum LayoutError {
    /// `meta.layout` exists but is not an object.
    #[error("layout metadata must be an object, found {found}")]
    NotAnObject {
        /// JSON type that was found.
        found: &'static str,
    },
    /// A fact has the wrong JSON type.
    #[error("fact '{fact}' must be a {expected}, found {found}")]
    WrongType {
        /// Fact name.
        fact: &'static str,
        /// Required JSON type.
        expected: &'static str,
        /// JSON type that was found.
        found: &'static str,
    },
    /// The static rule table could not be built.
    #[error("rule table unavailable: {0}")]
    RuleTable(String),
    /// The rule table has no entry for a code.
    #[error("no layout rule with code {0}")]
    UnknownRule(String),
    /// Building an evidence or verdict record failed.
    #[error("record construction failed: {0}")]
    Record(#[from] normgate_core::CoreError),
    /// The audited subject has no id.
    #[error("subject unavailable: {0}")]
    Subject(#[from] normgate_kernel::KernelError),
    /// Hashing the verdict report failed.
    #[error("verdict hash failed: {0}")]
    Hash(#[from] normgate_canonical::ContentIdError),
}
