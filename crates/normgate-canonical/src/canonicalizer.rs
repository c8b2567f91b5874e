use canonical_json::to_string;
use serde_json::Value;

use crate::hygiene::HygieneReport;
use crate::identifiers::ProfileId;
use std::fmt;
use std::sync::LazyLock;

/// Profile identifier used for every normgate content id.
pub const DEFAULT_PROFILE: &str = "normgate-canonical-v1";

/// Deepest nesting accepted before a value is rejected.
pub const MAX_DEPTH: usize = 128;

static DEFAULT_CANONICALIZER: LazyLock<Canonicalizer> =
    LazyLock::new(|| Canonicalizer::new(ProfileId::new(DEFAULT_PROFILE.to_string())));

/// Returns the process-wide canonicalizer bound to [`DEFAULT_PROFILE`].
pub fn default_canonicalizer() -> &'static Canonicalizer {
    &DEFAULT_CANONICALIZER
}

/// Error returned when canonicalization fails.
#[derive(thiserror::Error, Debug)]
pub enum CanonicalizationError {
    /// Provided JSON could not be canonicalized.
    #[error("invalid JSON structure: {0}")]
    InvalidStructure(String),
    /// Non-finite number (NaN/Infinity) detected.
    #[error("non-finite number detected at {0}")]
    NonFiniteNumber(String),
    /// Nesting exceeds [`MAX_DEPTH`].
    #[error("nesting deeper than {max} levels at {path}")]
    DepthExceeded {
        /// Path where the limit was crossed.
        path: String,
        /// Configured limit.
        max: usize,
    },
    /// Generic failure from the JCS encoder.
    #[error("other error: {0}")]
    Other(String),
}

/// Result of canonicalization.
#[derive(Debug)]
pub struct CanonicalizationResult {
    /// Canonical UTF-8 bytes for the input value.
    pub bytes: Vec<u8>,
    /// Hygiene report describing the validation walk.
    pub report: HygieneReport,
}

/// Helper for building JSON paths during validation.
#[derive(Debug, Clone)]
struct Path {
    segments: Vec<String>,
}

impl Path {
    fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    fn depth(&self) -> usize {
        self.segments.len()
    }

    fn push_field(&self, field: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(field.to_string());
        Self { segments }
    }

    fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(format!("[{}]", index));
        Self { segments }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "root")
        } else {
            write!(f, "{}", self.segments.join("."))
        }
    }
}

/// Canonicalizer that emits deterministic bytes.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    profile: ProfileId,
}

impl Canonicalizer {
    /// Creates a new canonicalizer for the provided profile.
    pub fn new(profile: ProfileId) -> Self {
        Self { profile }
    }

    /// Produces canonical bytes + hygiene report.
    pub fn canonicalize(
        &self,
        value: &Value,
    ) -> Result<CanonicalizationResult, CanonicalizationError> {
        self.canonicalize_with_report(value).map_err(|(err, _)| err)
    }

    /// Produces canonical bytes + hygiene report, returning the report even on error.
    pub fn canonicalize_with_report(
        &self,
        value: &Value,
    ) -> Result<CanonicalizationResult, (CanonicalizationError, HygieneReport)> {
        let mut report = HygieneReport::new(self.profile.clone());

        if let Err(e) = self.validate(value, Path::root(), &mut report) {
            return Err((e, report));
        }

        // RFC 8785: sorted keys, no insignificant whitespace
        let canonical = match to_string(value) {
            Ok(s) => s,
            Err(err) => {
                report.reject("EncoderFailure");
                return Err((CanonicalizationError::Other(err.to_string()), report));
            }
        };

        Ok(CanonicalizationResult {
            bytes: canonical.into_bytes(),
            report,
        })
    }

    /// Walks the tree, enforcing the depth limit and finite numbers.
    #[allow(clippy::only_used_in_recursion)]
    fn validate(
        &self,
        value: &Value,
        path: Path,
        report: &mut HygieneReport,
    ) -> Result<(), CanonicalizationError> {
        if path.depth() > MAX_DEPTH {
            report.reject("DepthExceeded");
            return Err(CanonicalizationError::DepthExceeded {
                path: path.to_string(),
                max: MAX_DEPTH,
            });
        }
        report.record_depth(path.depth() as u64);

        match value {
            Value::Object(map) => {
                report.bump("objects");
                for (key, child) in map {
                    self.validate(child, path.push_field(key), report)?;
                }
                Ok(())
            }
            Value::Array(items) => {
                report.bump("arrays");
                for (idx, item) in items.iter().enumerate() {
                    self.validate(item, path.push_index(idx), report)?;
                }
                Ok(())
            }
            Value::Number(num) => {
                report.bump("numbers");
                if let Some(f) = num.as_f64() {
                    if !f.is_finite() {
                        report.reject("NonFiniteNumber");
                        return Err(CanonicalizationError::NonFiniteNumber(path.to_string()));
                    }
                    // JCS renders 1.0 and 1 identically
                    if num.is_f64() && f.fract() == 0.0 {
                        report.bump("integral_floats");
                    }
                }
                Ok(())
            }
            Value::String(_) => {
                report.bump("strings");
                Ok(())
            }
            Value::Bool(_) | Value::Null => Ok(()),
        }
    }
}
