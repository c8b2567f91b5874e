//! Content id computation.
//!
//! A content id is `sha256(canonical_bytes(record))` where the record's own
//! id field is excluded from the hash input. No domain separator is mixed in,
//! so any RFC 8785 + SHA-256 implementation reproduces the same ids.

use crate::{CanonicalizationError, Canonicalizer, Digest};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest as Sha2Digest, Sha256};

/// Error during content id computation.
#[derive(thiserror::Error, Debug)]
pub enum ContentIdError {
    /// Serialization failed.
    #[error("serialization failed: {0}")]
    Serialization(String),
    /// Canonicalization failed.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// SHA-256 of raw bytes.
pub fn hash_bytes(data: &[u8]) -> Digest {
    Digest::from_bytes(&Sha256::digest(data))
}

/// SHA-256 of a UTF-8 string.
pub fn hash_str(text: &str) -> Digest {
    hash_bytes(text.as_bytes())
}

/// SHA-256 of the canonical encoding of `value`.
///
/// # Errors
///
/// Returns [`ContentIdError`] if the value fails canonical validation.
pub fn hash_value(value: &Value, canonicalizer: &Canonicalizer) -> Result<Digest, ContentIdError> {
    let result = canonicalizer.canonicalize(value)?;
    Ok(hash_bytes(&result.bytes))
}

/// Computes the content id of a record.
///
/// `id_field` names the record's own identifier; it is removed from the
/// top-level object before hashing so the id never hashes itself.
///
/// # Example
///
/// ```rust
/// use normgate_canonical::{compute_content_id, default_canonicalizer};
/// use serde_json::json;
///
/// let record = json!({"code": "APA7-MARGIN-TOP", "version": "7.0.0"});
/// let with_id = json!({"rule_id": "ignored", "version": "7.0.0", "code": "APA7-MARGIN-TOP"});
///
/// let a = compute_content_id(&record, "rule_id", default_canonicalizer())?;
/// let b = compute_content_id(&with_id, "rule_id", default_canonicalizer())?;
/// assert_eq!(a, b);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
///
/// Returns [`ContentIdError`] if serialization or canonicalization fails.
pub fn compute_content_id<T: Serialize>(
    record: &T,
    id_field: &str,
    canonicalizer: &Canonicalizer,
) -> Result<Digest, ContentIdError> {
    let mut value: Value =
        serde_json::to_value(record).map_err(|e| ContentIdError::Serialization(e.to_string()))?;

    if let Value::Object(map) = &mut value {
        map.remove(id_field);
    }

    hash_value(&value, canonicalizer)
}

/// Verifies that a claimed id matches the computed content id.
///
/// # Errors
///
/// Returns [`ContentIdError`] if computation fails.
pub fn verify_content_id<T: Serialize>(
    record: &T,
    id_field: &str,
    claimed_id: &Digest,
    canonicalizer: &Canonicalizer,
) -> Result<bool, ContentIdError> {
    let computed = compute_content_id(record, id_field, canonicalizer)?;
    Ok(&computed == claimed_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_canonicalizer;
    use serde_json::json;

    #[test]
    fn known_vector() {
        // sha256("abc")
        assert_eq!(
            hash_str("abc").as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn hash_value_hashes_canonical_bytes() {
        let digest = hash_value(&json!({"b": 2, "a": 1}), default_canonicalizer()).unwrap();
        assert_eq!(digest, hash_str(r#"{"a":1,"b":2}"#));
    }

    #[test]
    fn id_field_is_excluded() {
        let c = default_canonicalizer();
        let plain = compute_content_id(&json!({"x": 1}), "x_id", c).unwrap();
        let claimed = compute_content_id(&json!({"x": 1, "x_id": "zzz"}), "x_id", c).unwrap();
        assert_eq!(plain, claimed);
        assert!(verify_content_id(&json!({"x": 1}), "x_id", &plain, c).unwrap());
        let other = compute_content_id(&json!({"x": 2}), "x_id", c).unwrap();
        assert!(!verify_content_id(&json!({"x": 1}), "x_id", &other, c).unwrap());
    }
}
