use normgate_canonical::{compute_content_id, default_canonicalizer, Digest};
use serde::Serialize;

use crate::errors::CoreError;

/// A record whose identity is the digest of its own canonical content.
pub trait ContentAddressed {
    /// Name of the identity field in the record's JSON shape.
    const ID_FIELD: &'static str;

    /// The record's content id.
    fn content_id(&self) -> &Digest;
}

/// Hashes a record's content (which must not contain its id field).
pub(crate) fn derive_id<T: Serialize>(content: &T, id_field: &str) -> Result<Digest, CoreError> {
    Ok(compute_content_id(content, id_field, default_canonicalizer())?)
}

/// Rejects a supplied id that differs from the recomputed one.
pub(crate) fn check_claimed(
    field: &'static str,
    claimed: Option<Digest>,
    computed: &Digest,
) -> Result<(), CoreError> {
    match claimed {
        Some(claimed) if &claimed != computed => Err(CoreError::IdMismatch {
            field,
            claimed,
            computed: computed.clone(),
        }),
        _ => Ok(()),
    }
}

/// Equality, ordering and hashing by id, plus [`ContentAddressed`].
macro_rules! content_addressed {
    ($record:ident, $id:ident) => {
        impl $crate::identity::ContentAddressed for $record {
            const ID_FIELD: &'static str = stringify!($id);

            fn content_id(&self) -> &normgate_canonical::Digest {
                &self.$id
            }
        }

        impl PartialEq for $record {
            fn eq(&self, other: &Self) -> bool {
                self.$id == other.$id
            }
        }

        impl Eq for $record {}

        impl std::hash::Hash for $record {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.$id.hash(state);
            }
        }

        impl PartialOrd for $record {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $record {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.$id.cmp(&other.$id)
            }
        }
    };
}

pub(crate) use content_addressed;
