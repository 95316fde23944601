//! Content key contract.
//!
//! Composite (chunked) blobs are addressed by opaque content keys. The codec
//! only needs two things from a key: a fixed serialized size, and a way to
//! rebuild one from exactly that many bytes. Everything else about the key
//! format belongs to the store that mints them.

use std::fmt;
use thiserror::Error;

/// Result type for key operations.
pub type KeyResult<T> = Result<T, KeyError>;

/// Errors raised by a [`KeyFactory`] when rebuilding a key from raw bytes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The byte slice does not match the factory's fixed key size.
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Expected size in bytes.
        expected: usize,
        /// Actual size in bytes.
        actual: usize,
    },

    /// The bytes have the right length but do not form a valid key.
    #[error("malformed key: {message}")]
    Malformed {
        /// Description of the problem.
        message: String,
    },
}

impl KeyError {
    /// Creates a malformed key error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

/// An opaque key addressing one chunk of a composite blob.
///
/// Keys are ordered so the store can use them for index lookup. The ordering
/// is bytewise over the serialized form; implementations must keep `Ord`
/// consistent with the bytes written by [`ContentKey::write_to`].
pub trait ContentKey: Clone + Eq + Ord + fmt::Debug {
    /// Serialized size of this key in bytes.
    fn size_in_bytes(&self) -> usize;

    /// Appends the serialized form of this key to `buf`.
    ///
    /// Must write exactly [`ContentKey::size_in_bytes`] bytes.
    fn write_to(&self, buf: &mut Vec<u8>);
}

/// Rebuilds [`ContentKey`]s from their serialized form.
///
/// The factory fixes the key size for a deployment; every key it produces or
/// accepts has exactly that serialized size.
pub trait KeyFactory {
    /// The key type this factory produces.
    type Key: ContentKey;

    /// Fixed serialized size of every key, in bytes.
    fn key_size(&self) -> usize;

    /// Rebuilds a key from exactly [`KeyFactory::key_size`] bytes.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidLength`] if `bytes` has the wrong length,
    /// or [`KeyError::Malformed`] if the bytes do not form a valid key.
    fn key_from_bytes(&self, bytes: &[u8]) -> KeyResult<Self::Key>;
}
