//! Mock content keys with a configurable fixed size.

use cask_types::{ContentKey, KeyError, KeyFactory, KeyResult};
use rand::RngCore;

/// A content key that is just its serialized bytes.
///
/// Ordering is bytewise, matching the serialized form as the
/// [`ContentKey`] contract requires.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MockKey(Vec<u8>);

impl MockKey {
    /// Creates a key from raw bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Creates a random key of `size` bytes.
    #[must_use]
    pub fn random(size: usize) -> Self {
        let mut bytes = vec![0u8; size];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }
}

impl ContentKey for MockKey {
    fn size_in_bytes(&self) -> usize {
        self.0.len()
    }

    fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.0);
    }
}

/// Factory producing [`MockKey`]s of one fixed size.
#[derive(Debug, Clone, Copy)]
pub struct MockKeyFactory {
    key_size: usize,
}

impl MockKeyFactory {
    /// Creates a factory for keys of `key_size` bytes.
    #[must_use]
    pub fn new(key_size: usize) -> Self {
        Self { key_size }
    }
}

impl KeyFactory for MockKeyFactory {
    type Key = MockKey;

    fn key_size(&self) -> usize {
        self.key_size
    }

    fn key_from_bytes(&self, bytes: &[u8]) -> KeyResult<MockKey> {
        if bytes.len() != self.key_size {
            return Err(KeyError::InvalidLength {
                expected: self.key_size,
                actual: bytes.len(),
            });
        }
        Ok(MockKey(bytes.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_roundtrip() {
        let factory = MockKeyFactory::new(16);
        let key = MockKey::random(16);
        let mut buf = Vec::new();
        key.write_to(&mut buf);
        assert_eq!(buf.len(), key.size_in_bytes());
        assert_eq!(factory.key_from_bytes(&buf).unwrap(), key);
    }

    #[test]
    fn factory_rejects_wrong_length() {
        let factory = MockKeyFactory::new(16);
        let result = factory.key_from_bytes(&[0u8; 15]);
        assert!(matches!(result, Err(KeyError::InvalidLength { .. })));
    }

    #[test]
    fn ordering_matches_bytes() {
        let a = MockKey::new(vec![0, 1]);
        let b = MockKey::new(vec![0, 2]);
        assert!(a < b);
    }
}
