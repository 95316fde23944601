//! Metadata content (chunk list) record for composite blobs.
//!
//! ## Record layout
//!
//! ```text
//! | version (2) | chunk_size (4) | total_size (8) | key_count (4) | keys (count * key_size) |
//! ```
//!
//! This is the one record family without a CRC trailer: the chunk list is
//! always embedded as the payload of a CRC-protected blob content record,
//! so the outer framing already covers it. Adding a trailer here would
//! change the wire format and break existing readers.

use bytes::Bytes;
use cask_types::{ContentKey, KeyFactory};

use crate::error::{FormatError, FormatResult};
use crate::wire::{RecordReader, RecordWriter, VERSION_FIELD_SIZE};

/// Wire tag of the only visible metadata content version.
pub const METADATA_CONTENT_VERSION_V2: u16 = 2;

/// Decoded chunk list of a composite blob.
///
/// Key order is chunk order; the codec never reorders or deduplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeBlobInfo<K> {
    chunk_size: i32,
    total_size: i64,
    keys: Vec<K>,
}

impl<K> CompositeBlobInfo<K> {
    /// Size of every chunk except possibly the last, in bytes.
    #[must_use]
    pub fn chunk_size(&self) -> i32 {
        self.chunk_size
    }

    /// Sum of all chunk payload sizes in bytes.
    #[must_use]
    pub fn total_size(&self) -> i64 {
        self.total_size
    }

    /// Chunk keys in chunk order.
    #[must_use]
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Consumes the info, returning the keys in chunk order.
    #[must_use]
    pub fn into_keys(self) -> Vec<K> {
        self.keys
    }
}

/// Exact serialized size of a chunk list with `key_count` keys of
/// `key_size` bytes each.
#[must_use]
pub fn metadata_content_size(key_size: usize, key_count: usize) -> usize {
    VERSION_FIELD_SIZE + 4 + 8 + 4 + key_size * key_count
}

fn check_chunk_invariant(chunk_size: i32, total_size: i64, key_count: usize) -> FormatResult<()> {
    if chunk_size <= 0 {
        return Err(FormatError::invalid_argument(format!(
            "chunk size must be positive, got {chunk_size}"
        )));
    }
    let n = key_count as i64;
    let cs = i64::from(chunk_size);
    let floor = (n - 1).checked_mul(cs).ok_or_else(|| {
        FormatError::invalid_argument("chunk size and key count overflow the size range")
    })?;
    let ceil = n.checked_mul(cs).ok_or_else(|| {
        FormatError::invalid_argument("chunk size and key count overflow the size range")
    })?;
    // The last chunk holds the remainder: strictly positive, at most a full
    // chunk.
    if total_size <= floor || total_size > ceil {
        return Err(FormatError::invalid_argument(format!(
            "total size {total_size} outside ({floor}, {ceil}] for {key_count} chunks of {chunk_size}"
        )));
    }
    Ok(())
}

/// Serializes a chunk list into the front of `buf`.
///
/// The chunk-size/total-size/key-count invariant is checked before any byte
/// is written.
///
/// # Errors
///
/// Returns [`FormatError::InvalidArgument`] when the invariant is violated
/// or `buf` is too small. Invariant violations are caller-contract errors,
/// not corruption.
pub fn serialize_metadata_content<K: ContentKey>(
    buf: &mut [u8],
    chunk_size: i32,
    total_size: i64,
    keys: &[K],
) -> FormatResult<()> {
    check_chunk_invariant(chunk_size, total_size, keys.len())?;
    let count = u32::try_from(keys.len())
        .map_err(|_| FormatError::invalid_argument("key count exceeds 4-byte count field"))?;
    let keys_len: usize = keys.iter().map(ContentKey::size_in_bytes).sum();
    let required = VERSION_FIELD_SIZE + 4 + 8 + 4 + keys_len;
    let mut w = RecordWriter::new(buf, required)?;
    w.put_u16(METADATA_CONTENT_VERSION_V2);
    w.put_i32(chunk_size);
    w.put_i64(total_size);
    w.put_u32(count);
    let mut scratch = Vec::with_capacity(keys_len);
    for key in keys {
        scratch.clear();
        key.write_to(&mut scratch);
        w.put_bytes(&scratch);
    }
    Ok(())
}

/// Serializes a chunk list into a fresh buffer.
pub fn encode_metadata_content<K: ContentKey>(
    chunk_size: i32,
    total_size: i64,
    keys: &[K],
) -> FormatResult<Vec<u8>> {
    let keys_len: usize = keys.iter().map(ContentKey::size_in_bytes).sum();
    let mut buf = vec![0u8; VERSION_FIELD_SIZE + 4 + 8 + 4 + keys_len];
    serialize_metadata_content(&mut buf, chunk_size, total_size, keys)?;
    Ok(buf)
}

/// Decodes a chunk list from the front of `stream`, rebuilding each key
/// through `factory`.
///
/// The encode-time invariant is assumed, not re-checked: the bytes sit
/// inside a CRC-verified outer record.
///
/// # Errors
///
/// [`FormatError::UnknownFormatVersion`] for an unrecognized tag;
/// [`FormatError::DataCorrupt`] when the stream is truncated or the factory
/// rejects a key.
pub fn deserialize_metadata_content<F: KeyFactory>(
    stream: &mut Bytes,
    factory: &F,
) -> FormatResult<CompositeBlobInfo<F::Key>> {
    let mut r = RecordReader::new(stream);
    let tag = r.read_u16("version")?;
    if tag != METADATA_CONTENT_VERSION_V2 {
        return Err(FormatError::unknown_version("metadata content", tag));
    }
    let chunk_size = r.read_i32("chunk size")?;
    let total_size = r.read_i64("total size")?;
    let count = r.read_u32("key count")? as usize;
    let key_size = factory.key_size();
    // A corrupted count must not drive the allocation past what the stream
    // can actually hold.
    let mut keys = Vec::with_capacity(count.min(r.remaining() / key_size.max(1)));
    for i in 0..count {
        let raw = r.read_bytes(key_size, "chunk key")?;
        let key = factory
            .key_from_bytes(&raw)
            .map_err(|e| FormatError::data_corrupt(format!("chunk key {i}: {e}")))?;
        keys.push(key);
    }
    Ok(CompositeBlobInfo {
        chunk_size,
        total_size,
        keys,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cask_testkit::{MockKey, MockKeyFactory};

    fn keys(count: usize, size: usize) -> Vec<MockKey> {
        (0..count).map(|_| MockKey::random(size)).collect()
    }

    #[test]
    fn roundtrip_preserves_key_order() {
        let keys = keys(5, 60);
        let encoded = encode_metadata_content(1 << 20, 5 * (1 << 20) - 11, &keys).unwrap();
        assert_eq!(encoded.len(), metadata_content_size(60, 5));
        let factory = MockKeyFactory::new(60);
        let mut stream = Bytes::from(encoded);
        let info = deserialize_metadata_content(&mut stream, &factory).unwrap();
        assert_eq!(info.chunk_size(), 1 << 20);
        assert_eq!(info.total_size(), 5 * (1 << 20) - 11);
        assert_eq!(info.keys(), &keys[..]);
        assert!(stream.is_empty());
    }

    #[test]
    fn invariant_boundaries() {
        // 5 keys of chunk size 10: valid totals are (40, 50].
        let keys = keys(5, 16);
        assert!(encode_metadata_content(10, 41, &keys).is_ok());
        assert!(encode_metadata_content(10, 50, &keys).is_ok());
        for (chunk_size, total_size) in [(10, 40), (10, 51), (0, 5), (5, -10), (-3, 20)] {
            let result = encode_metadata_content(chunk_size, total_size, &keys);
            assert!(
                matches!(result, Err(FormatError::InvalidArgument { .. })),
                "chunk {chunk_size} total {total_size} should be rejected"
            );
        }
    }

    #[test]
    fn invalid_arguments_write_nothing() {
        let keys = keys(2, 8);
        let mut buf = vec![0u8; metadata_content_size(8, 2)];
        let result = serialize_metadata_content(&mut buf, 10, 40, &keys);
        assert!(matches!(result, Err(FormatError::InvalidArgument { .. })));
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn unknown_version_rejected() {
        let keys = keys(2, 8);
        let mut encoded = encode_metadata_content(10, 15, &keys).unwrap();
        encoded[1] = 3;
        let factory = MockKeyFactory::new(8);
        let result = deserialize_metadata_content(&mut Bytes::from(encoded), &factory);
        assert!(matches!(
            result,
            Err(FormatError::UnknownFormatVersion { version: 3, .. })
        ));
    }

    #[test]
    fn inflated_key_count_fails_without_huge_allocation() {
        // Hand-built record claiming u32::MAX keys but carrying two; the
        // decode must fail on the missing bytes, not reserve for the claim.
        let keys = keys(2, 8);
        let mut encoded = encode_metadata_content(10, 15, &keys).unwrap();
        encoded[14..18].copy_from_slice(&u32::MAX.to_be_bytes());
        let factory = MockKeyFactory::new(8);
        let result = deserialize_metadata_content(&mut Bytes::from(encoded), &factory);
        assert!(matches!(result, Err(FormatError::DataCorrupt { .. })));
    }

    #[test]
    fn truncated_keys_are_corruption() {
        let keys = keys(3, 12);
        let encoded = encode_metadata_content(100, 250, &keys).unwrap();
        let truncated = Bytes::from(encoded).slice(..metadata_content_size(12, 3) - 5);
        let factory = MockKeyFactory::new(12);
        let result = deserialize_metadata_content(&mut truncated.clone(), &factory);
        assert!(matches!(result, Err(FormatError::DataCorrupt { .. })));
    }
}
