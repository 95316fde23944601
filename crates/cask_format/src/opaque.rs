//! Blob encryption key and user metadata records.
//!
//! Both families carry an opaque payload the codec never interprets:
//!
//! ```text
//! | version (2) | length (4) | payload (N) | crc (8) |
//! ```
//!
//! The CRC covers the payload, so a flip of any byte in the record,
//! payload included, fails the decode.

use bytes::Bytes;

use crate::crc::CRC_SIZE;
use crate::error::{FormatError, FormatResult};
use crate::wire::{RecordReader, RecordWriter, VERSION_FIELD_SIZE};

/// Wire tag of the only blob encryption key record version.
pub const BLOB_ENCRYPTION_KEY_VERSION_V1: u16 = 1;

/// Wire tag of the only user metadata record version.
pub const USER_METADATA_VERSION_V1: u16 = 1;

/// Exact serialized size of a blob encryption key record.
#[must_use]
pub fn blob_encryption_key_record_size(key_len: usize) -> usize {
    opaque_record_size(key_len)
}

/// Exact serialized size of a user metadata record.
#[must_use]
pub fn user_metadata_record_size(metadata_len: usize) -> usize {
    opaque_record_size(metadata_len)
}

fn opaque_record_size(payload_len: usize) -> usize {
    VERSION_FIELD_SIZE + 4 + payload_len + CRC_SIZE
}

/// Serializes a blob encryption key record into the front of `buf`.
///
/// # Errors
///
/// Returns [`FormatError::InvalidArgument`] when `buf` is too small or the
/// key exceeds the 4-byte length field.
pub fn serialize_blob_encryption_key_record(buf: &mut [u8], key: &[u8]) -> FormatResult<()> {
    serialize_opaque_record(buf, BLOB_ENCRYPTION_KEY_VERSION_V1, key, "encryption key")
}

/// Serializes a user metadata record into the front of `buf`.
///
/// # Errors
///
/// Returns [`FormatError::InvalidArgument`] when `buf` is too small or the
/// metadata exceeds the 4-byte length field.
pub fn serialize_user_metadata_record(buf: &mut [u8], metadata: &[u8]) -> FormatResult<()> {
    serialize_opaque_record(buf, USER_METADATA_VERSION_V1, metadata, "user metadata")
}

fn serialize_opaque_record(
    buf: &mut [u8],
    tag: u16,
    payload: &[u8],
    record: &'static str,
) -> FormatResult<()> {
    let len = u32::try_from(payload.len()).map_err(|_| {
        FormatError::invalid_argument(format!("{record} payload exceeds 4-byte length field"))
    })?;
    let mut w = RecordWriter::new(buf, opaque_record_size(payload.len()))?;
    w.put_u16(tag);
    w.put_u32(len);
    w.put_bytes(payload);
    w.put_crc();
    Ok(())
}

/// Decodes a blob encryption key record, returning the raw key bytes.
///
/// # Errors
///
/// [`FormatError::UnknownFormatVersion`] for an unrecognized tag,
/// [`FormatError::DataCorrupt`] for a CRC mismatch or truncation.
pub fn deserialize_blob_encryption_key(stream: &mut Bytes) -> FormatResult<Bytes> {
    deserialize_opaque_record(stream, BLOB_ENCRYPTION_KEY_VERSION_V1, "blob encryption key")
}

/// Decodes a user metadata record, returning the raw metadata bytes.
///
/// # Errors
///
/// [`FormatError::UnknownFormatVersion`] for an unrecognized tag,
/// [`FormatError::DataCorrupt`] for a CRC mismatch or truncation.
pub fn deserialize_user_metadata(stream: &mut Bytes) -> FormatResult<Bytes> {
    deserialize_opaque_record(stream, USER_METADATA_VERSION_V1, "user metadata")
}

fn deserialize_opaque_record(
    stream: &mut Bytes,
    expected_tag: u16,
    record: &'static str,
) -> FormatResult<Bytes> {
    let mut r = RecordReader::new(stream);
    let tag = r.read_u16("version")?;
    if tag != expected_tag {
        return Err(FormatError::unknown_version(record, tag));
    }
    let len = r.read_u32("payload length")? as usize;
    let payload = r.read_bytes(len, "payload")?;
    r.verify_crc()?;
    Ok(payload)
}
