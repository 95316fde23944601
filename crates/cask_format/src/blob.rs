//! Blob content record.
//!
//! ## Record layout
//!
//! ```text
//! V1: | version (2) | size (8) | payload (N) | crc (8) |
//! V2: | version (2) | size (8) | blob type (1) | payload (N) | crc (8) |
//! ```
//!
//! V2's blob type byte lets a composite blob carry its chunk list as the
//! payload of a [`BlobType::Metadata`] record. Decode distinguishes three
//! failures: an unrecognized version tag is an unknown-version error, an
//! unrecognized blob type byte is corruption, and any CRC mismatch over the
//! full record is corruption.

use bytes::Bytes;

use crate::crc::CRC_SIZE;
use crate::error::{FormatError, FormatResult};
use crate::version::BlobVersion;
use crate::wire::{RecordReader, RecordWriter, VERSION_FIELD_SIZE};

/// Discriminator carried by blob content records from V2 on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BlobType {
    /// Raw blob content.
    Data = 0,
    /// A serialized chunk list describing a composite blob.
    Metadata = 1,
}

impl BlobType {
    /// Converts a wire byte to a blob type.
    #[must_use]
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Self::Data),
            1 => Some(Self::Metadata),
            _ => None,
        }
    }

    /// Returns the wire byte for this blob type.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

/// Decoded blob content: the payload bounded to exactly `size` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobData {
    blob_type: BlobType,
    size: u64,
    content: Bytes,
}

impl BlobData {
    /// The blob type; always [`BlobType::Data`] for V1 records.
    #[must_use]
    pub fn blob_type(&self) -> BlobType {
        self.blob_type
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The payload, zero-copy from the decoded stream.
    #[must_use]
    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// Consumes the record, returning the payload.
    #[must_use]
    pub fn into_content(self) -> Bytes {
        self.content
    }
}

/// Exact serialized size of a blob content record holding `payload_len`
/// bytes at `version`.
#[must_use]
pub fn blob_record_size(version: BlobVersion, payload_len: usize) -> usize {
    let type_field = match version {
        BlobVersion::V1 => 0,
        BlobVersion::V2 => 1,
    };
    VERSION_FIELD_SIZE + 8 + type_field + payload_len + CRC_SIZE
}

/// Serializes a blob content record into the front of `buf`.
///
/// # Errors
///
/// Returns [`FormatError::InvalidArgument`] when `buf` is too small, or when
/// a [`BlobType::Metadata`] payload is requested at [`BlobVersion::V1`],
/// whose layout has no room for the discriminator.
pub fn serialize_blob_record(
    buf: &mut [u8],
    version: BlobVersion,
    blob_type: BlobType,
    payload: &[u8],
) -> FormatResult<()> {
    if version == BlobVersion::V1 && blob_type != BlobType::Data {
        return Err(FormatError::invalid_argument(
            "metadata blobs require blob record v2",
        ));
    }
    let mut w = RecordWriter::new(buf, blob_record_size(version, payload.len()))?;
    w.put_u16(version.tag());
    w.put_u64(payload.len() as u64);
    if version == BlobVersion::V2 {
        w.put_u8(blob_type.as_byte());
    }
    w.put_bytes(payload);
    w.put_crc();
    Ok(())
}

/// Decodes a blob content record from the front of `stream`.
///
/// # Errors
///
/// [`FormatError::UnknownFormatVersion`] for an unrecognized leading tag;
/// [`FormatError::DataCorrupt`] for an unrecognized blob type byte, a CRC
/// mismatch, or truncation.
pub fn deserialize_blob(stream: &mut Bytes) -> FormatResult<BlobData> {
    let mut r = RecordReader::new(stream);
    let version = BlobVersion::try_from(r.read_u16("version")?)?;
    let size = r.read_u64("blob size")?;
    let blob_type = match version {
        BlobVersion::V1 => BlobType::Data,
        BlobVersion::V2 => {
            let b = r.read_u8("blob type")?;
            BlobType::from_byte(b)
                .ok_or_else(|| FormatError::data_corrupt(format!("unrecognized blob type {b}")))?
        }
    };
    let len = usize::try_from(size)
        .map_err(|_| FormatError::data_corrupt("blob size exceeds addressable memory"))?;
    let content = r.read_bytes(len, "blob content")?;
    r.verify_crc()?;
    Ok(BlobData {
        blob_type,
        size,
        content,
    })
}
