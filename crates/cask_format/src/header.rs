//! Message header record.
//!
//! The header is the offset table of one persisted message: where each
//! sub-record begins, relative to the message start.
//!
//! ## Record layout
//!
//! ```text
//! V1: | version (2) | message_size (8) | properties (4) | user_metadata (4) | blob (4) | crc (8) |
//! V2: | version (2) | message_size (8) | encryption_key (4) | properties (4)
//!     | user_metadata (4) | blob (4) | crc (8) |
//! ```
//!
//! Offsets are signed on the wire; -1 means the record is absent. Decoding
//! parses the fields and captures the stored and recomputed CRC without
//! comparing them, so a header can be read into memory first and validated
//! as a separate, explicit [`MessageHeader::verify`] step before its
//! offsets are trusted.

use bytes::Bytes;

use crate::crc::CRC_SIZE;
use crate::error::{FormatError, FormatResult};
use crate::version::HeaderVersion;
use crate::wire::{RecordReader, RecordWriter, VERSION_FIELD_SIZE};

/// Wire value marking an absent offset slot.
const OFFSET_ABSENT: i32 = -1;

/// Exact serialized size of a message header at `version`.
#[must_use]
pub fn header_size(version: HeaderVersion) -> usize {
    let offsets = match version {
        HeaderVersion::V1 => 3,
        HeaderVersion::V2 => 4,
    };
    VERSION_FIELD_SIZE + 8 + offsets * 4 + CRC_SIZE
}

fn encode_offset(offset: Option<u32>) -> FormatResult<i32> {
    match offset {
        None => Ok(OFFSET_ABSENT),
        Some(v) => i32::try_from(v).map_err(|_| {
            FormatError::invalid_argument(format!("offset {v} exceeds the signed 32-bit range"))
        }),
    }
}

fn decode_offset(raw: i32) -> FormatResult<Option<u32>> {
    if raw == OFFSET_ABSENT {
        Ok(None)
    } else {
        u32::try_from(raw)
            .map(Some)
            .map_err(|_| FormatError::data_corrupt(format!("negative record offset {raw}")))
    }
}

/// Serializes a message header into the front of `buf`.
///
/// Present offsets must be strictly increasing in record order and smaller
/// than `message_size`; `encryption_key_offset` requires
/// [`HeaderVersion::V2`].
///
/// # Errors
///
/// Returns [`FormatError::InvalidArgument`] for an offset-order violation,
/// an encryption key offset at V1, or an undersized buffer. Nothing is
/// written on error.
pub fn serialize_header(
    buf: &mut [u8],
    version: HeaderVersion,
    message_size: u64,
    encryption_key_offset: Option<u32>,
    properties_offset: Option<u32>,
    user_metadata_offset: Option<u32>,
    blob_offset: Option<u32>,
) -> FormatResult<()> {
    if version == HeaderVersion::V1 && encryption_key_offset.is_some() {
        return Err(FormatError::invalid_argument(
            "encryption key offset requires message header v2",
        ));
    }
    let mut last: Option<u32> = None;
    for offset in [
        encryption_key_offset,
        properties_offset,
        user_metadata_offset,
        blob_offset,
    ]
    .into_iter()
    .flatten()
    {
        if last.is_some_and(|prev| offset <= prev) {
            return Err(FormatError::invalid_argument(
                "record offsets must be strictly increasing",
            ));
        }
        if u64::from(offset) >= message_size {
            return Err(FormatError::invalid_argument(format!(
                "record offset {offset} not within message of {message_size} bytes"
            )));
        }
        last = Some(offset);
    }

    // Range-check every slot before the writer exists so a failure leaves
    // the buffer untouched.
    let encryption_key_raw = encode_offset(encryption_key_offset)?;
    let properties_raw = encode_offset(properties_offset)?;
    let user_metadata_raw = encode_offset(user_metadata_offset)?;
    let blob_raw = encode_offset(blob_offset)?;

    let mut w = RecordWriter::new(buf, header_size(version))?;
    w.put_u16(version.tag());
    w.put_u64(message_size);
    if version == HeaderVersion::V2 {
        w.put_i32(encryption_key_raw);
    }
    w.put_i32(properties_raw);
    w.put_i32(user_metadata_raw);
    w.put_i32(blob_raw);
    w.put_crc();
    Ok(())
}

/// A decoded message header.
///
/// Offsets are relative to the message start; `None` means the sub-record
/// is absent from the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    version: HeaderVersion,
    message_size: u64,
    encryption_key_offset: Option<u32>,
    properties_offset: Option<u32>,
    user_metadata_offset: Option<u32>,
    blob_offset: Option<u32>,
    stored_crc: u64,
    computed_crc: u64,
}

impl MessageHeader {
    /// Decodes a header from the front of `stream` without verifying it.
    ///
    /// # Errors
    ///
    /// [`FormatError::UnknownFormatVersion`] for an unrecognized leading
    /// tag; [`FormatError::DataCorrupt`] for truncation or a nonsensical
    /// offset value. A CRC mismatch does **not** fail here; call
    /// [`MessageHeader::verify`].
    pub fn decode(stream: &mut Bytes) -> FormatResult<Self> {
        let mut r = RecordReader::new(stream);
        let version = HeaderVersion::try_from(r.read_u16("version")?)?;
        let message_size = r.read_u64("message size")?;
        let encryption_key_offset = match version {
            HeaderVersion::V1 => None,
            HeaderVersion::V2 => decode_offset(r.read_i32("encryption key offset")?)?,
        };
        let properties_offset = decode_offset(r.read_i32("properties offset")?)?;
        let user_metadata_offset = decode_offset(r.read_i32("user metadata offset")?)?;
        let blob_offset = decode_offset(r.read_i32("blob offset")?)?;
        let (stored_crc, computed_crc) = r.crc_pair()?;
        Ok(Self {
            version,
            message_size,
            encryption_key_offset,
            properties_offset,
            user_metadata_offset,
            blob_offset,
            stored_crc,
            computed_crc,
        })
    }

    /// Recomputed-vs-stored CRC check, as a separate step from decoding.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::DataCorrupt`] on mismatch.
    pub fn verify(&self) -> FormatResult<()> {
        if self.stored_crc != self.computed_crc {
            return Err(FormatError::data_corrupt(format!(
                "header crc mismatch: stored {:#018x}, computed {:#018x}",
                self.stored_crc, self.computed_crc
            )));
        }
        Ok(())
    }

    /// Header schema version.
    #[must_use]
    pub fn version(&self) -> HeaderVersion {
        self.version
    }

    /// Total size of the message this header describes.
    #[must_use]
    pub fn message_size(&self) -> u64 {
        self.message_size
    }

    /// Offset of the blob encryption key record; always `None` at V1.
    #[must_use]
    pub fn encryption_key_offset(&self) -> Option<u32> {
        self.encryption_key_offset
    }

    /// Offset of the blob properties record.
    #[must_use]
    pub fn properties_offset(&self) -> Option<u32> {
        self.properties_offset
    }

    /// Offset of the user metadata record.
    #[must_use]
    pub fn user_metadata_offset(&self) -> Option<u32> {
        self.user_metadata_offset
    }

    /// Offset of the blob content record.
    #[must_use]
    pub fn blob_offset(&self) -> Option<u32> {
        self.blob_offset
    }
}
