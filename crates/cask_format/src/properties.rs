//! Blob properties value and its versioned codec.
//!
//! ## Record layout
//!
//! ```text
//! V1: | version (2) | ttl (8) | private (1) | created (8) | size (8)
//!     | content_type (4+N) | owner_id (4+N) | service_id (4+N) | crc (8) |
//! V2: V1 fields | account_id (2) | container_id (2) | crc (8) |
//! V3: V2 fields | encrypted (1) | crc (8) |
//! ```
//!
//! Decoding a V1 record always yields UNKNOWN account and container ids;
//! the encryption flag only exists from V3 and decodes to `false` before
//! that.

use bytes::Bytes;
use cask_types::{
    current_time_millis, INFINITE_TIME, UNKNOWN_ACCOUNT_ID, UNKNOWN_CONTAINER_ID,
};

use crate::crc::CRC_SIZE;
use crate::error::FormatResult;
use crate::version::PropertiesVersion;
use crate::wire::{string_field_size, RecordReader, RecordWriter, VERSION_FIELD_SIZE};

/// Immutable metadata describing one stored blob.
///
/// Constructed once on the write path; round-trips through the codec
/// reproduce every field except those the chosen schema version has no room
/// for, which decode to that version's defined default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobProperties {
    blob_size: u64,
    service_id: String,
    owner_id: String,
    content_type: String,
    is_private: bool,
    time_to_live_secs: i64,
    creation_time_ms: i64,
    account_id: i16,
    container_id: i16,
    is_encrypted: bool,
}

impl BlobProperties {
    /// Creates properties with an infinite TTL and the current wall clock as
    /// creation time.
    ///
    /// `creation_time_ms` is always positive and never ahead of the wall
    /// clock at construction.
    #[must_use]
    pub fn new(
        blob_size: u64,
        service_id: impl Into<String>,
        account_id: i16,
        container_id: i16,
    ) -> Self {
        Self {
            blob_size,
            service_id: service_id.into(),
            owner_id: String::new(),
            content_type: String::new(),
            is_private: false,
            time_to_live_secs: INFINITE_TIME,
            creation_time_ms: current_time_millis(),
            account_id,
            container_id,
            is_encrypted: false,
        }
    }

    /// Sets the owner id.
    #[must_use]
    pub fn with_owner_id(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = owner_id.into();
        self
    }

    /// Sets the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Marks the blob private (legacy flag, superseded by container ACLs).
    #[must_use]
    pub fn with_private(mut self, is_private: bool) -> Self {
        self.is_private = is_private;
        self
    }

    /// Sets the TTL in seconds; [`INFINITE_TIME`] means no expiry.
    #[must_use]
    pub fn with_ttl_secs(mut self, ttl: i64) -> Self {
        self.time_to_live_secs = ttl;
        self
    }

    /// Overrides the creation time. Must be positive and not in the future.
    #[must_use]
    pub fn with_creation_time_ms(mut self, creation_time_ms: i64) -> Self {
        self.creation_time_ms = creation_time_ms;
        self
    }

    /// Marks the blob content as encrypted.
    ///
    /// Only carried on the wire from [`PropertiesVersion::V3`]; earlier
    /// versions decode this as `false` regardless.
    #[must_use]
    pub fn with_encrypted(mut self, is_encrypted: bool) -> Self {
        self.is_encrypted = is_encrypted;
        self
    }

    /// Size of the blob content in bytes.
    #[must_use]
    pub fn blob_size(&self) -> u64 {
        self.blob_size
    }

    /// Service that uploaded the blob.
    #[must_use]
    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    /// Owner of the blob; empty when unset.
    #[must_use]
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// MIME content type; empty when unset.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Legacy privacy flag.
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.is_private
    }

    /// TTL in seconds, or [`INFINITE_TIME`].
    #[must_use]
    pub fn time_to_live_secs(&self) -> i64 {
        self.time_to_live_secs
    }

    /// Creation time in milliseconds since the epoch.
    #[must_use]
    pub fn creation_time_ms(&self) -> i64 {
        self.creation_time_ms
    }

    /// Account id, or [`UNKNOWN_ACCOUNT_ID`].
    #[must_use]
    pub fn account_id(&self) -> i16 {
        self.account_id
    }

    /// Container id, or [`UNKNOWN_CONTAINER_ID`].
    #[must_use]
    pub fn container_id(&self) -> i16 {
        self.container_id
    }

    /// Whether the blob content is encrypted.
    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        self.is_encrypted
    }

    /// Exact number of bytes [`BlobProperties::serialize`] writes for this
    /// value at `version`.
    #[must_use]
    pub fn serialized_size(&self, version: PropertiesVersion) -> usize {
        let fixed = VERSION_FIELD_SIZE + 8 + 1 + 8 + 8;
        let strings = string_field_size(&self.content_type)
            + string_field_size(&self.owner_id)
            + string_field_size(&self.service_id);
        let versioned = match version {
            PropertiesVersion::V1 => 0,
            PropertiesVersion::V2 => 2 + 2,
            PropertiesVersion::V3 => 2 + 2 + 1,
        };
        fixed + strings + versioned + CRC_SIZE
    }

    /// Serializes this value at `version` into the front of `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormatError::InvalidArgument`] when `buf` is smaller
    /// than [`BlobProperties::serialized_size`]; nothing is written in that
    /// case.
    pub fn serialize(&self, version: PropertiesVersion, buf: &mut [u8]) -> FormatResult<()> {
        let mut w = RecordWriter::new(buf, self.serialized_size(version))?;
        w.put_u16(version.tag());
        w.put_i64(self.time_to_live_secs);
        w.put_u8(u8::from(self.is_private));
        w.put_i64(self.creation_time_ms);
        w.put_u64(self.blob_size);
        w.put_string(&self.content_type)?;
        w.put_string(&self.owner_id)?;
        w.put_string(&self.service_id)?;
        match version {
            PropertiesVersion::V1 => {}
            PropertiesVersion::V2 => {
                w.put_i16(self.account_id);
                w.put_i16(self.container_id);
            }
            PropertiesVersion::V3 => {
                w.put_i16(self.account_id);
                w.put_i16(self.container_id);
                w.put_u8(u8::from(self.is_encrypted));
            }
        }
        w.put_crc();
        Ok(())
    }

    /// Serializes this value at `version` into a fresh buffer.
    pub fn encode(&self, version: PropertiesVersion) -> FormatResult<Vec<u8>> {
        let mut buf = vec![0u8; self.serialized_size(version)];
        self.serialize(version, &mut buf)?;
        Ok(buf)
    }

    /// Decodes a blob properties record from the front of `stream`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormatError::UnknownFormatVersion`] for an
    /// unrecognized leading tag and [`crate::FormatError::DataCorrupt`] for a
    /// CRC mismatch or truncated record.
    pub fn deserialize(stream: &mut Bytes) -> FormatResult<Self> {
        let mut r = RecordReader::new(stream);
        let version = PropertiesVersion::try_from(r.read_u16("version")?)?;
        let time_to_live_secs = r.read_i64("ttl")?;
        let is_private = r.read_u8("privacy flag")? != 0;
        let creation_time_ms = r.read_i64("creation time")?;
        let blob_size = r.read_u64("blob size")?;
        let content_type = r.read_string("content type")?;
        let owner_id = r.read_string("owner id")?;
        let service_id = r.read_string("service id")?;
        let (account_id, container_id) = match version {
            PropertiesVersion::V1 => (UNKNOWN_ACCOUNT_ID, UNKNOWN_CONTAINER_ID),
            PropertiesVersion::V2 | PropertiesVersion::V3 => {
                (r.read_i16("account id")?, r.read_i16("container id")?)
            }
        };
        let is_encrypted = match version {
            PropertiesVersion::V1 | PropertiesVersion::V2 => false,
            PropertiesVersion::V3 => r.read_u8("encryption flag")? != 0,
        };
        r.verify_crc()?;
        Ok(Self {
            blob_size,
            service_id,
            owner_id,
            content_type,
            is_private,
            time_to_live_secs,
            creation_time_ms,
            account_id,
            container_id,
            is_encrypted,
        })
    }
}
