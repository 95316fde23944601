//! Delete (tombstone) record.
//!
//! ## Record layout
//!
//! ```text
//! V1: | version (2) | legacy flag (1) | crc (8) |
//! V2: | version (2) | account_id (2) | container_id (2) | deletion_time (8) | crc (8) |
//! ```
//!
//! The V1 layout predates account, container and deletion-time tracking
//! entirely: whatever values the caller supplies, a V1 round-trip yields
//! UNKNOWN ids and an infinite deletion time.

use bytes::Bytes;
use cask_types::{INFINITE_TIME, UNKNOWN_ACCOUNT_ID, UNKNOWN_CONTAINER_ID};

use crate::crc::CRC_SIZE;
use crate::error::FormatResult;
use crate::version::DeleteVersion;
use crate::wire::{RecordReader, RecordWriter, VERSION_FIELD_SIZE};

/// Tombstone marking a blob as logically deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteRecord {
    account_id: i16,
    container_id: i16,
    deletion_time_ms: i64,
}

impl DeleteRecord {
    /// Creates a tombstone.
    #[must_use]
    pub fn new(account_id: i16, container_id: i16, deletion_time_ms: i64) -> Self {
        Self {
            account_id,
            container_id,
            deletion_time_ms,
        }
    }

    /// Account id, or [`UNKNOWN_ACCOUNT_ID`] under the legacy version.
    #[must_use]
    pub fn account_id(&self) -> i16 {
        self.account_id
    }

    /// Container id, or [`UNKNOWN_CONTAINER_ID`] under the legacy version.
    #[must_use]
    pub fn container_id(&self) -> i16 {
        self.container_id
    }

    /// Deletion time in milliseconds, or [`INFINITE_TIME`] under the legacy
    /// version.
    #[must_use]
    pub fn deletion_time_ms(&self) -> i64 {
        self.deletion_time_ms
    }
}

/// Exact serialized size of a delete record at `version`.
#[must_use]
pub fn delete_record_size(version: DeleteVersion) -> usize {
    let fields = match version {
        DeleteVersion::V1 => 1,
        DeleteVersion::V2 => 2 + 2 + 8,
    };
    VERSION_FIELD_SIZE + fields + CRC_SIZE
}

/// Serializes a delete record into the front of `buf`.
///
/// Under [`DeleteVersion::V1`] the record's account, container and deletion
/// time are not written; the legacy layout has no room for them.
///
/// # Errors
///
/// Returns [`crate::FormatError::InvalidArgument`] when `buf` is smaller
/// than [`delete_record_size`].
pub fn serialize_delete_record(
    buf: &mut [u8],
    version: DeleteVersion,
    record: &DeleteRecord,
) -> FormatResult<()> {
    let mut w = RecordWriter::new(buf, delete_record_size(version))?;
    w.put_u16(version.tag());
    match version {
        DeleteVersion::V1 => {
            // Legacy deleted flag; always set on a tombstone.
            w.put_u8(1);
        }
        DeleteVersion::V2 => {
            w.put_i16(record.account_id);
            w.put_i16(record.container_id);
            w.put_i64(record.deletion_time_ms);
        }
    }
    w.put_crc();
    Ok(())
}

/// Decodes a delete record from the front of `stream`.
///
/// # Errors
///
/// [`crate::FormatError::UnknownFormatVersion`] for an unrecognized tag,
/// [`crate::FormatError::DataCorrupt`] for a CRC mismatch or truncation.
pub fn deserialize_delete_record(stream: &mut Bytes) -> FormatResult<DeleteRecord> {
    let mut r = RecordReader::new(stream);
    let version = DeleteVersion::try_from(r.read_u16("version")?)?;
    let record = match version {
        DeleteVersion::V1 => {
            r.read_u8("legacy flag")?;
            DeleteRecord::new(UNKNOWN_ACCOUNT_ID, UNKNOWN_CONTAINER_ID, INFINITE_TIME)
        }
        DeleteVersion::V2 => {
            let account_id = r.read_i16("account id")?;
            let container_id = r.read_i16("container id")?;
            let deletion_time_ms = r.read_i64("deletion time")?;
            DeleteRecord::new(account_id, container_id, deletion_time_ms)
        }
    };
    r.verify_crc()?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;
    use cask_types::current_time_millis;

    #[test]
    fn v2_roundtrip_is_exact() {
        let record = DeleteRecord::new(41, 17, current_time_millis());
        let mut buf = vec![0u8; delete_record_size(DeleteVersion::V2)];
        serialize_delete_record(&mut buf, DeleteVersion::V2, &record).unwrap();
        let decoded = deserialize_delete_record(&mut Bytes::from(buf)).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn v1_suppresses_caller_values() {
        // The legacy layout cannot carry these fields: decode must yield the
        // sentinels no matter what was passed in.
        let record = DeleteRecord::new(41, 17, current_time_millis());
        let mut buf = vec![0u8; delete_record_size(DeleteVersion::V1)];
        serialize_delete_record(&mut buf, DeleteVersion::V1, &record).unwrap();
        let decoded = deserialize_delete_record(&mut Bytes::from(buf)).unwrap();
        assert_eq!(decoded.account_id(), UNKNOWN_ACCOUNT_ID);
        assert_eq!(decoded.container_id(), UNKNOWN_CONTAINER_ID);
        assert_eq!(decoded.deletion_time_ms(), INFINITE_TIME);
    }

    #[test]
    fn corruption_is_detected_in_both_versions() {
        for version in [DeleteVersion::V1, DeleteVersion::V2] {
            let record = DeleteRecord::new(1, 2, 3);
            let mut buf = vec![0u8; delete_record_size(version)];
            serialize_delete_record(&mut buf, version, &record).unwrap();
            // Flip a trailer byte, as in the classic byte-10 corruption.
            let idx = buf.len() - 1;
            buf[idx] = buf[idx].wrapping_add(1);
            let result = deserialize_delete_record(&mut Bytes::from(buf));
            assert!(matches!(result, Err(FormatError::DataCorrupt { .. })));
        }
    }

    #[test]
    fn unknown_version_rejected() {
        let record = DeleteRecord::new(1, 2, 3);
        let mut buf = vec![0u8; delete_record_size(DeleteVersion::V2)];
        serialize_delete_record(&mut buf, DeleteVersion::V2, &record).unwrap();
        buf[1] = 9;
        let result = deserialize_delete_record(&mut Bytes::from(buf));
        assert!(matches!(
            result,
            Err(FormatError::UnknownFormatVersion { version: 9, .. })
        ));
    }

    #[test]
    fn size_accounting() {
        assert_eq!(delete_record_size(DeleteVersion::V1), 2 + 1 + 8);
        assert_eq!(delete_record_size(DeleteVersion::V2), 2 + 2 + 2 + 8 + 8);
    }
}
