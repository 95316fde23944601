//! # Cask Message Format
//!
//! Versioned on-disk/on-wire message format codec for the Cask blob store.
//!
//! A persisted message is the unit for one blob: a header offset table
//! followed by the records it locates.
//!
//! ```text
//! | header | [encryption key] | properties | user metadata | blob content |
//! ```
//!
//! Every record is self-describing (2-byte leading version tag) and, except
//! for the embedded chunk list, ends in an 8-byte CRC trailer covering every
//! preceding byte of that record. Corruption of any covered byte fails the
//! decode of that record with [`FormatError::DataCorrupt`]; an unrecognized
//! version tag fails with [`FormatError::UnknownFormatVersion`] so callers
//! can tell bit damage apart from a reader/writer version skew.
//!
//! ## Record families
//!
//! - Message header (V1, V2) - [`MessageHeader`], [`serialize_header`]
//! - Blob properties (V1..V3) - [`BlobProperties`]
//! - Blob encryption key / user metadata (V1) - opaque payload records
//! - Blob content (V1, V2) - [`BlobData`], with a [`BlobType`]
//!   discriminator from V2
//! - Delete tombstone (V1, V2) - [`DeleteRecord`]
//! - Metadata content (chunk list) - [`CompositeBlobInfo`], the composite
//!   blob representation carried inside a [`BlobType::Metadata`] record
//!
//! ## Write versions
//!
//! The versions a writer emits live in an immutable [`WriteConfig`] passed
//! into every encode call. There is no process-wide mutable default:
//! concurrent writers targeting different schema versions cannot race.
//!
//! All codecs are pure, synchronous transformations over caller-supplied
//! buffers and are freely shareable across threads.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod blob;
mod crc;
mod delete;
mod error;
mod header;
mod message;
mod metadata_content;
mod opaque;
mod properties;
mod version;
mod wire;

pub use blob::{blob_record_size, deserialize_blob, serialize_blob_record, BlobData, BlobType};
pub use crc::{crc, verify, CRC_SIZE};
pub use delete::{
    delete_record_size, deserialize_delete_record, serialize_delete_record, DeleteRecord,
};
pub use error::{FormatError, FormatResult};
pub use header::{header_size, serialize_header, MessageHeader};
pub use message::{deserialize_put_message, serialize_put_message, PutMessage};
pub use metadata_content::{
    deserialize_metadata_content, encode_metadata_content, metadata_content_size,
    serialize_metadata_content, CompositeBlobInfo, METADATA_CONTENT_VERSION_V2,
};
pub use opaque::{
    blob_encryption_key_record_size, deserialize_blob_encryption_key, deserialize_user_metadata,
    serialize_blob_encryption_key_record, serialize_user_metadata_record,
    user_metadata_record_size, BLOB_ENCRYPTION_KEY_VERSION_V1, USER_METADATA_VERSION_V1,
};
pub use properties::BlobProperties;
pub use version::{
    BlobVersion, DeleteVersion, HeaderVersion, PropertiesVersion, WriteConfig,
};
pub use wire::VERSION_FIELD_SIZE;
