//! Assembly and disassembly of whole put messages.
//!
//! A put message is the contiguous persisted unit for one blob:
//!
//! ```text
//! | header | [encryption key] | properties | user metadata | blob content |
//! ```
//!
//! The writer computes the record offsets, serializes every record through
//! its own codec, and returns one buffer. The reader decodes and verifies
//! the header first, then locates and independently decodes each sub-record
//! at its offset. Per-record corruption is surfaced as-is; a failed decode
//! never yields a partially populated message.

use bytes::Bytes;

use crate::blob::{blob_record_size, deserialize_blob, serialize_blob_record, BlobData, BlobType};
use crate::error::{FormatError, FormatResult};
use crate::header::{header_size, serialize_header, MessageHeader};
use crate::opaque::{
    blob_encryption_key_record_size, deserialize_blob_encryption_key, deserialize_user_metadata,
    serialize_blob_encryption_key_record, serialize_user_metadata_record,
    user_metadata_record_size,
};
use crate::properties::BlobProperties;
use crate::version::{HeaderVersion, WriteConfig};

/// A fully decoded put message.
#[derive(Debug, Clone)]
pub struct PutMessage {
    header: MessageHeader,
    properties: BlobProperties,
    encryption_key: Option<Bytes>,
    user_metadata: Bytes,
    blob: BlobData,
}

impl PutMessage {
    /// The verified message header.
    #[must_use]
    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    /// The blob properties.
    #[must_use]
    pub fn properties(&self) -> &BlobProperties {
        &self.properties
    }

    /// The raw encryption key, when the message carries one.
    #[must_use]
    pub fn encryption_key(&self) -> Option<&Bytes> {
        self.encryption_key.as_ref()
    }

    /// The raw user metadata.
    #[must_use]
    pub fn user_metadata(&self) -> &Bytes {
        &self.user_metadata
    }

    /// The blob content record.
    #[must_use]
    pub fn blob(&self) -> &BlobData {
        &self.blob
    }
}

/// Serializes a complete put message into a fresh buffer.
///
/// Record order is header, optional encryption key, properties, user
/// metadata, blob content; every record is written by its own codec at the
/// version `config` selects.
///
/// # Errors
///
/// Returns [`FormatError::InvalidArgument`] when an encryption key is
/// supplied with [`HeaderVersion::V1`] (whose header has no offset slot for
/// it), when the message grows past the signed 32-bit offset range, or when
/// a [`BlobType::Metadata`] payload is paired with blob record v1.
pub fn serialize_put_message(
    config: WriteConfig,
    properties: &BlobProperties,
    encryption_key: Option<&[u8]>,
    user_metadata: &[u8],
    blob: &[u8],
    blob_type: BlobType,
) -> FormatResult<Vec<u8>> {
    if config.header == HeaderVersion::V1 && encryption_key.is_some() {
        return Err(FormatError::invalid_argument(
            "message header v1 cannot reference an encryption key record",
        ));
    }

    let header_len = header_size(config.header);
    let key_len = encryption_key.map(|k| blob_encryption_key_record_size(k.len()));
    let props_len = properties.serialized_size(config.properties);
    let meta_len = user_metadata_record_size(user_metadata.len());
    let blob_len = blob_record_size(config.blob, blob.len());

    let mut cursor = header_len;
    let key_offset = key_len.map(|len| {
        let offset = cursor;
        cursor += len;
        offset
    });
    let props_offset = cursor;
    cursor += props_len;
    let meta_offset = cursor;
    cursor += meta_len;
    let blob_offset = cursor;
    cursor += blob_len;
    let message_size = cursor;

    let as_offset = |offset: usize| {
        u32::try_from(offset)
            .ok()
            .filter(|v| i32::try_from(*v).is_ok())
            .ok_or_else(|| {
                FormatError::invalid_argument("message exceeds the signed 32-bit offset range")
            })
    };

    let mut buf = vec![0u8; message_size];
    serialize_header(
        &mut buf[..header_len],
        config.header,
        message_size as u64,
        key_offset.map(as_offset).transpose()?,
        Some(as_offset(props_offset)?),
        Some(as_offset(meta_offset)?),
        Some(as_offset(blob_offset)?),
    )?;
    if let (Some(key), Some(offset)) = (encryption_key, key_offset) {
        serialize_blob_encryption_key_record(&mut buf[offset..props_offset], key)?;
    }
    properties.serialize(config.properties, &mut buf[props_offset..meta_offset])?;
    serialize_user_metadata_record(&mut buf[meta_offset..blob_offset], user_metadata)?;
    serialize_blob_record(&mut buf[blob_offset..], config.blob, blob_type, blob)?;

    tracing::trace!(
        message_size,
        blob_len = blob.len(),
        encrypted = encryption_key.is_some(),
        "assembled put message"
    );
    Ok(buf)
}

fn record_stream(message: &Bytes, offset: u32, record: &str) -> FormatResult<Bytes> {
    let offset = offset as usize;
    if offset >= message.len() {
        return Err(FormatError::data_corrupt(format!(
            "{record} offset {offset} outside message of {} bytes",
            message.len()
        )));
    }
    Ok(message.slice(offset..))
}

/// Decodes a complete put message from `buf`.
///
/// The header is decoded and verified first; its offsets then locate each
/// sub-record, which is decoded independently so corruption is reported for
/// the record that actually suffered it.
///
/// # Errors
///
/// Any [`FormatError`] raised by the header or a sub-record codec, plus
/// [`FormatError::DataCorrupt`] when the buffer is shorter than the
/// header's `message_size` or a required record is missing.
pub fn deserialize_put_message(buf: &Bytes) -> FormatResult<PutMessage> {
    let mut stream = buf.clone();
    let header = MessageHeader::decode(&mut stream)?;
    if let Err(e) = header.verify() {
        tracing::warn!(error = %e, "message header failed verification");
        return Err(e);
    }

    let message_size = usize::try_from(header.message_size())
        .map_err(|_| FormatError::data_corrupt("message size exceeds addressable memory"))?;
    if message_size > buf.len() {
        return Err(FormatError::data_corrupt(format!(
            "message truncated: header says {message_size} bytes, buffer has {}",
            buf.len()
        )));
    }
    let message = buf.slice(..message_size);

    let encryption_key = match header.encryption_key_offset() {
        Some(offset) => {
            let mut s = record_stream(&message, offset, "encryption key record")?;
            Some(deserialize_blob_encryption_key(&mut s)?)
        }
        None => None,
    };

    let props_offset = header
        .properties_offset()
        .ok_or_else(|| FormatError::data_corrupt("put message missing properties record"))?;
    let mut s = record_stream(&message, props_offset, "properties record")?;
    let properties = BlobProperties::deserialize(&mut s)?;

    let meta_offset = header
        .user_metadata_offset()
        .ok_or_else(|| FormatError::data_corrupt("put message missing user metadata record"))?;
    let mut s = record_stream(&message, meta_offset, "user metadata record")?;
    let user_metadata = deserialize_user_metadata(&mut s)?;

    let blob_offset = header
        .blob_offset()
        .ok_or_else(|| FormatError::data_corrupt("put message missing blob record"))?;
    let mut s = record_stream(&message, blob_offset, "blob record")?;
    let blob = deserialize_blob(&mut s)?;

    Ok(PutMessage {
        header,
        properties,
        encryption_key,
        user_metadata,
        blob,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::{BlobVersion, DeleteVersion, PropertiesVersion};

    fn sample_properties() -> BlobProperties {
        BlobProperties::new(64, "media-service", 3, 14).with_content_type("application/json")
    }

    #[test]
    fn roundtrip_with_encryption_key() {
        let props = sample_properties();
        let encoded = serialize_put_message(
            WriteConfig::latest(),
            &props,
            Some(&[0xEE; 32]),
            b"user-meta",
            &[0x11; 64],
            BlobType::Data,
        )
        .unwrap();

        let message = deserialize_put_message(&Bytes::from(encoded)).unwrap();
        assert_eq!(message.properties(), &props);
        assert_eq!(&message.encryption_key().unwrap()[..], &[0xEE; 32]);
        assert_eq!(&message.user_metadata()[..], b"user-meta");
        assert_eq!(message.blob().blob_type(), BlobType::Data);
        assert_eq!(&message.blob().content()[..], &[0x11; 64]);
    }

    #[test]
    fn roundtrip_without_encryption_key() {
        let props = sample_properties();
        let encoded = serialize_put_message(
            WriteConfig::latest(),
            &props,
            None,
            b"",
            b"payload",
            BlobType::Data,
        )
        .unwrap();
        let message = deserialize_put_message(&Bytes::from(encoded)).unwrap();
        assert!(message.encryption_key().is_none());
        assert!(message.user_metadata().is_empty());
    }

    #[test]
    fn legacy_config_roundtrip() {
        let legacy = WriteConfig {
            properties: PropertiesVersion::V1,
            header: HeaderVersion::V1,
            blob: BlobVersion::V1,
            delete: DeleteVersion::V1,
        };
        let props = sample_properties();
        let encoded =
            serialize_put_message(legacy, &props, None, b"meta", b"blob bytes", BlobType::Data)
                .unwrap();
        let message = deserialize_put_message(&Bytes::from(encoded)).unwrap();
        assert_eq!(message.header().version(), HeaderVersion::V1);
        // V1 properties drop tenancy on the floor.
        assert_eq!(message.properties().account_id(), -1);
        assert_eq!(message.properties().service_id(), "media-service");
    }

    #[test]
    fn v1_header_rejects_encryption_key() {
        let config = WriteConfig {
            header: HeaderVersion::V1,
            ..WriteConfig::latest()
        };
        let result = serialize_put_message(
            config,
            &sample_properties(),
            Some(&[1, 2, 3]),
            b"",
            b"x",
            BlobType::Data,
        );
        assert!(matches!(result, Err(FormatError::InvalidArgument { .. })));
    }

    #[test]
    fn truncated_message_is_corruption() {
        let encoded = serialize_put_message(
            WriteConfig::latest(),
            &sample_properties(),
            None,
            b"m",
            b"blob",
            BlobType::Data,
        )
        .unwrap();
        let short = Bytes::from(encoded).slice(..40);
        let result = deserialize_put_message(&short);
        assert!(matches!(result, Err(FormatError::DataCorrupt { .. })));
    }
}
