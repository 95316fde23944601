//! Property-based round-trip tests using proptest.

use bytes::Bytes;
use cask_format::{
    deserialize_metadata_content, deserialize_put_message, encode_metadata_content,
    serialize_put_message, BlobProperties, BlobType, PropertiesVersion, WriteConfig,
};
use cask_testkit::{MockKey, MockKeyFactory};
use proptest::prelude::*;

const KEY_SIZE: usize = 32;

fn properties_version_strategy() -> impl Strategy<Value = PropertiesVersion> {
    prop_oneof![
        Just(PropertiesVersion::V1),
        Just(PropertiesVersion::V2),
        Just(PropertiesVersion::V3),
    ]
}

fn id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9_./-]{0,32}").expect("Invalid regex")
}

/// A chunked blob description satisfying the chunk list invariant: a
/// positive chunk size, a key per chunk, and a final chunk that is
/// non-empty but no larger than the rest.
fn chunk_layout_strategy() -> impl Strategy<Value = (i32, i64, Vec<MockKey>)> {
    (1i32..=1 << 22, 1usize..=32).prop_flat_map(|(chunk_size, count)| {
        (1i64..=i64::from(chunk_size)).prop_map(move |last| {
            let total = (count as i64 - 1) * i64::from(chunk_size) + last;
            let keys = (0..count).map(|_| MockKey::random(KEY_SIZE)).collect();
            (chunk_size, total, keys)
        })
    })
}

proptest! {
    #[test]
    fn blob_properties_roundtrip(
        blob_size in any::<u64>(),
        service_id in id_strategy(),
        owner_id in id_strategy(),
        content_type in id_strategy(),
        is_private in any::<bool>(),
        ttl_secs in any::<i64>(),
        creation_time_ms in 0i64..=4_102_444_800_000,
        account_id in any::<i16>(),
        container_id in any::<i16>(),
        is_encrypted in any::<bool>(),
        version in properties_version_strategy(),
    ) {
        let props = BlobProperties::new(blob_size, service_id.clone(), account_id, container_id)
            .with_owner_id(owner_id.clone())
            .with_content_type(content_type.clone())
            .with_private(is_private)
            .with_ttl_secs(ttl_secs)
            .with_creation_time_ms(creation_time_ms)
            .with_encrypted(is_encrypted);

        let encoded = props.encode(version).unwrap();
        prop_assert_eq!(encoded.len(), props.serialized_size(version));

        let decoded = BlobProperties::deserialize(&mut Bytes::from(encoded)).unwrap();
        prop_assert_eq!(decoded.blob_size(), blob_size);
        prop_assert_eq!(decoded.service_id(), service_id.as_str());
        prop_assert_eq!(decoded.owner_id(), owner_id.as_str());
        prop_assert_eq!(decoded.content_type(), content_type.as_str());
        prop_assert_eq!(decoded.is_private(), is_private);
        prop_assert_eq!(decoded.time_to_live_secs(), ttl_secs);
        prop_assert_eq!(decoded.creation_time_ms(), creation_time_ms);
        match version {
            PropertiesVersion::V1 => {
                prop_assert_eq!(decoded.account_id(), -1);
                prop_assert_eq!(decoded.container_id(), -1);
                prop_assert!(!decoded.is_encrypted());
            }
            PropertiesVersion::V2 => {
                prop_assert_eq!(decoded.account_id(), account_id);
                prop_assert_eq!(decoded.container_id(), container_id);
                prop_assert!(!decoded.is_encrypted());
            }
            PropertiesVersion::V3 => {
                prop_assert_eq!(decoded.account_id(), account_id);
                prop_assert_eq!(decoded.container_id(), container_id);
                prop_assert_eq!(decoded.is_encrypted(), is_encrypted);
            }
        }
    }

    #[test]
    fn chunk_list_roundtrip((chunk_size, total_size, keys) in chunk_layout_strategy()) {
        let encoded = encode_metadata_content(chunk_size, total_size, &keys).unwrap();
        let factory = MockKeyFactory::new(KEY_SIZE);
        let info = deserialize_metadata_content(&mut Bytes::from(encoded), &factory).unwrap();
        prop_assert_eq!(info.chunk_size(), chunk_size);
        prop_assert_eq!(info.total_size(), total_size);
        prop_assert_eq!(info.keys(), &keys[..]);
    }

    #[test]
    fn chunk_invariant_rejects_out_of_range_totals(
        chunk_size in 1i32..=1 << 22,
        count in 2usize..=32,
        slack in 1i64..=1 << 22,
    ) {
        let keys: Vec<MockKey> = (0..count).map(|_| MockKey::random(KEY_SIZE)).collect();
        let floor = (count as i64 - 1) * i64::from(chunk_size);
        let ceil = count as i64 * i64::from(chunk_size);
        prop_assert!(encode_metadata_content(chunk_size, floor, &keys).is_err());
        prop_assert!(encode_metadata_content(chunk_size, ceil + slack, &keys).is_err());
    }

    #[test]
    fn put_message_roundtrip(
        blob in prop::collection::vec(any::<u8>(), 1..2048),
        user_metadata in prop::collection::vec(any::<u8>(), 0..256),
        key in prop::option::of(prop::collection::vec(any::<u8>(), 16..64)),
        service_id in id_strategy(),
    ) {
        let props = BlobProperties::new(blob.len() as u64, service_id, 1, 1);
        let encoded = serialize_put_message(
            WriteConfig::latest(),
            &props,
            key.as_deref(),
            &user_metadata,
            &blob,
            BlobType::Data,
        )
        .unwrap();
        let total_len = encoded.len();

        let message = deserialize_put_message(&Bytes::from(encoded)).unwrap();
        prop_assert_eq!(message.header().message_size() as usize, total_len);
        prop_assert_eq!(&message.blob().content()[..], &blob[..]);
        prop_assert_eq!(&message.user_metadata()[..], &user_metadata[..]);
        prop_assert_eq!(message.encryption_key().map(|k| k.to_vec()), key);
    }
}
