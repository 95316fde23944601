//! CRC framing primitive.
//!
//! Every record except the embedded chunk list ends in an 8-byte trailer
//! holding the CRC of every preceding byte of that record, version tag
//! included. The checksum itself is CRC-32 (IEEE) widened to a u64 so the
//! trailer width matches the wire format's 8-byte field.

/// Size of the CRC trailer in bytes.
pub const CRC_SIZE: usize = 8;

/// Computes the checksum of `buf` as stored in a record trailer.
#[must_use]
pub fn crc(buf: &[u8]) -> u64 {
    u64::from(crc32fast::hash(buf))
}

/// Checks `buf` against an expected trailer value.
#[must_use]
pub fn verify(buf: &[u8], expected: u64) -> bool {
    crc(buf) == expected
}
