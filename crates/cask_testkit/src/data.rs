//! Random payloads and byte-corruption helpers.

use rand::RngCore;

/// Returns `len` random bytes.
#[must_use]
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

/// Corrupts a single byte in place, guaranteeing it changes value.
///
/// Simulates bit rot between encode and decode in corruption tests.
pub fn corrupt_byte(buf: &mut [u8], index: usize) {
    buf[index] = buf[index].wrapping_add(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_byte_always_changes() {
        for original in [0x00u8, 0x7F, 0xFF] {
            let mut buf = [original];
            corrupt_byte(&mut buf, 0);
            assert_ne!(buf[0], original);
        }
    }
}
