//! Random hex secret generation.

use pressdock_types::{PressdockError, Result};
use rand::{thread_rng, RngCore};

/// Generate `length` random bytes rendered as lowercase hex.
///
/// The bytes come from `rand`'s thread-local generator, which is a CSPRNG
/// seeded from the operating system.
pub fn random_hex(length: usize) -> Result<String> {
    if length == 0 {
        return Err(PressdockError::Secret("Length must be greater than 0".to_string()));
    }

    let mut bytes = vec![0u8; length];
    thread_rng().fill_bytes(&mut bytes);
    Ok(hex::encode(bytes))
}

/// Check that `value` looks like the output of [`random_hex`] for `length`.
pub fn is_hex_secret(value: &str, length: usize) -> bool {
    value.len() == length * 2
        && value.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
