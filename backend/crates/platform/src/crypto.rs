//! Cryptographic Utilities

use base64::{Engine, engine::general_purpose};
use rand::{Rng, rngs::OsRng};

/// Error decoding a fixed-size key from configuration
#[derive(Debug, thiserror::Error)]
pub enum KeyDecodeError {
    #[error("key is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("key must be {expected} bytes (got {actual})")]
    Length { expected: usize, actual: usize },
}

/// `len` uniformly random decimal digits from the OS RNG. Leading zeros
/// are kept.
pub fn random_digits(len: usize) -> String {
    (0..len)
        .map(|_| char::from(b'0' + OsRng.gen_range(0..10u8)))
        .collect()
}

/// Decode a standard-base64 signing key that must be exactly 32 bytes.
pub fn decode_key32(s: &str) -> Result<[u8; 32], KeyDecodeError> {
    let bytes = general_purpose::STANDARD.decode(s.trim())?;
    <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| KeyDecodeError::Length {
        expected: 32,
        actual: bytes.len(),
    })
}

/// Equality whose running time depends only on the lengths.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
