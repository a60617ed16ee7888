//! PIN Value Objects
//!
//! Providers authenticate with a short numeric PIN minted by an
//! administrator on approval. Rows created before hashing existed may still
//! carry the PIN in plain text ([`LegacyPin`]); those migrate on first
//! successful login.

use std::fmt;

use platform::secret::ClearTextSecret;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const MIN_PIN_LENGTH: usize = 4;
pub const MAX_PIN_LENGTH: usize = 8;

/// Whether a PIN survives a successful login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinPolicy {
    /// PIN stays valid until rotated
    #[default]
    Reusable,
    /// PIN is cleared after the first successful login
    OneTime,
}

impl PinPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reusable" => Some(PinPolicy::Reusable),
            "one_time" | "one-time" | "onetime" => Some(PinPolicy::OneTime),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PinError {
    #[error("PIN must contain digits only")]
    NotDigits,

    #[error("PIN must be {min} to {max} digits (got {actual})")]
    Length {
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("PIN is too easy to guess")]
    TooWeak,
}

/// A well-formed PIN chosen by a provider or minted by the system
pub struct Pin(ClearTextSecret);

impl Pin {
    /// Validate a PIN the provider wants to set.
    pub fn new(raw: String) -> Result<Self, PinError> {
        let secret = ClearTextSecret::new(raw).map_err(|_| PinError::NotDigits)?;
        let digits = secret.as_str();

        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PinError::NotDigits);
        }

        let actual = digits.len();
        if !(MIN_PIN_LENGTH..=MAX_PIN_LENGTH).contains(&actual) {
            return Err(PinError::Length {
                min: MIN_PIN_LENGTH,
                max: MAX_PIN_LENGTH,
                actual,
            });
        }

        if is_weak(digits) {
            return Err(PinError::TooWeak);
        }

        Ok(Self(secret))
    }

    /// Random PIN of `len` digits (clamped to the allowed range).
    pub fn mint(len: usize) -> Self {
        let len = len.clamp(MIN_PIN_LENGTH, MAX_PIN_LENGTH);
        loop {
            let candidate = platform::crypto::random_digits(len);
            if is_weak(&candidate) {
                continue;
            }
            if let Ok(secret) = ClearTextSecret::new(candidate) {
                return Self(secret);
            }
        }
    }

    pub fn secret(&self) -> &ClearTextSecret {
        &self.0
    }

    /// Clear text, for the single response that hands a minted PIN over.
    pub fn reveal(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin([REDACTED])")
    }
}

/// Plain-text PIN carried by rows that predate hashing
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct LegacyPin(String);

impl LegacyPin {
    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for LegacyPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LegacyPin([REDACTED])")
    }
}

/// All one digit, or a straight ascending/descending run.
fn is_weak(digits: &str) -> bool {
    let d: Vec<u8> = digits.bytes().map(|b| b - b'0').collect();
    if d.len() < 2 {
        return true;
    }

    let all_same = d.iter().all(|&x| x == d[0]);
    let ascending = d.windows(2).all(|w| w[1] == (w[0] + 1) % 10);
    let descending = d.windows(2).all(|w| w[0] == (w[1] + 1) % 10);

    all_same || ascending || descending
}
