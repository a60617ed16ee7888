//! Phone Number Value Object
//!
//! Canonical E.164 phone numbers. Ghanaian numbers in any of the common
//! written forms collapse to `+233XXXXXXXXX`, so two spellings of the same
//! number always compare equal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ghana country calling code
const GHANA_CODE: &str = "233";

/// Digits in a Ghanaian national significant number (after the trunk `0`)
const GHANA_NSN_LEN: usize = 9;

/// E.164 bounds for other countries (digits after `+`)
const E164_MIN_DIGITS: usize = 8;
const E164_MAX_DIGITS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhoneError {
    #[error("Phone number is empty")]
    Empty,

    #[error("Phone number contains invalid characters")]
    InvalidCharacter,

    #[error("Phone number is not a recognised Ghanaian or international number")]
    UnrecognisedFormat,
}

/// Canonical phone number (`+` followed by digits)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalize any accepted spelling to canonical form.
    ///
    /// ```rust
    /// use access::domain::value_object::phone::PhoneNumber;
    ///
    /// let a = PhoneNumber::parse("024 123 4567").unwrap();
    /// let b = PhoneNumber::parse("+233241234567").unwrap();
    /// assert_eq!(a, b);
    /// ```
    pub fn parse(raw: &str) -> Result<Self, PhoneError> {
        let mut compact = String::with_capacity(raw.len());
        for c in raw.trim().chars() {
            match c {
                ' ' | '-' | '.' | '(' | ')' => continue,
                '+' if compact.is_empty() => compact.push(c),
                c if c.is_ascii_digit() => compact.push(c),
                _ => return Err(PhoneError::InvalidCharacter),
            }
        }

        if compact.is_empty() {
            return Err(PhoneError::Empty);
        }

        if let Some(nsn) = Self::ghana_nsn(&compact) {
            return Ok(Self(format!("+{GHANA_CODE}{nsn}")));
        }

        if let Some(digits) = compact.strip_prefix('+') {
            if digits.starts_with(GHANA_CODE) {
                // +233 with the wrong number of digits
                return Err(PhoneError::UnrecognisedFormat);
            }
            if (E164_MIN_DIGITS..=E164_MAX_DIGITS).contains(&digits.len())
                && !digits.starts_with('0')
            {
                return Ok(Self(compact));
            }
        }

        Err(PhoneError::UnrecognisedFormat)
    }

    /// The 9-digit national number if `compact` is a Ghanaian spelling.
    fn ghana_nsn(compact: &str) -> Option<&str> {
        let nsn = if let Some(rest) = compact.strip_prefix("+233") {
            rest
        } else if let Some(rest) = compact.strip_prefix("00233") {
            rest
        } else if compact.len() == GHANA_CODE.len() + GHANA_NSN_LEN {
            compact.strip_prefix(GHANA_CODE)?
        } else if compact.len() == 1 + GHANA_NSN_LEN {
            compact.strip_prefix('0')?
        } else {
            return None;
        };

        (nsn.len() == GHANA_NSN_LEN && !nsn.starts_with('0')).then_some(nsn)
    }

    /// Restore from database (already canonical)
    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_ghanaian(&self) -> bool {
        self.0.starts_with("+233")
    }

    /// Log-safe form: country prefix and last three digits only.
    pub fn masked(&self) -> String {
        let keep_head = if self.is_ghanaian() { 4 } else { 2 };
        let len = self.0.len();
        if len <= keep_head + 3 {
            return "*".repeat(len);
        }
        format!(
            "{}{}{}",
            &self.0[..keep_head],
            "*".repeat(len - keep_head - 3),
            &self.0[len - 3..]
        )
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}
