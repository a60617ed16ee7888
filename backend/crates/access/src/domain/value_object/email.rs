//! Email Value Object
//!
//! Administrator sign-in identifier. Syntax check only; ownership is proven
//! by the managed identity service.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Maximum email length (per RFC 5321)
const EMAIL_MAX_LENGTH: usize = 254;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailError {
    #[error("Email cannot be empty")]
    Empty,

    #[error("Email must be at most 254 characters")]
    TooLong,

    #[error("Invalid email format")]
    InvalidFormat,
}

/// Lower-cased email address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    pub fn new(email: impl Into<String>) -> Result<Self, EmailError> {
        let email = email.into().trim().to_lowercase();

        if email.is_empty() {
            return Err(EmailError::Empty);
        }
        if email.len() > EMAIL_MAX_LENGTH {
            return Err(EmailError::TooLong);
        }
        if !Self::is_valid_format(&email) {
            return Err(EmailError::InvalidFormat);
        }

        Ok(Self(email))
    }

    fn is_valid_format(email: &str) -> bool {
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };

        if local.is_empty() || local.len() > 64 || domain.contains('@') {
            return false;
        }

        if domain.is_empty() || !domain.contains('.') {
            return false;
        }

        if !domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return false;
        }

        !(domain.starts_with(['.', '-']) || domain.ends_with(['.', '-']))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Log-safe form: first character of the local part and the domain.
    pub fn masked(&self) -> String {
        match self.0.split_once('@') {
            Some((local, domain)) => {
                let head: String = local.chars().take(1).collect();
                format!("{head}***@{domain}")
            }
            None => "***".to_string(),
        }
    }
}

impl FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Email::new(s)
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_valid() {
        assert!(Email::new("ops@fixam.gh").is_ok());
        assert!(Email::new("Ops@FixAm.GH").is_ok());
        assert!(Email::new("first.last@mail.fixam.com.gh").is_ok());
        assert!(Email::new("ops+alerts@fixam.gh").is_ok());
    }

    #[test]
    fn test_email_invalid() {
        assert_eq!(Email::new(""), Err(EmailError::Empty));
        assert_eq!(Email::new("opsfixam.gh"), Err(EmailError::InvalidFormat));
        assert_eq!(Email::new("ops@"), Err(EmailError::InvalidFormat));
        assert_eq!(Email::new("@fixam.gh"), Err(EmailError::InvalidFormat));
        assert_eq!(Email::new("ops@@fixam.gh"), Err(EmailError::InvalidFormat));
        assert_eq!(Email::new("ops@fixam"), Err(EmailError::InvalidFormat));
        assert_eq!(Email::new("ops@-fixam.gh"), Err(EmailError::InvalidFormat));
    }

    #[test]
    fn test_email_case_normalization() {
        let email = Email::new("  Ops@FixAm.GH ").unwrap();
        assert_eq!(email.as_str(), "ops@fixam.gh");
    }

    #[test]
    fn test_masked() {
        let email = Email::new("ops@fixam.gh").unwrap();
        assert_eq!(email.masked(), "o***@fixam.gh");
    }
}
