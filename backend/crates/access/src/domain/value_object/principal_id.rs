use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque user id issued by the managed identity service (a Firebase UID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(String);

impl PrincipalId {
    /// Firebase UIDs are at most 128 characters.
    pub const MAX_LEN: usize = 128;

    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        (!trimmed.is_empty() && trimmed.len() <= Self::MAX_LEN).then(|| Self(trimmed.to_string()))
    }

    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        assert_eq!(PrincipalId::new(" uid-1 ").unwrap().as_str(), "uid-1");
        assert!(PrincipalId::new("").is_none());
        assert!(PrincipalId::new("x".repeat(129)).is_none());
    }
}
