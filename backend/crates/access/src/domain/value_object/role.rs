use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Which half of the product a session belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Portal {
    #[display("admin")]
    Admin,
    #[display("provider")]
    Provider,
}

impl Portal {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Portal::Admin => "admin",
            Portal::Provider => "provider",
        }
    }
}

/// Session role. A role belongs to exactly one portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[display("admin")]
    Admin,
    #[display("super_admin")]
    SuperAdmin,
    #[display("provider")]
    Provider,
}

impl Role {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
            Role::Provider => "provider",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "admin" => Some(Role::Admin),
            "super_admin" => Some(Role::SuperAdmin),
            "provider" => Some(Role::Provider),
            _ => None,
        }
    }

    #[inline]
    pub const fn portal(&self) -> Portal {
        match self {
            Role::Admin | Role::SuperAdmin => Portal::Admin,
            Role::Provider => Portal::Provider,
        }
    }

    #[inline]
    pub fn belongs_to(&self, portal: Portal) -> bool {
        self.portal() == portal
    }

    #[inline]
    pub const fn is_super_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }
}
