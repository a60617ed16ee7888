//! Administrator Account Entity
//!
//! Administrators sign in through the managed identity service; this record
//! only grants portal access and a role.

use crate::domain::value_object::{Email, PrincipalId, Role};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminAccount {
    /// Managed-identity principal id (primary key)
    pub uid: PrincipalId,
    pub email: Email,
    /// `Admin` or `SuperAdmin`
    pub role: Role,
    pub active: bool,
}

impl AdminAccount {
    pub fn is_super_admin(&self) -> bool {
        self.role.is_super_admin()
    }
}
