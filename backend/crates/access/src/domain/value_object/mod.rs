//! Value Object Module

pub mod email;
pub mod phone;
pub mod pin;
pub mod principal_id;
pub mod provider_status;
pub mod role;

pub use email::Email;
pub use phone::PhoneNumber;
pub use pin::{LegacyPin, Pin, PinPolicy};
pub use principal_id::PrincipalId;
pub use provider_status::ProviderStatus;
pub use role::{Portal, Role};
