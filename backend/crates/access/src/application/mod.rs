//! Application Layer
//!
//! Use cases and application services.

pub mod admin_login;
pub mod config;
pub mod context;
pub mod gate;
pub mod ledger;
pub mod moderation;
pub mod otp_login;
pub mod provider_account;
pub mod provider_login;
pub mod resolver;
pub mod session;
pub mod system_locks;

// Re-exports
pub use admin_login::{AdminLoginInput, AdminLoginOutput, AdminLoginUseCase};
pub use config::AccessConfig;
pub use context::AccessContext;
pub use gate::{AccessGate, AuthorizedPrincipal, Denial, GateDecision};
pub use ledger::AttemptLedger;
pub use moderation::{ModerationOutput, ModerationUseCase};
pub use otp_login::OtpLoginUseCase;
pub use provider_account::{ChangePinInput, ProviderAccountUseCase, SubmitProviderInput};
pub use provider_login::{ProviderLoginInput, ProviderLoginOutput, ProviderLoginUseCase};
pub use resolver::{IdentityResolver, ResolveStrategy};
pub use session::{IssuedSession, SessionClaims, SessionIssuer};
pub use system_locks::SystemLocksUseCase;
