//! Business services containing domain logic and use cases.

pub mod auth;
pub mod clock;
pub(crate) mod guard;
pub mod revocation;
pub mod session;
pub mod sweeper;
pub mod token;

// Re-export commonly used types
pub use auth::{AuthService, AuthServiceConfig, NoOpPasswordResetNotifier, PasswordResetNotifier};
pub use clock::{Clock, ManualClock, SystemClock};
pub use revocation::RevocationRegistry;
pub use session::SessionTracker;
pub use sweeper::PeriodicTask;
pub use token::{
    JwtSigner, TokenCleanupConfig, TokenCleanupService, TokenIssuer, TokenRotationService,
    TokenServiceConfig, TokenSigner,
};
