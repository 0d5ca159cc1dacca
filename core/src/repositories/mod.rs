//! Repository interfaces for the collaborators the auth core consumes.

pub mod credential;
pub mod password_reset;
pub mod token;

pub use credential::CredentialStore;
pub use password_reset::PasswordResetLedger;
pub use token::TokenLedger;
