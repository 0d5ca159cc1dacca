//! Domain entities representing core authentication objects.

pub mod credential;
pub mod password_reset;
pub mod revocation;
pub mod session;
pub mod token;

// Re-export commonly used types
pub use credential::{CredentialRecord, NewCredential, Role};
pub use password_reset::PasswordResetToken;
pub use revocation::RevocationEntry;
pub use session::{SessionInfo, SessionRecord, SessionStats};
pub use token::{
    Claims, RefreshTokenRecord, RevocationReason, TokenKind, TokenPair, TokenStatistics,
    ACCESS_TOKEN_EXPIRY_MINUTES, PASSWORD_RESET_PURPOSE, REFRESH_TOKEN_EXPIRY_DAYS,
    RESET_TOKEN_EXPIRY_MINUTES,
};
