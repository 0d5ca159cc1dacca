mod r#trait;

pub use r#trait::PasswordResetLedger;

#[cfg(test)]
pub mod mock;
#[cfg(test)]
pub use mock::MockPasswordResetLedger;
