mod r#trait;

pub use r#trait::TokenLedger;

#[cfg(test)]
pub mod mock;
#[cfg(test)]
pub use mock::MockTokenLedger;
