//! Revocation registry for tokens rejected before their natural expiry

mod registry;


pub use registry::RevocationRegistry;
