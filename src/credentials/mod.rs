//! Credential stores for username/password authentication
//!
//! A [`CredentialStore`] is built once at startup and shared read-only by
//! every connection task, so implementations must never mutate after
//! construction.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::Socks5Error;
use std::fmt::Debug;

/// Validates a username/password pair against a backing store.
pub trait CredentialStore: Send + Sync + Debug {
    /// Returns `Ok(())` for a known user with a matching password.
    ///
    /// A mismatch or unknown user must yield
    /// [`Socks5Error::InvalidCredentials`]; any other error means the store
    /// itself failed.
    fn validate(&self, username: &str, password: &str) -> Result<(), Socks5Error>;
}
