//! SOCKS5 authentication module
//!
//! Handles method negotiation and the method-specific sub-negotiation.
//! The outcome is an [`AuthContext`] that is attached to the connection's
//! [`Session`].

mod none;
mod password;

pub use none::NoAuth;
pub use password::PasswordAuth;

use super::consts::*;
use super::session::Session;
use super::settings::Socks5Settings;
use super::types::AuthMethod;
use crate::credentials::CredentialStore;
use crate::error::Socks5Error;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Payload key holding the authenticated username
pub const USERNAME_KEY: &str = "username";

/// Result of a successful authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    method: AuthMethod,
    payload: HashMap<String, String>,
}

impl AuthContext {
    /// Create a context for the given method and claims
    pub fn new(method: AuthMethod, payload: HashMap<String, String>) -> Self {
        AuthContext { method, payload }
    }

    /// Method the client authenticated with
    pub fn method(&self) -> AuthMethod {
        self.method
    }

    /// Claims produced by the method
    pub fn payload(&self) -> &HashMap<String, String> {
        &self.payload
    }

    /// Authenticated username, for USERNAME/PASSWORD
    pub fn username(&self) -> Option<&str> {
        self.payload.get(USERNAME_KEY).map(String::as_str)
    }
}

/// The authenticator chosen for one connection
#[derive(Debug, Clone)]
pub enum Authenticator {
    /// NO AUTHENTICATION REQUIRED
    NoAuth(NoAuth),
    /// RFC 1929 username/password against a credential store
    Password(PasswordAuth),
    /// Nothing the client offered is enabled here
    NotAcceptable {
        /// Raw method bytes the client offered
        offered: Vec<u8>,
    },
}

impl Authenticator {
    /// Method byte announced in the selection reply
    pub fn method(&self) -> AuthMethod {
        match self {
            Authenticator::NoAuth(_) => AuthMethod::NoAuthRequired,
            Authenticator::Password(_) => AuthMethod::UserPass,
            Authenticator::NotAcceptable { .. } => AuthMethod::NoAcceptable,
        }
    }

    /// Run the method-specific exchange
    pub async fn authenticate<S>(
        &self,
        stream: &mut S,
        session: &Session,
    ) -> Result<AuthContext, Socks5Error>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        match self {
            Authenticator::NoAuth(auth) => auth.authenticate(stream, session).await,
            Authenticator::Password(auth) => auth.authenticate(stream, session).await,
            Authenticator::NotAcceptable { offered } => {
                let names: Vec<String> = offered.iter().map(|m| AuthMethod::describe(*m)).collect();
                Err(Socks5Error::AuthNotSupported(names.join(", ")))
            }
        }
    }
}

/// Pick the authenticator for a connection.
///
/// Walks the enabled methods in server priority order and returns the first
/// one the client offered and this server can serve. Methods without an
/// implementation (GSSAPI) and USERNAME/PASSWORD without a store are skipped.
pub fn select_authenticator(
    enabled: &[AuthMethod],
    offered: &[u8],
    credentials: Option<&Arc<dyn CredentialStore>>,
) -> Authenticator {
    for method in enabled {
        if !offered.contains(&method.to_byte()) {
            continue;
        }
        match (method, credentials) {
            (AuthMethod::NoAuthRequired, _) => return Authenticator::NoAuth(NoAuth),
            (AuthMethod::UserPass, Some(store)) => {
                return Authenticator::Password(PasswordAuth::new(store.clone()))
            }
            _ => {}
        }
    }

    Authenticator::NotAcceptable {
        offered: offered.to_vec(),
    }
}

/// Read the client's method offer and answer it
///
/// The version byte of the greeting has already been consumed. This reads
/// NMETHODS and the offered methods, then writes `[5, METHOD]`, even when
/// no method is acceptable.
pub async fn select_method<S>(
    stream: &mut S,
    settings: &Socks5Settings,
    session: &Session,
) -> Result<Authenticator, Socks5Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let num_methods = stream.read_u8().await?;
    let mut offered = vec![0u8; num_methods as usize];
    stream.read_exact(&mut offered).await?;

    let authenticator =
        select_authenticator(settings.auth_methods(), &offered, settings.credentials());
    debug!(parent: session.span(), "Selected authentication method: {}", authenticator.method());

    stream
        .write_all(&[SOCKS5_VERSION, authenticator.method().to_byte()])
        .await?;
    stream.flush().await?;

    Ok(authenticator)
}

/// Negotiate and perform authentication
///
/// [`select_method`] followed by the selected authenticator's exchange.
pub async fn negotiate<S>(
    stream: &mut S,
    settings: &Socks5Settings,
    session: &Session,
) -> Result<AuthContext, Socks5Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let authenticator = select_method(stream, settings, session).await?;
    authenticator.authenticate(stream, session).await
}
