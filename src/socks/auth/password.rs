//! Username/password authentication handler
//!
//! Implements RFC 1929 username/password authentication for SOCKS5.

use super::{AuthContext, USERNAME_KEY};
use crate::credentials::CredentialStore;
use crate::error::Socks5Error;
use crate::socks::consts::{SOCKS5_AUTH_FAILURE, SOCKS5_AUTH_SUCCESS, SOCKS5_AUTH_VERSION};
use crate::socks::session::Session;
use crate::socks::AuthMethod;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Username/password authentication handler
#[derive(Debug, Clone)]
pub struct PasswordAuth {
    store: Arc<dyn CredentialStore>,
}

impl PasswordAuth {
    /// Create a handler validating against `store`
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        PasswordAuth { store }
    }

    /// Perform username/password authentication
    ///
    /// # Protocol
    ///
    /// Client sends:
    /// ```text
    /// +----+------+----------+------+----------+
    /// |VER | ULEN |  UNAME   | PLEN |  PASSWD  |
    /// +----+------+----------+------+----------+
    /// | 1  |  1   | 1 to 255 |  1   | 1 to 255 |
    /// +----+------+----------+------+----------+
    /// ```
    ///
    /// Server responds:
    /// ```text
    /// +----+--------+
    /// |VER | STATUS |
    /// +----+--------+
    /// | 1  |   1    |
    /// +----+--------+
    /// ```
    ///
    /// A wrong sub-negotiation version is answered with nothing. Credentials
    /// are compared byte for byte, so a username or password that is not
    /// valid UTF-8 can never match and is answered with a failure status.
    pub async fn authenticate<S>(
        &self,
        stream: &mut S,
        session: &Session,
    ) -> Result<AuthContext, Socks5Error>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let version = stream.read_u8().await?;
        if version != SOCKS5_AUTH_VERSION {
            return Err(Socks5Error::UnsupportedVersion(version));
        }

        let username = read_field(stream).await?;
        let password = read_field(stream).await?;
        let fields = (String::from_utf8(username), String::from_utf8(password));
        let (username, password) = match fields {
            (Ok(username), Ok(password)) => (username, password),
            (username, _) => {
                send_auth_result(stream, SOCKS5_AUTH_FAILURE).await?;
                let shown = match username {
                    Ok(name) => name,
                    Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
                };
                warn!(
                    parent: session.span(),
                    "Authentication failed for user: {} (not UTF-8)",
                    shown
                );
                return Err(Socks5Error::InvalidCredentials);
            }
        };

        match self.store.validate(&username, &password) {
            Ok(()) => {
                send_auth_result(stream, SOCKS5_AUTH_SUCCESS).await?;
                debug!(parent: session.span(), "Authentication successful for user: {}", username);

                let mut payload = HashMap::new();
                payload.insert(USERNAME_KEY.to_string(), username);
                Ok(AuthContext::new(AuthMethod::UserPass, payload))
            }
            Err(Socks5Error::InvalidCredentials) => {
                send_auth_result(stream, SOCKS5_AUTH_FAILURE).await?;
                warn!(parent: session.span(), "Authentication failed for user: {}", username);
                Err(Socks5Error::InvalidCredentials)
            }
            Err(e) => Err(e),
        }
    }
}

/// Read one length-prefixed field
async fn read_field<S: AsyncRead + Unpin>(stream: &mut S) -> Result<Vec<u8>, Socks5Error> {
    let len = stream.read_u8().await? as usize;
    let mut field = vec![0u8; len];
    stream.read_exact(&mut field).await?;
    Ok(field)
}

/// Send authentication result to client
async fn send_auth_result<S: AsyncWrite + Unpin>(
    stream: &mut S,
    status: u8,
) -> Result<(), Socks5Error> {
    stream.write_all(&[SOCKS5_AUTH_VERSION, status]).await?;
    stream.flush().await?;
    Ok(())
}
