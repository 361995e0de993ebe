//! Server configuration types
//!
//! Defines the main configuration structures for the socks5d server.

use super::TcpConfig;
use crate::error::ProxyError;
use crate::socks::AuthMethod;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default listen address
fn default_listen_addr() -> String {
    "127.0.0.1:1080".to_string()
}

/// Default enabled authentication methods, in priority order
fn default_auth_methods() -> Vec<AuthMethod> {
    vec![AuthMethod::NoAuthRequired, AuthMethod::UserPass]
}

/// Root configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// SOCKS5 server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address the listener binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Enabled authentication methods; the first one the client also offers wins
    #[serde(default = "default_auth_methods")]
    pub auth_methods: Vec<AuthMethod>,

    /// Inline username → password map for USERNAME/PASSWORD auth
    #[serde(default)]
    pub users: HashMap<String, String>,

    /// File of `username:password` lines; takes precedence over `users`
    #[serde(default)]
    pub users_file: Option<PathBuf>,

    /// Outbound TCP settings
    #[serde(default)]
    pub tcp: TcpConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: default_listen_addr(),
            auth_methods: default_auth_methods(),
            users: HashMap::new(),
            users_file: None,
            tcp: TcpConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Check if a credential source is configured
    pub fn has_credentials(&self) -> bool {
        self.users_file.is_some() || !self.users.is_empty()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ProxyError> {
        self.listen_addr.parse::<SocketAddr>().map_err(|e| {
            ProxyError::Config(format!("invalid listen address {:?}: {}", self.listen_addr, e))
        })?;

        if self.auth_methods.is_empty() {
            return Err(ProxyError::Config(
                "at least one authentication method must be enabled".to_string(),
            ));
        }

        for method in &self.auth_methods {
            match method {
                AuthMethod::NoAcceptable => {
                    return Err(ProxyError::Config(format!(
                        "{} cannot be enabled",
                        method
                    )))
                }
                AuthMethod::Gssapi => {
                    return Err(ProxyError::Config(format!("{} is not implemented", method)))
                }
                AuthMethod::NoAuthRequired | AuthMethod::UserPass => {}
            }
        }

        let only_user_pass = self
            .auth_methods
            .iter()
            .all(|m| *m == AuthMethod::UserPass);
        if only_user_pass && !self.has_credentials() {
            return Err(ProxyError::Config(
                "USERNAME/PASSWORD is the only method but no credentials are configured"
                    .to_string(),
            ));
        }

        Ok(())
    }
}
