//! Immutable runtime settings for the SOCKS5 engine
//!
//! Built once from a validated [`ServerConfig`] and shared by every
//! connection task behind an `Arc`.

use crate::config::ServerConfig;
use crate::credentials::{CredentialStore, FileStore, MemoryStore};
use crate::error::ProxyError;
use crate::socks::AuthMethod;
use crate::transport::{Dialer, DomainResolver, SystemResolver, TcpDialer};
use std::sync::Arc;
use tracing::info;

/// Everything a connection needs besides its stream
#[derive(Debug, Clone)]
pub struct Socks5Settings {
    auth_methods: Vec<AuthMethod>,
    credentials: Option<Arc<dyn CredentialStore>>,
    resolver: Arc<dyn DomainResolver>,
    dialer: Arc<dyn Dialer>,
}

impl Socks5Settings {
    /// Settings with the given enabled methods, the system resolver and a
    /// default TCP dialer
    pub fn new(auth_methods: Vec<AuthMethod>) -> Self {
        Socks5Settings {
            auth_methods,
            credentials: None,
            resolver: Arc::new(SystemResolver),
            dialer: Arc::new(TcpDialer::default()),
        }
    }

    /// Build settings from a server configuration.
    ///
    /// The configuration is validated first. A users file takes precedence
    /// over the inline user map; an empty map means no store.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ProxyError> {
        config.validate()?;

        let credentials: Option<Arc<dyn CredentialStore>> = match &config.users_file {
            Some(path) => {
                let store = FileStore::load(path)?;
                info!("Loaded {} users from {}", store.user_count(), store.path().display());
                Some(Arc::new(store))
            }
            None if !config.users.is_empty() => Some(Arc::new(
                config.users.iter().collect::<MemoryStore>(),
            )),
            None => None,
        };

        Ok(Socks5Settings {
            auth_methods: config.auth_methods.clone(),
            credentials,
            resolver: Arc::new(SystemResolver),
            dialer: Arc::new(TcpDialer::from_config(&config.tcp)),
        })
    }

    /// Replace the domain resolver
    pub fn with_resolver(mut self, resolver: Arc<dyn DomainResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replace the dialer
    pub fn with_dialer(mut self, dialer: Arc<dyn Dialer>) -> Self {
        self.dialer = dialer;
        self
    }

    /// Replace the credential store
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Enabled methods in priority order
    pub fn auth_methods(&self) -> &[AuthMethod] {
        &self.auth_methods
    }

    /// Credential store, if any
    pub fn credentials(&self) -> Option<&Arc<dyn CredentialStore>> {
        self.credentials.as_ref()
    }

    /// Domain resolver
    pub fn resolver(&self) -> &dyn DomainResolver {
        self.resolver.as_ref()
    }

    /// Outbound dialer
    pub fn dialer(&self) -> &dyn Dialer {
        self.dialer.as_ref()
    }
}
