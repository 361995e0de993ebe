//! In-memory credential store

use super::CredentialStore;
use crate::error::Socks5Error;
use std::collections::HashMap;

/// Credential store backed by a username → password map
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    users: HashMap<String, String>,
}

impl MemoryStore {
    /// Number of known users
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the store holds no users
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        MemoryStore {
            users: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn validate(&self, username: &str, password: &str) -> Result<(), Socks5Error> {
        match self.users.get(username) {
            Some(expected) if expected == password => Ok(()),
            _ => Err(Socks5Error::InvalidCredentials),
        }
    }
}
