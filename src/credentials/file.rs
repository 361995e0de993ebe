//! File-backed credential store
//!
//! The file holds one `username:password` pair per line. Lines that do not
//! split into exactly two fields are skipped.

use super::{CredentialStore, MemoryStore};
use crate::error::{ProxyError, Socks5Error};
use std::path::{Path, PathBuf};

/// Credential store loaded from a `username:password` file at construction
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    /// Load credentials from `path`.
    ///
    /// Fails if the file cannot be read or contains no valid entry.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ProxyError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProxyError::Credentials(format!("failed to read {}: {}", path.display(), e))
        })?;

        let inner = parse_entries(&content);
        if inner.is_empty() {
            return Err(ProxyError::Credentials(format!(
                "no credentials found or credential has invalid format \
                 (valid format 'username:password') in {}",
                path.display()
            )));
        }

        tracing::debug!("Loaded {} credentials from {}", inner.len(), path.display());

        Ok(FileStore {
            path: path.to_path_buf(),
            inner,
        })
    }

    /// Path the credentials were loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of loaded users
    pub fn user_count(&self) -> usize {
        self.inner.len()
    }
}

fn parse_entries(content: &str) -> MemoryStore {
    content
        .lines()
        .filter_map(|line| {
            let mut parts = line.split(':');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(user), Some(pass), None) => Some((user, pass)),
                _ => None,
            }
        })
        .collect()
}

impl CredentialStore for FileStore {
    fn validate(&self, username: &str, password: &str) -> Result<(), Socks5Error> {
        self.inner.validate(username, password)
    }
}
