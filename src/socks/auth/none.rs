//! No authentication handler
//!
//! Handles the case when no authentication is required.

use super::AuthContext;
use crate::error::Socks5Error;
use crate::socks::session::Session;
use crate::socks::AuthMethod;
use std::collections::HashMap;
use tokio::io::{AsyncRead, AsyncWrite};

/// No authentication handler
///
/// The method selection reply is the whole exchange, so this only produces
/// an empty context.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl NoAuth {
    /// Perform "authentication" (which does nothing)
    pub async fn authenticate<S>(
        &self,
        _stream: &mut S,
        session: &Session,
    ) -> Result<AuthContext, Socks5Error>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        tracing::trace!(parent: session.span(), "No authentication required");
        Ok(AuthContext::new(AuthMethod::NoAuthRequired, HashMap::new()))
    }
}
