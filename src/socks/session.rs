//! Per-connection session
//!
//! Everything scoped to one accepted connection: its identifier, its log
//! span and, once negotiated, its authentication context. The session is
//! passed down explicitly to every stage of the handshake.

use super::auth::AuthContext;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::Span;
use uuid::Uuid;

/// State of a single client connection
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    peer: Option<SocketAddr>,
    span: Span,
    auth: Option<Arc<AuthContext>>,
}

impl Session {
    /// Create a session for a freshly accepted connection
    pub fn new(peer: Option<SocketAddr>) -> Self {
        let id = Uuid::new_v4();
        let span = match peer {
            Some(peer) => tracing::info_span!("conn", %id, %peer),
            None => tracing::info_span!("conn", %id),
        };
        Session {
            id,
            peer,
            span,
            auth: None,
        }
    }

    /// Connection identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Address of the client, when known
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Span every event of this connection is logged under
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Authentication context, set once negotiation succeeded
    pub fn auth(&self) -> Option<&AuthContext> {
        self.auth.as_deref()
    }

    /// Attach the negotiated authentication context.
    ///
    /// Consumes the session so the context cannot change afterwards.
    pub fn authenticated(self, ctx: AuthContext) -> Self {
        Session {
            auth: Some(Arc::new(ctx)),
            ..self
        }
    }
}
