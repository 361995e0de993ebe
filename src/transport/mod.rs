//! Outbound transport for socks5d
//!
//! This module provides the capabilities the request processor depends on
//! to reach a target: a [`DomainResolver`] for DOMAINNAME requests and a
//! [`Dialer`] that opens the outbound stream. Both are shared immutably by
//! every connection task.

mod resolver;
mod tcp;

pub use resolver::{DomainResolver, SystemResolver};
pub use tcp::TcpDialer;

use crate::config::TcpConfig;
use async_trait::async_trait;
use std::fmt::Debug;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

/// Socket options for configuring connections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketOpts {
    /// Enable TCP_NODELAY
    pub nodelay: bool,
    /// TCP keepalive timeout
    pub keepalive_secs: Option<u64>,
    /// TCP keepalive interval
    pub keepalive_interval: Option<u64>,
}

impl Default for SocketOpts {
    fn default() -> Self {
        SocketOpts {
            nodelay: true,
            keepalive_secs: Some(20),
            keepalive_interval: Some(8),
        }
    }
}

impl SocketOpts {
    /// Create socket options from TCP config
    pub fn from_tcp_config(config: &TcpConfig) -> Self {
        SocketOpts {
            nodelay: config.nodelay,
            keepalive_secs: Some(config.keepalive_secs),
            keepalive_interval: Some(config.keepalive_interval),
        }
    }

    /// Apply socket options to a TCP stream
    pub fn apply(&self, stream: &TcpStream) -> io::Result<()> {
        stream.set_nodelay(self.nodelay)?;

        if let (Some(timeout), Some(interval)) = (self.keepalive_secs, self.keepalive_interval) {
            let socket = socket2::SockRef::from(stream);
            let keepalive = socket2::TcpKeepalive::new()
                .with_time(Duration::from_secs(timeout))
                .with_interval(Duration::from_secs(interval));
            socket.set_tcp_keepalive(&keepalive)?;
        }

        Ok(())
    }
}

/// A connected outbound stream.
///
/// Besides being a duplex byte stream it must report its local address,
/// which becomes BND.ADDR/BND.PORT in the success reply.
pub trait OutboundStream: AsyncRead + AsyncWrite + Unpin + Send + Sync + Debug {
    /// Local address of the outbound socket
    fn local_addr(&self) -> io::Result<SocketAddr>;
}

impl OutboundStream for TcpStream {
    fn local_addr(&self) -> io::Result<SocketAddr> {
        TcpStream::local_addr(self)
    }
}

/// Opens outbound TCP connections on behalf of clients.
///
/// Errors are returned as [`io::Error`] so the request processor can map
/// their kind onto a SOCKS5 reply code.
#[async_trait]
pub trait Dialer: Send + Sync + Debug {
    /// Connect to `addr`
    async fn dial(&self, addr: SocketAddr) -> io::Result<Box<dyn OutboundStream>>;
}
