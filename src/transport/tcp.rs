//! TCP dialer
//!
//! Provides plain TCP connections to SOCKS5 targets.

use super::{Dialer, OutboundStream, SocketOpts};
use crate::config::TcpConfig;
use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;

/// TCP dialer for outbound connections
#[derive(Debug, Clone)]
pub struct TcpDialer {
    /// Socket options to apply to connections
    socket_opts: SocketOpts,
    /// Connection timeout; `None` waits for the OS to give up
    connect_timeout: Option<Duration>,
}

impl Default for TcpDialer {
    fn default() -> Self {
        TcpDialer {
            socket_opts: SocketOpts::default(),
            connect_timeout: None,
        }
    }
}

impl TcpDialer {
    /// Create a TCP dialer from configuration
    pub fn from_config(config: &TcpConfig) -> Self {
        TcpDialer {
            socket_opts: SocketOpts::from_tcp_config(config),
            connect_timeout: config.connect_timeout_secs.map(Duration::from_secs),
        }
    }

    async fn connect(&self, addr: SocketAddr) -> io::Result<TcpStream> {
        let stream = match self.connect_timeout {
            Some(timeout) => tokio::time::timeout(timeout, TcpStream::connect(addr))
                .await
                .map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("connection timeout to {}", addr),
                    )
                })??,
            None => TcpStream::connect(addr).await?,
        };

        if let Err(e) = self.socket_opts.apply(&stream) {
            tracing::warn!("Failed to apply socket options: {}", e);
        }

        tracing::debug!("TCP connection established to {}", addr);

        Ok(stream)
    }
}

#[async_trait]
impl Dialer for TcpDialer {
    async fn dial(&self, addr: SocketAddr) -> io::Result<Box<dyn OutboundStream>> {
        let stream = self.connect(addr).await?;
        Ok(Box::new(stream))
    }
}
