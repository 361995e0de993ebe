//! SOCKS5 server
//!
//! Owns the listener and the accept loop. Every accepted connection gets
//! its own [`Session`] and task; the loop itself only stops on shutdown.

use crate::config::Config;
use crate::socks::{handle_connection, Session, Socks5Settings};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::broadcast;
use tracing::{error, info, Instrument};

/// Pause after a failed accept, e.g. when out of file descriptors
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Main socks5d server
pub struct Server {
    /// Bound listener
    listener: TcpListener,
    /// Shared runtime settings
    settings: Arc<Socks5Settings>,
}

impl Server {
    /// Bind the listener
    pub async fn bind<A: ToSocketAddrs>(addr: A, settings: Socks5Settings) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| "Failed to bind SOCKS5 listener")?;
        Ok(Server {
            listener,
            settings: Arc::new(settings),
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Get a reference to the runtime settings
    pub fn settings(&self) -> &Socks5Settings {
        &self.settings
    }

    /// Accept connections until shutdown
    ///
    /// Shutdown only stops the accept loop and closes the listener;
    /// connections already handed to a task keep running.
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
        info!("Listening on {}", self.local_addr()?);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received, stopping listener");
                    break;
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let session = Session::new(Some(peer));
                            let span = session.span().clone();
                            let settings = self.settings.clone();
                            tokio::spawn(
                                async move { handle_connection(stream, &settings, session).await }
                                    .instrument(span),
                            );
                        }
                        Err(e) => {
                            error!("Failed to accept connection: {}", e);
                            tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                        }
                    }
                }
            }
        }

        info!("Server stopped");
        Ok(())
    }
}

/// Run the server with the given configuration
pub async fn run_server(config: Config, shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
    let settings = Socks5Settings::from_config(&config.server)?;
    let server = Server::bind(config.server.listen_addr.as_str(), settings).await?;
    server.run(shutdown_rx).await
}
