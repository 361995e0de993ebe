//! # socks5d - SOCKS5 Proxy Server
//!
//! socks5d accepts TCP clients, negotiates an authentication method,
//! authenticates the client, parses a CONNECT request, dials the target and
//! relays bytes in both directions until either side closes. It speaks
//! SOCKS5 (RFC 1928) and username/password authentication (RFC 1929).
//!
//! ## Features
//!
//! - **Method negotiation in server priority order**: NO AUTHENTICATION
//!   REQUIRED and USERNAME/PASSWORD
//! - **Pluggable collaborators**: credential store, domain resolver and
//!   outbound dialer are traits shared by every connection
//! - **Explicit sessions**: each connection carries its id, log span and
//!   authentication context
//! - **Best-effort shutdown**: stopping the server closes the listener and
//!   leaves in-flight connections alone
//!
//! ## Usage
//!
//! ```rust,ignore
//! use socks5d::config::load_config;
//! use socks5d::server::run_server;
//! use tokio::sync::broadcast;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config("config.toml")?;
//!     let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
//!
//!     run_server(config, shutdown_rx).await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! SOCKS5 Client -> socks5d -> Target
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod credentials;
pub mod error;
pub mod server;
pub mod socks;
pub mod transport;

// Re-export commonly used items
pub use config::{load_config, Config};
pub use error::{ProxyError, ReplyCode, Socks5Error};
pub use server::{run_server, Server};
pub use socks::Socks5Settings;

/// Version of the socks5d library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the application
pub const NAME: &str = env!("CARGO_PKG_NAME");
