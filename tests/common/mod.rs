//! Test utilities for socks5d
//!
//! This module provides common test utilities used across integration tests.

#![allow(dead_code)]

use socks5d::credentials::{CredentialStore, MemoryStore};
use socks5d::socks::{AuthMethod, Socks5Settings};
use socks5d::Server;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

/// Create a test TCP listener on an available port
pub async fn create_test_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Spawn a TCP echo server; returns its address
pub async fn spawn_echo_server() -> SocketAddr {
    let (listener, addr) = create_test_listener().await;

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let (mut r, mut w) = stream.split();
                let _ = tokio::io::copy(&mut r, &mut w).await;
                let _ = w.shutdown().await;
            });
        }
    });

    addr
}

/// An address nothing listens on
pub async fn closed_port() -> SocketAddr {
    let (listener, addr) = create_test_listener().await;
    drop(listener);
    addr
}

/// A running server under test
pub struct TestServer {
    /// Address clients connect to
    pub addr: SocketAddr,
    /// Sending on this stops the accept loop
    pub shutdown_tx: broadcast::Sender<bool>,
    /// Accept loop task
    pub handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    /// Bind on an ephemeral port and start accepting
    pub async fn start(settings: Socks5Settings) -> Self {
        let server = Server::bind("127.0.0.1:0", settings).await.unwrap();
        let addr = server.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(server.run(shutdown_rx));
        TestServer {
            addr,
            shutdown_tx,
            handle,
        }
    }

    /// Open a client connection
    pub async fn connect(&self) -> TcpStream {
        TcpStream::connect(self.addr).await.unwrap()
    }
}

/// Test settings builder
pub struct TestSettingsBuilder {
    auth_methods: Vec<AuthMethod>,
    users: Vec<(String, String)>,
}

impl Default for TestSettingsBuilder {
    fn default() -> Self {
        TestSettingsBuilder {
            auth_methods: vec![AuthMethod::NoAuthRequired],
            users: Vec::new(),
        }
    }
}

impl TestSettingsBuilder {
    /// Create a new test settings builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set enabled methods
    pub fn auth_methods(mut self, methods: &[AuthMethod]) -> Self {
        self.auth_methods = methods.to_vec();
        self
    }

    /// Add a user
    pub fn user(mut self, username: &str, password: &str) -> Self {
        self.users.push((username.to_string(), password.to_string()));
        self
    }

    /// Build the settings
    pub fn build(self) -> Socks5Settings {
        let settings = Socks5Settings::new(self.auth_methods);
        if self.users.is_empty() {
            return settings;
        }
        let store: Arc<dyn CredentialStore> =
            Arc::new(self.users.into_iter().collect::<MemoryStore>());
        settings.with_credentials(store)
    }
}

/// Read exactly `n` bytes
pub async fn read_n(stream: &mut TcpStream, n: usize) -> Vec<u8> {
    let mut buf = vec![0u8; n];
    stream.read_exact(&mut buf).await.unwrap();
    buf
}

/// Wait until the peer closes; returns whatever arrived before EOF
pub async fn read_until_close(stream: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let _ = stream.read_to_end(&mut buf).await;
    buf
}

/// Mock SOCKS5 client messages
pub mod socks5_mock {
    use socks5d::socks::*;
    use std::net::SocketAddr;

    /// Greeting offering `methods`
    pub fn greeting(methods: &[u8]) -> Vec<u8> {
        let mut greeting = vec![SOCKS5_VERSION, methods.len() as u8];
        greeting.extend_from_slice(methods);
        greeting
    }

    /// RFC 1929 username/password request
    pub fn user_pass(username: &str, password: &str) -> Vec<u8> {
        let mut request = vec![SOCKS5_AUTH_VERSION, username.len() as u8];
        request.extend_from_slice(username.as_bytes());
        request.push(password.len() as u8);
        request.extend_from_slice(password.as_bytes());
        request
    }

    /// Request with an arbitrary command and address
    pub fn request(command: u8, address: &Address) -> Vec<u8> {
        let mut cmd = vec![SOCKS5_VERSION, command, SOCKS5_RESERVED];
        cmd.extend_from_slice(&address.to_bytes());
        cmd
    }

    /// CONNECT to a socket address
    pub fn connect(addr: SocketAddr) -> Vec<u8> {
        request(SOCKS5_CMD_TCP_CONNECT, &Address::Ip(addr))
    }

    /// CONNECT to a domain
    pub fn connect_domain(domain: &str, port: u16) -> Vec<u8> {
        request(
            SOCKS5_CMD_TCP_CONNECT,
            &Address::domain(domain, port).unwrap(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_test_listener() {
        let (listener, addr) = create_test_listener().await;
        assert!(addr.port() > 0);
        drop(listener);
    }

    #[tokio::test]
    async fn test_echo_server() {
        let addr = spawn_echo_server().await;
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"hello").await.unwrap();
        assert_eq!(read_n(&mut stream, 5).await, b"hello");
    }

    #[test]
    fn test_socks5_mock_greeting() {
        let request = socks5_mock::greeting(&[0, 2]);
        assert_eq!(request, vec![5, 2, 0, 2]);
    }

    #[test]
    fn test_socks5_mock_connect_ipv4() {
        let cmd = socks5_mock::connect("192.168.1.1:8080".parse().unwrap());
        assert_eq!(cmd[0], 5);
        assert_eq!(cmd[1], 1);
        assert_eq!(cmd[3], 1);
        assert_eq!(&cmd[4..8], &[192, 168, 1, 1]);
    }
}
