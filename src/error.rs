//! Error types for socks5d
//!
//! This module defines all custom error types used throughout the application,
//! together with the SOCKS5 reply codes that request-phase errors map onto.

use std::fmt;
use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// Main error type for socks5d operations outside a single connection
#[derive(Error, Debug)]
pub enum ProxyError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential store could not be built
    #[error("Credential store error: {0}")]
    Credentials(String),

    /// SOCKS5 protocol error
    #[error("SOCKS5 error: {0}")]
    Socks5(#[from] Socks5Error),
}

/// SOCKS5 specific errors, scoped to one client connection
#[derive(Error, Debug)]
pub enum Socks5Error {
    /// Short read/write or any other transport failure on the client stream
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Unsupported SOCKS (or username/password sub-negotiation) version
    #[error("Unsupported SOCKS version: {0}")]
    UnsupportedVersion(u8),

    /// None of the offered methods is enabled on this server
    #[error("No authentication method supported: {0}")]
    AuthNotSupported(String),

    /// Username unknown or password mismatch
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Credential store failed for a reason other than a mismatch
    #[error("Credential validation failed: {0}")]
    Credentials(String),

    /// Command not supported
    #[error("Command not supported: {0}")]
    UnsupportedCommand(u8),

    /// Address type not supported
    #[error("Address type not supported: {0}")]
    UnsupportedAddressType(u8),

    /// Invalid domain name in a request
    #[error("Invalid domain name: {0}")]
    InvalidDomain(String),

    /// Domain name could not be resolved
    #[error("Failed to resolve domain name {domain}: {source}")]
    ResolveFailed {
        /// Domain that was looked up
        domain: String,
        /// Underlying resolver error
        source: io::Error,
    },

    /// Outbound connection to the target failed
    #[error("Failed to connect to target address {addr} ({code}): {source}")]
    ConnectFailed {
        /// Dialed address
        addr: SocketAddr,
        /// Reply code the failure was classified as
        code: ReplyCode,
        /// Underlying dial error
        source: io::Error,
    },
}

impl Socks5Error {
    /// Reply code to send for an error raised while parsing a request.
    ///
    /// Handshake-level failures (bad version, broken stream) return `None`:
    /// the connection is closed without a reply.
    pub fn reply_code(&self) -> Option<ReplyCode> {
        match self {
            Socks5Error::UnsupportedCommand(_) => Some(ReplyCode::CommandNotSupported),
            Socks5Error::UnsupportedAddressType(_) => Some(ReplyCode::AddressTypeNotSupported),
            Socks5Error::InvalidDomain(_) => Some(ReplyCode::GeneralFailure),
            Socks5Error::ResolveFailed { .. } => Some(ReplyCode::HostUnreachable),
            Socks5Error::ConnectFailed { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Reply codes for SOCKS5 protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReplyCode {
    /// Command succeeded
    Succeeded = 0x00,
    /// General SOCKS server failure
    GeneralFailure = 0x01,
    /// Connection not allowed by ruleset
    NotAllowed = 0x02,
    /// Network unreachable
    NetworkUnreachable = 0x03,
    /// Host unreachable
    HostUnreachable = 0x04,
    /// Connection refused
    ConnectionRefused = 0x05,
    /// TTL expired
    TtlExpired = 0x06,
    /// Command not supported
    CommandNotSupported = 0x07,
    /// Address type not supported
    AddressTypeNotSupported = 0x08,
}

impl From<ReplyCode> for u8 {
    fn from(code: ReplyCode) -> Self {
        code as u8
    }
}

impl fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReplyCode::Succeeded => "succeeded",
            ReplyCode::GeneralFailure => "general failure",
            ReplyCode::NotAllowed => "not allowed",
            ReplyCode::NetworkUnreachable => "network unreachable",
            ReplyCode::HostUnreachable => "host unreachable",
            ReplyCode::ConnectionRefused => "connection refused",
            ReplyCode::TtlExpired => "TTL expired",
            ReplyCode::CommandNotSupported => "command not supported",
            ReplyCode::AddressTypeNotSupported => "address not supported",
        };
        f.write_str(name)
    }
}

/// Classify a dial failure.
///
/// The error kind is authoritative; the message is only consulted when the
/// kind is too generic to say anything.
impl From<&io::Error> for ReplyCode {
    fn from(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => ReplyCode::ConnectionRefused,
            io::ErrorKind::NetworkUnreachable => ReplyCode::NetworkUnreachable,
            _ => {
                let message = err.to_string().to_ascii_lowercase();
                if message.contains("refused") {
                    ReplyCode::ConnectionRefused
                } else if message.contains("network is unreachable") {
                    ReplyCode::NetworkUnreachable
                } else {
                    ReplyCode::GeneralFailure
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_code_to_u8() {
        assert_eq!(u8::from(ReplyCode::Succeeded), 0x00);
        assert_eq!(u8::from(ReplyCode::NetworkUnreachable), 0x03);
        assert_eq!(u8::from(ReplyCode::HostUnreachable), 0x04);
        assert_eq!(u8::from(ReplyCode::ConnectionRefused), 0x05);
        assert_eq!(u8::from(ReplyCode::CommandNotSupported), 0x07);
        assert_eq!(u8::from(ReplyCode::AddressTypeNotSupported), 0x08);
    }

    #[test]
    fn test_reply_code_display() {
        assert_eq!(ReplyCode::ConnectionRefused.to_string(), "connection refused");
        assert_eq!(ReplyCode::TtlExpired.to_string(), "TTL expired");
        assert_eq!(
            ReplyCode::AddressTypeNotSupported.to_string(),
            "address not supported"
        );
    }

    #[test]
    fn test_reply_code_from_io_error_kind() {
        let err = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        assert_eq!(ReplyCode::from(&err), ReplyCode::ConnectionRefused);

        let err = io::Error::new(io::ErrorKind::NetworkUnreachable, "unreachable");
        assert_eq!(ReplyCode::from(&err), ReplyCode::NetworkUnreachable);

        let err = io::Error::new(io::ErrorKind::TimedOut, "timeout");
        assert_eq!(ReplyCode::from(&err), ReplyCode::GeneralFailure);

        let err = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
        assert_eq!(ReplyCode::from(&err), ReplyCode::GeneralFailure);
    }

    #[test]
    fn test_reply_code_from_io_error_message_fallback() {
        let err = io::Error::new(io::ErrorKind::Other, "connect: connection refused");
        assert_eq!(ReplyCode::from(&err), ReplyCode::ConnectionRefused);

        let err = io::Error::new(io::ErrorKind::Other, "connect: network is unreachable");
        assert_eq!(ReplyCode::from(&err), ReplyCode::NetworkUnreachable);

        let err = io::Error::new(io::ErrorKind::Other, "something else");
        assert_eq!(ReplyCode::from(&err), ReplyCode::GeneralFailure);
    }

    #[test]
    fn test_socks5_error_reply_code() {
        assert_eq!(
            Socks5Error::UnsupportedCommand(2).reply_code(),
            Some(ReplyCode::CommandNotSupported)
        );
        assert_eq!(
            Socks5Error::UnsupportedAddressType(9).reply_code(),
            Some(ReplyCode::AddressTypeNotSupported)
        );
        assert_eq!(Socks5Error::UnsupportedVersion(4).reply_code(), None);
        assert_eq!(Socks5Error::InvalidCredentials.reply_code(), None);

        let err = Socks5Error::ConnectFailed {
            addr: "127.0.0.1:9".parse().unwrap(),
            code: ReplyCode::ConnectionRefused,
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        };
        assert_eq!(err.reply_code(), Some(ReplyCode::ConnectionRefused));
    }

    #[test]
    fn test_socks5_error_display() {
        let err = Socks5Error::UnsupportedVersion(4);
        assert_eq!(format!("{}", err), "Unsupported SOCKS version: 4");

        let err = Socks5Error::UnsupportedCommand(0x02);
        assert_eq!(format!("{}", err), "Command not supported: 2");

        let err = Socks5Error::UnsupportedAddressType(0x99);
        assert_eq!(format!("{}", err), "Address type not supported: 153");

        let err = Socks5Error::InvalidCredentials;
        assert_eq!(format!("{}", err), "Invalid credentials");
    }

    #[test]
    fn test_proxy_error_display() {
        let err = ProxyError::Config("invalid config".to_string());
        assert_eq!(format!("{}", err), "Configuration error: invalid config");

        let err = ProxyError::Credentials("empty".to_string());
        assert_eq!(format!("{}", err), "Credential store error: empty");
    }

    #[test]
    fn test_proxy_error_from_socks5() {
        let err: ProxyError = Socks5Error::InvalidCredentials.into();
        assert!(matches!(err, ProxyError::Socks5(_)));
    }

    #[test]
    fn test_proxy_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::Other, "io error");
        let err: ProxyError = io_err.into();
        assert!(matches!(err, ProxyError::Io(_)));
    }
}
