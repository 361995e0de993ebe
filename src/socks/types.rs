//! SOCKS5 type definitions
//!
//! Defines the core types used in SOCKS5 protocol handling.

use super::consts::*;
use crate::error::Socks5Error;
use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// SOCKS5 command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocksCommand {
    /// TCP CONNECT - establish a TCP connection to target
    Connect,
    /// TCP BIND - wait for incoming connection (not implemented)
    Bind,
    /// UDP ASSOCIATE - establish UDP relay (not implemented)
    UdpAssociate,
}

impl SocksCommand {
    /// Parse a command byte into SocksCommand
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            SOCKS5_CMD_TCP_CONNECT => Some(SocksCommand::Connect),
            SOCKS5_CMD_TCP_BIND => Some(SocksCommand::Bind),
            SOCKS5_CMD_UDP_ASSOCIATE => Some(SocksCommand::UdpAssociate),
            _ => None,
        }
    }

    /// Convert SocksCommand to byte
    pub fn to_byte(self) -> u8 {
        match self {
            SocksCommand::Connect => SOCKS5_CMD_TCP_CONNECT,
            SocksCommand::Bind => SOCKS5_CMD_TCP_BIND,
            SocksCommand::UdpAssociate => SOCKS5_CMD_UDP_ASSOCIATE,
        }
    }
}

impl fmt::Display for SocksCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocksCommand::Connect => write!(f, "CONNECT"),
            SocksCommand::Bind => write!(f, "BIND"),
            SocksCommand::UdpAssociate => write!(f, "UDP ASSOCIATE"),
        }
    }
}

/// Authentication methods a server can enable.
///
/// The serde names are the ones used in the `auth_methods` config list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthMethod {
    /// No authentication required
    #[serde(rename = "no-auth")]
    NoAuthRequired,
    /// GSSAPI, enumerated but never negotiated
    #[serde(rename = "gssapi")]
    Gssapi,
    /// RFC 1929 username/password
    #[serde(rename = "user-pass")]
    UserPass,
    /// No acceptable methods
    #[serde(rename = "no-acceptable")]
    NoAcceptable,
}

impl AuthMethod {
    /// Convert to SOCKS5 method byte
    pub fn to_byte(self) -> u8 {
        match self {
            AuthMethod::NoAuthRequired => SOCKS5_AUTH_METHOD_NONE,
            AuthMethod::Gssapi => SOCKS5_AUTH_METHOD_GSSAPI,
            AuthMethod::UserPass => SOCKS5_AUTH_METHOD_PASSWORD,
            AuthMethod::NoAcceptable => SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE,
        }
    }

    /// Parse from SOCKS5 method byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            SOCKS5_AUTH_METHOD_NONE => Some(AuthMethod::NoAuthRequired),
            SOCKS5_AUTH_METHOD_GSSAPI => Some(AuthMethod::Gssapi),
            SOCKS5_AUTH_METHOD_PASSWORD => Some(AuthMethod::UserPass),
            SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE => Some(AuthMethod::NoAcceptable),
            _ => None,
        }
    }

    /// Human-readable name of a raw method byte, known or not
    pub fn describe(byte: u8) -> String {
        match AuthMethod::from_byte(byte) {
            Some(method) => method.to_string(),
            None => format!("NOT ACCEPTABLE METHODS ({})", byte),
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthMethod::NoAuthRequired => "NO AUTHENTICATION REQUIRED",
            AuthMethod::Gssapi => "GSSAPI",
            AuthMethod::UserPass => "USERNAME/PASSWORD",
            AuthMethod::NoAcceptable => "NOT ACCEPTABLE METHODS",
        };
        write!(f, "{} ({})", name, self.to_byte())
    }
}

/// Address carried in SOCKS5 requests and replies
///
/// Either a socket address (IPv4 or IPv6) or a domain name with a port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    /// IP address with port
    Ip(SocketAddr),
    /// Domain name with port; build it with [`Address::domain`], which
    /// enforces the 255-byte wire limit
    Domain(String, u16),
}

impl Address {
    /// Create a new Address from an IPv4 address and port
    pub fn ipv4(ip: Ipv4Addr, port: u16) -> Self {
        Address::Ip(SocketAddr::new(IpAddr::V4(ip), port))
    }

    /// Create a new Address from an IPv6 address and port
    pub fn ipv6(ip: Ipv6Addr, port: u16) -> Self {
        Address::Ip(SocketAddr::new(IpAddr::V6(ip), port))
    }

    /// Create a new Address from a domain name and port
    ///
    /// Fails with [`Socks5Error::InvalidDomain`] if the name is longer than
    /// a SOCKS5 length byte can describe.
    pub fn domain(domain: impl Into<String>, port: u16) -> Result<Self, Socks5Error> {
        let domain = domain.into();
        if domain.len() > MAX_DOMAIN_LEN {
            return Err(Socks5Error::InvalidDomain(format!(
                "domain name is {} bytes, at most {} allowed",
                domain.len(),
                MAX_DOMAIN_LEN
            )));
        }
        Ok(Address::Domain(domain, port))
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        match self {
            Address::Ip(addr) => addr.port(),
            Address::Domain(_, port) => *port,
        }
    }

    /// Get the ATYP byte this address is encoded with
    pub fn addr_type(&self) -> u8 {
        match self {
            Address::Domain(_, _) => SOCKS5_ADDR_TYPE_DOMAIN,
            Address::Ip(addr) => match as_ipv4(addr.ip()) {
                Some(_) => SOCKS5_ADDR_TYPE_IPV4,
                None => SOCKS5_ADDR_TYPE_IPV6,
            },
        }
    }

    /// Append `ATYP | ADDR | PORT` to `buf`.
    ///
    /// IPv4-mapped IPv6 addresses are written in the 4-byte form.
    pub fn write_to(&self, buf: &mut BytesMut) {
        match self {
            Address::Domain(domain, port) => {
                debug_assert!(domain.len() <= MAX_DOMAIN_LEN, "unchecked domain name");
                // Keeps the length byte consistent for a hand-built variant
                let name = &domain.as_bytes()[..domain.len().min(MAX_DOMAIN_LEN)];
                buf.put_u8(SOCKS5_ADDR_TYPE_DOMAIN);
                buf.put_u8(name.len() as u8);
                buf.put_slice(name);
                buf.put_u16(*port);
            }
            Address::Ip(addr) => {
                match as_ipv4(addr.ip()) {
                    Some(v4) => {
                        buf.put_u8(SOCKS5_ADDR_TYPE_IPV4);
                        buf.put_slice(&v4.octets());
                    }
                    None => {
                        buf.put_u8(SOCKS5_ADDR_TYPE_IPV6);
                        match addr.ip() {
                            IpAddr::V6(v6) => buf.put_slice(&v6.octets()),
                            IpAddr::V4(v4) => buf.put_slice(&v4.to_ipv6_mapped().octets()),
                        }
                    }
                }
                buf.put_u16(addr.port());
            }
        }
    }

    /// Serialize the address to bytes for SOCKS5 protocol
    pub fn to_bytes(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.write_to(&mut buf);
        buf
    }

    /// Length of the encoded form, ATYP included
    pub fn encoded_len(&self) -> usize {
        match self {
            Address::Domain(domain, _) => 1 + 1 + domain.len().min(MAX_DOMAIN_LEN) + 2,
            Address::Ip(addr) => match as_ipv4(addr.ip()) {
                Some(_) => 1 + 4 + 2,
                None => 1 + 16 + 2,
            },
        }
    }
}

/// The 4-byte form of an IP, if it has one
fn as_ipv4(ip: IpAddr) -> Option<Ipv4Addr> {
    match ip {
        IpAddr::V4(v4) => Some(v4),
        IpAddr::V6(v6) => v6.to_ipv4_mapped(),
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Ip(addr) => write!(f, "{}", addr),
            Address::Domain(domain, port) => write!(f, "{}:{}", domain, port),
        }
    }
}

impl From<SocketAddr> for Address {
    fn from(addr: SocketAddr) -> Self {
        Address::Ip(addr)
    }
}

/// The null address `0.0.0.0:0`
impl Default for Address {
    fn default() -> Self {
        Address::Ip(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socks_command_from_byte() {
        assert_eq!(SocksCommand::from_byte(1), Some(SocksCommand::Connect));
        assert_eq!(SocksCommand::from_byte(2), Some(SocksCommand::Bind));
        assert_eq!(SocksCommand::from_byte(3), Some(SocksCommand::UdpAssociate));
        assert_eq!(SocksCommand::from_byte(4), None);
    }

    #[test]
    fn test_socks_command_to_byte() {
        assert_eq!(SocksCommand::Connect.to_byte(), 1);
        assert_eq!(SocksCommand::Bind.to_byte(), 2);
        assert_eq!(SocksCommand::UdpAssociate.to_byte(), 3);
    }

    #[test]
    fn test_socks_command_display() {
        assert_eq!(format!("{}", SocksCommand::Connect), "CONNECT");
        assert_eq!(format!("{}", SocksCommand::Bind), "BIND");
        assert_eq!(format!("{}", SocksCommand::UdpAssociate), "UDP ASSOCIATE");
    }

    #[test]
    fn test_auth_method_bytes() {
        for method in [
            AuthMethod::NoAuthRequired,
            AuthMethod::Gssapi,
            AuthMethod::UserPass,
            AuthMethod::NoAcceptable,
        ] {
            assert_eq!(AuthMethod::from_byte(method.to_byte()), Some(method));
        }
        assert_eq!(AuthMethod::from_byte(0x03), None);
    }

    #[test]
    fn test_auth_method_display() {
        assert_eq!(
            AuthMethod::NoAuthRequired.to_string(),
            "NO AUTHENTICATION REQUIRED (0)"
        );
        assert_eq!(AuthMethod::Gssapi.to_string(), "GSSAPI (1)");
        assert_eq!(AuthMethod::UserPass.to_string(), "USERNAME/PASSWORD (2)");
        assert_eq!(
            AuthMethod::NoAcceptable.to_string(),
            "NOT ACCEPTABLE METHODS (255)"
        );
        assert_eq!(AuthMethod::describe(0x80), "NOT ACCEPTABLE METHODS (128)");
        assert_eq!(AuthMethod::describe(0x02), "USERNAME/PASSWORD (2)");
    }

    #[test]
    fn test_auth_method_serde_names() {
        #[derive(Deserialize)]
        struct Methods {
            methods: Vec<AuthMethod>,
        }

        let parsed: Methods =
            toml::from_str(r#"methods = ["no-auth", "gssapi", "user-pass", "no-acceptable"]"#)
                .unwrap();
        assert_eq!(
            parsed.methods,
            vec![
                AuthMethod::NoAuthRequired,
                AuthMethod::Gssapi,
                AuthMethod::UserPass,
                AuthMethod::NoAcceptable
            ]
        );
    }

    #[test]
    fn test_address_ipv4() {
        let addr = Address::ipv4(Ipv4Addr::new(192, 168, 1, 1), 8080);
        assert_eq!(addr.port(), 8080);
        assert_eq!(addr.addr_type(), SOCKS5_ADDR_TYPE_IPV4);
    }

    #[test]
    fn test_address_ipv6() {
        let addr = Address::ipv6(Ipv6Addr::LOCALHOST, 443);
        assert_eq!(addr.port(), 443);
        assert_eq!(addr.addr_type(), SOCKS5_ADDR_TYPE_IPV6);
    }

    #[test]
    fn test_address_domain() {
        let addr = Address::domain("example.com", 80).unwrap();
        assert_eq!(addr.port(), 80);
        assert_eq!(addr.addr_type(), SOCKS5_ADDR_TYPE_DOMAIN);
    }

    #[test]
    fn test_address_domain_length_limit() {
        let longest = "a".repeat(MAX_DOMAIN_LEN);
        let addr = Address::domain(longest.as_str(), 80).unwrap();
        assert_eq!(addr.to_bytes()[1], 255);
        assert_eq!(addr.encoded_len(), 1 + 1 + 255 + 2);

        let result = Address::domain("a".repeat(MAX_DOMAIN_LEN + 1), 80);
        assert!(matches!(result, Err(Socks5Error::InvalidDomain(_))));
    }

    #[test]
    fn test_address_display() {
        let addr = Address::ipv4(Ipv4Addr::new(127, 0, 0, 1), 8080);
        assert_eq!(format!("{}", addr), "127.0.0.1:8080");

        let addr = Address::domain("test.com", 443).unwrap();
        assert_eq!(format!("{}", addr), "test.com:443");
    }

    #[test]
    fn test_address_to_bytes_ipv4() {
        let addr = Address::ipv4(Ipv4Addr::new(192, 168, 1, 1), 8080);
        let bytes = addr.to_bytes();

        assert_eq!(bytes.len(), addr.encoded_len());
        assert_eq!(bytes[0], SOCKS5_ADDR_TYPE_IPV4);
        assert_eq!(&bytes[1..5], &[192, 168, 1, 1]);
        assert_eq!(&bytes[5..7], &8080u16.to_be_bytes());
    }

    #[test]
    fn test_address_to_bytes_ipv6() {
        let addr = Address::ipv6(Ipv6Addr::LOCALHOST, 443);
        let bytes = addr.to_bytes();

        assert_eq!(bytes.len(), 19);
        assert_eq!(bytes[0], SOCKS5_ADDR_TYPE_IPV6);
        assert_eq!(&bytes[1..17], &Ipv6Addr::LOCALHOST.octets());
        assert_eq!(&bytes[17..19], &443u16.to_be_bytes());
    }

    #[test]
    fn test_address_to_bytes_ipv4_mapped() {
        let mapped = Ipv4Addr::new(10, 1, 2, 3).to_ipv6_mapped();
        let addr = Address::ipv6(mapped, 53);
        let bytes = addr.to_bytes();

        assert_eq!(addr.addr_type(), SOCKS5_ADDR_TYPE_IPV4);
        assert_eq!(&bytes[..], &[SOCKS5_ADDR_TYPE_IPV4, 10, 1, 2, 3, 0, 53]);
    }

    #[test]
    fn test_address_to_bytes_domain() {
        let addr = Address::domain("test", 80).unwrap();
        let bytes = addr.to_bytes();

        assert_eq!(bytes[0], SOCKS5_ADDR_TYPE_DOMAIN);
        assert_eq!(bytes[1], 4);
        assert_eq!(&bytes[2..6], b"test");
        assert_eq!(&bytes[6..8], &80u16.to_be_bytes());
    }

    #[test]
    fn test_address_default_is_null() {
        let addr = Address::default();
        assert_eq!(&addr.to_bytes()[..], &[SOCKS5_ADDR_TYPE_IPV4, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_address_from_socket_addr() {
        let socket_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), 1234);
        let target: Address = socket_addr.into();
        assert_eq!(target, Address::Ip(socket_addr));
    }
}
