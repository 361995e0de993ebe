//! SOCKS5 request parser
//!
//! Parses SOCKS5 requests and the address encoding shared by requests and
//! replies.

use crate::error::Socks5Error;
use crate::socks::consts::*;
use crate::socks::types::{Address, SocksCommand};
use std::net::{Ipv4Addr, Ipv6Addr};
use tokio::io::{AsyncRead, AsyncReadExt};

/// A parsed SOCKS5 request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Requested command
    pub command: SocksCommand,
    /// Target address
    pub address: Address,
}

/// Parse a SOCKS5 request from the stream
///
/// # SOCKS5 Request Format
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | CMD |  RSV  | ATYP | DST.ADDR | DST.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
///
/// Only CONNECT is accepted. Any other command yields
/// [`Socks5Error::UnsupportedCommand`] whatever follows it; the address is
/// still drained on a best-effort basis so the reply is not lost to a reset.
pub async fn parse_request<S>(stream: &mut S) -> Result<Request, Socks5Error>
where
    S: AsyncRead + Unpin,
{
    let mut header = [0u8; 3];
    stream.read_exact(&mut header).await?;

    let version = header[0];
    let cmd_byte = header[1];

    if version != SOCKS5_VERSION {
        return Err(Socks5Error::UnsupportedVersion(version));
    }

    match SocksCommand::from_byte(cmd_byte) {
        Some(SocksCommand::Connect) => Ok(Request {
            command: SocksCommand::Connect,
            address: read_address(stream).await?,
        }),
        _ => {
            let _ = read_address(stream).await;
            Err(Socks5Error::UnsupportedCommand(cmd_byte))
        }
    }
}

/// Decode `ATYP | ADDR | PORT` from the stream
///
/// Reads exactly the declared length. An unknown ATYP yields
/// [`Socks5Error::UnsupportedAddressType`]; an empty or non UTF-8 domain
/// yields [`Socks5Error::InvalidDomain`].
pub async fn read_address<S>(stream: &mut S) -> Result<Address, Socks5Error>
where
    S: AsyncRead + Unpin,
{
    let addr_type = stream.read_u8().await?;

    match addr_type {
        SOCKS5_ADDR_TYPE_IPV4 => {
            let mut addr = [0u8; 4];
            stream.read_exact(&mut addr).await?;
            let port = stream.read_u16().await?;

            Ok(Address::ipv4(Ipv4Addr::from(addr), port))
        }

        SOCKS5_ADDR_TYPE_DOMAIN => {
            let domain_len = stream.read_u8().await? as usize;
            let mut domain_buf = vec![0u8; domain_len];
            stream.read_exact(&mut domain_buf).await?;
            let port = stream.read_u16().await?;

            if domain_len == 0 {
                return Err(Socks5Error::InvalidDomain("empty domain name".to_string()));
            }
            let domain = String::from_utf8(domain_buf)
                .map_err(|e| Socks5Error::InvalidDomain(e.to_string()))?;

            Address::domain(domain, port)
        }

        SOCKS5_ADDR_TYPE_IPV6 => {
            let mut addr = [0u8; 16];
            stream.read_exact(&mut addr).await?;
            let port = stream.read_u16().await?;

            Ok(Address::ipv6(Ipv6Addr::from(addr), port))
        }

        other => Err(Socks5Error::UnsupportedAddressType(other)),
    }
}
