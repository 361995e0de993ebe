//! SOCKS5 reply builder
//!
//! Constructs SOCKS5 reply messages.

use crate::error::{ReplyCode, Socks5Error};
use crate::socks::consts::*;
use crate::socks::types::Address;
use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Encode a SOCKS5 reply
///
/// # SOCKS5 Reply Format
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | REP |  RSV  | ATYP | BND.ADDR | BND.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
///
/// `None` encodes the null address `0.0.0.0:0`.
pub fn encode_reply(code: ReplyCode, addr: Option<&Address>) -> BytesMut {
    let null = Address::default();
    let addr = addr.unwrap_or(&null);

    let mut buf = BytesMut::with_capacity(3 + addr.encoded_len());
    buf.put_u8(SOCKS5_VERSION);
    buf.put_u8(code.into());
    buf.put_u8(SOCKS5_RESERVED);
    addr.write_to(&mut buf);
    buf
}

/// Encode and send a SOCKS5 reply
pub async fn send_reply<S>(
    stream: &mut S,
    code: ReplyCode,
    addr: Option<&Address>,
) -> Result<(), Socks5Error>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(&encode_reply(code, addr)).await?;
    stream.flush().await?;
    Ok(())
}
