//! TCP relay for SOCKS5 CONNECT command
//!
//! Handles TCP CONNECT requests by establishing a connection to the target
//! and relaying data bidirectionally.

use super::command::send_reply;
use super::session::Session;
use super::settings::Socks5Settings;
use super::types::Address;
use crate::error::{ReplyCode, Socks5Error};
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Handle TCP CONNECT command
///
/// This function:
/// 1. Resolves the target address
/// 2. Dials the target
/// 3. Sends exactly one reply
/// 4. Relays data bidirectionally between client and target
///
/// Failure replies carry the requested address. The outbound stream is
/// dropped on every exit path.
pub async fn handle_connect<S>(
    client: &mut S,
    target: &Address,
    settings: &Socks5Settings,
    session: &Session,
) -> Result<(), Socks5Error>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let socket_addr = match target {
        Address::Ip(addr) => *addr,
        Address::Domain(domain, port) => match settings.resolver().resolve(domain).await {
            Ok(ip) => SocketAddr::new(ip, *port),
            Err(source) => {
                reply_failure(client, ReplyCode::HostUnreachable, target, session).await;
                return Err(Socks5Error::ResolveFailed {
                    domain: domain.clone(),
                    source,
                });
            }
        },
    };

    debug!(parent: session.span(), "Connecting to target: {}", socket_addr);

    let outbound = match settings.dialer().dial(socket_addr).await {
        Ok(stream) => stream,
        Err(source) => {
            let code = ReplyCode::from(&source);
            reply_failure(client, code, target, session).await;
            return Err(Socks5Error::ConnectFailed {
                addr: socket_addr,
                code,
                source,
            });
        }
    };

    let local_addr = match outbound.local_addr() {
        Ok(addr) => addr,
        Err(e) => {
            reply_failure(client, ReplyCode::GeneralFailure, target, session).await;
            return Err(e.into());
        }
    };

    send_reply(client, ReplyCode::Succeeded, Some(&Address::Ip(local_addr))).await?;

    info!(parent: session.span(), "SOCKS5 tunnel established to {} via {}", target, local_addr);

    let (sent, received) = relay_tcp(client, outbound).await?;
    debug!(parent: session.span(), "Relay finished: {} bytes sent, {} bytes received", sent, received);

    Ok(())
}

/// Send a failure reply; a write error is logged and swallowed so the
/// caller still reports the original failure
async fn reply_failure<S>(client: &mut S, code: ReplyCode, target: &Address, session: &Session)
where
    S: AsyncWrite + Unpin,
{
    if let Err(e) = send_reply(client, code, Some(target)).await {
        warn!(parent: session.span(), "Failed to send {} reply: {}", code, e);
    }
}

/// Relay data bidirectionally between two streams
///
/// Each direction copies until EOF, then shuts down the write half it was
/// feeding so the peer sees the half-close. Both directions are awaited;
/// if both fail, the error that happened first is returned. Returns the
/// bytes copied `a → b` and `b → a`.
pub async fn relay_tcp<A, B>(a: A, b: B) -> io::Result<(u64, u64)>
where
    A: AsyncRead + AsyncWrite + Unpin,
    B: AsyncRead + AsyncWrite + Unpin,
{
    let (mut a_read, mut a_write) = tokio::io::split(a);
    let (mut b_read, mut b_write) = tokio::io::split(b);

    // Completion order of the two directions
    let finished = AtomicUsize::new(0);

    let a_to_b = async {
        let copied = tokio::io::copy(&mut a_read, &mut b_write).await;
        let order = finished.fetch_add(1, Ordering::Relaxed);
        let _ = b_write.shutdown().await;
        (order, copied)
    };
    let b_to_a = async {
        let copied = tokio::io::copy(&mut b_read, &mut a_write).await;
        let order = finished.fetch_add(1, Ordering::Relaxed);
        let _ = a_write.shutdown().await;
        (order, copied)
    };

    match tokio::join!(a_to_b, b_to_a) {
        ((_, Ok(sent)), (_, Ok(received))) => Ok((sent, received)),
        ((_, Err(e)), (_, Ok(_))) | ((_, Ok(_)), (_, Err(e))) => Err(e),
        ((a_order, Err(a_err)), (b_order, Err(b_err))) => {
            Err(if a_order < b_order { a_err } else { b_err })
        }
    }
}
