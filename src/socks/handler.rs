//! Connection supervisor
//!
//! Owns one accepted connection from the first byte to the close. It
//! sequences the handshake, attaches the negotiated [`AuthContext`] to the
//! [`Session`], dispatches the request and logs the outcome with the phase
//! it ended in.
//!
//! [`AuthContext`]: super::auth::AuthContext

use super::auth::select_method;
use super::command::{parse_request, send_reply};
use super::consts::SOCKS5_VERSION;
use super::session::Session;
use super::settings::Socks5Settings;
use super::tcp_relay::handle_connect;
use super::types::Address;
use crate::error::Socks5Error;
use std::fmt;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Stage of the connection a failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Reading the greeting's version byte
    Initiation,
    /// Reading the method offer and answering it
    MethodSelection,
    /// Method-specific sub-negotiation
    Authentication,
    /// Reading the request
    RequestParsing,
    /// Resolving, dialing and relaying
    RequestHandling,
}

impl Phase {
    /// Tag used in the `phase` log field
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Initiation => "initiation",
            Phase::MethodSelection => "method selection",
            Phase::Authentication => "authentication",
            Phase::RequestParsing => "request parsing",
            Phase::RequestHandling => "request handling",
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            Phase::Initiation => "failed to read SOCKS version",
            Phase::MethodSelection => "failed to parse SOCKS authentication methods",
            Phase::Authentication => "failed to authenticate SOCKS client",
            Phase::RequestParsing => "failed to parse SOCKS request",
            Phase::RequestHandling => "failed to handle SOCKS request",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A connection failure tagged with its phase
#[derive(Debug)]
pub struct PhaseError {
    /// Where the connection failed
    pub phase: Phase,
    /// Why
    pub error: Socks5Error,
}

fn at(phase: Phase) -> impl FnOnce(Socks5Error) -> PhaseError {
    move |error| PhaseError { phase, error }
}

/// Best-effort reply for a request that could not be parsed
async fn reject<S>(stream: &mut S, error: Socks5Error, session: &Session) -> PhaseError
where
    S: AsyncWrite + Unpin,
{
    if let Some(code) = error.reply_code() {
        if let Err(e) = send_reply(stream, code, None).await {
            warn!(parent: session.span(), "Failed to send {} reply: {}", code, e);
        }
    }
    at(Phase::RequestParsing)(error)
}

/// Handle one client connection end-to-end
///
/// Failures are logged under the session's span and end only this
/// connection. The stream is shut down on every path.
pub async fn handle_connection<S>(mut stream: S, settings: &Socks5Settings, session: Session)
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let span = session.span().clone();

    match serve(&mut stream, settings, session).await {
        Ok(remote) => {
            info!(parent: &span, phase = "completion", remote = %remote, "handling SOCKS request completed");
        }
        Err(PhaseError { phase, error }) => {
            warn!(parent: &span, phase = phase.as_str(), error = %error, "{}", phase.failure_message());
        }
    }

    if let Err(e) = stream.shutdown().await {
        debug!(parent: &span, "Failed to shut down client stream: {}", e);
    }
}

/// Run the handshake and the request; returns the requested address
pub async fn serve<S>(
    stream: &mut S,
    settings: &Socks5Settings,
    session: Session,
) -> Result<Address, PhaseError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let version = stream
        .read_u8()
        .await
        .map_err(|e| at(Phase::Initiation)(e.into()))?;
    if version != SOCKS5_VERSION {
        return Err(at(Phase::Initiation)(Socks5Error::UnsupportedVersion(version)));
    }

    let authenticator = select_method(stream, settings, &session)
        .await
        .map_err(at(Phase::MethodSelection))?;

    let auth = authenticator
        .authenticate(stream, &session)
        .await
        .map_err(at(Phase::Authentication))?;
    let session = session.authenticated(auth);
    if let Some(username) = session.auth().and_then(|a| a.username()) {
        debug!(parent: session.span(), "Authenticated as {}", username);
    }

    let request = match parse_request(stream).await {
        Ok(request) => request,
        Err(error) => return Err(reject(stream, error, &session).await),
    };

    info!(parent: session.span(), "SOCKS5 {} request to {}", request.command, request.address);

    handle_connect(stream, &request.address, settings, &session)
        .await
        .map_err(at(Phase::RequestHandling))?;

    Ok(request.address)
}
