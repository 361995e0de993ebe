//! SOCKS5 protocol engine
//!
//! This module implements the per-connection state machine: method
//! negotiation, authentication, request parsing, CONNECT dispatch, reply
//! encoding and byte relay. Connection-scoped state travels in an explicit
//! [`Session`]; shared collaborators live in [`Socks5Settings`].

mod auth;
mod command;
mod consts;
mod handler;
mod session;
mod settings;
mod tcp_relay;
mod types;

pub use auth::{
    negotiate, select_authenticator, select_method, AuthContext, Authenticator, NoAuth,
    PasswordAuth, USERNAME_KEY,
};
pub use command::{encode_reply, parse_request, read_address, send_reply, Request};
pub use consts::*;
pub use handler::{handle_connection, serve, Phase, PhaseError};
pub use session::Session;
pub use settings::Socks5Settings;
pub use tcp_relay::{handle_connect, relay_tcp};
pub use types::{Address, AuthMethod, SocksCommand};
