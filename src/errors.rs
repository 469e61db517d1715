//! Error types.
//!
//! [`ErrorKind`] covers request-read/protocol failures: the connection
//! driver maps these straight to a fixed HTTP error response and closes the
//! connection. [`ServerError`] covers setup-time failures — a bad bind
//! address or an invalid route pattern — and is returned synchronously from
//! [`crate::ServerBuilder::build`]/[`crate::Server::run`], never sent over
//! the wire.

use std::{error, fmt, io};

/// A failure while reading or framing a single request. Whatever the exact
/// cause, spec.md §4.D/§7 report it identically: the connection driver
/// sends a fixed 400 Bad Request and closes the connection. The variants
/// are kept distinct anyway so `Display` (and `log::debug!` call sites) can
/// say what actually went wrong.
#[derive(Debug)]
pub enum ErrorKind {
    InvalidRequestLine,
    InvalidHeader,
    HeadersTooLarge,
    InvalidContentLength,
    BodyTooLarge,
    Io(io::Error),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidRequestLine => write!(f, "invalid request line"),
            ErrorKind::InvalidHeader => write!(f, "invalid header"),
            ErrorKind::HeadersTooLarge => write!(f, "request too large"),
            ErrorKind::InvalidContentLength => write!(f, "invalid Content-Length"),
            ErrorKind::BodyTooLarge => write!(f, "request body too large"),
            ErrorKind::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl error::Error for ErrorKind {}

impl From<io::Error> for ErrorKind {
    fn from(err: io::Error) -> Self {
        ErrorKind::Io(err)
    }
}

/// Failures that can occur while configuring or starting a [`crate::Server`].
#[derive(Debug)]
pub enum ServerError {
    /// Binding or listening on the configured address failed.
    Io(io::Error),
    /// A route pattern is malformed (bad `{name:type}` syntax, unknown
    /// type, or an invalid variable name).
    InvalidRoutePattern { pattern: String, reason: String },
    /// The configured host could not be parsed as an IP address.
    InvalidAddress(String),
    /// `Server::run` was called while the server was already running.
    AlreadyRunning,
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Io(err) => write!(f, "server io error: {err}"),
            ServerError::InvalidRoutePattern { pattern, reason } => {
                write!(f, "invalid route pattern {pattern:?}: {reason}")
            }
            ServerError::InvalidAddress(host) => write!(f, "invalid bind address: {host}"),
            ServerError::AlreadyRunning => write!(f, "server is already running"),
        }
    }
}

impl error::Error for ServerError {}

impl From<io::Error> for ServerError {
    fn from(err: io::Error) -> Self {
        ServerError::Io(err)
    }
}
