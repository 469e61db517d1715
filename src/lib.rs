//! forge_http - Embeddable, thread-per-connection HTTP/1.1 server core
//!
//! A small, dependency-light HTTP/1.1 server library meant to be embedded
//! inside a larger process rather than run as a standalone gateway: you
//! build a [`Server`] with [`ServerBuilder`], register handlers against
//! exact paths or typed patterns (`/user/{id:int}`), and call [`Server::run`]
//! to block the calling thread while it accepts connections.
//!
//! # Protocol support
//!
//! - HTTP/1.1 request parsing: `Content-Length` and `Transfer-Encoding:
//!   chunked` framing, `application/x-www-form-urlencoded` and
//!   `multipart/form-data` bodies, query strings, cookies, and a best-effort
//!   JSON body parse.
//! - HTTP/1.1 response serialization: a fluent [`Response`] builder, multi-
//!   valued `Set-Cookie`, a gzip compression pre-pass gated on size/type/
//!   `Accept-Encoding`, and keep-alive bookkeeping (`Connection`,
//!   `Keep-Alive: timeout=…, max=…`).
//!
//! # Concurrency model
//!
//! One thread runs the accept loop; every accepted connection is handed to
//! its own detached OS thread. There is no async runtime and no bounded
//! worker pool. Route tables are built before [`Server::run`] and never
//! mutated afterward, so concurrent connections share them without locking.
//!
//! # Quick start
//!
//! ```no_run
//! use forge_http::{handler, Request, Server};
//!
//! fn hello(req: &Request) -> forge_http::Handled {
//!     let name = req.query("name").unwrap_or("World");
//!     handler::ok(format!("Hello, {name}!"))
//! }
//!
//! fn main() -> Result<(), forge_http::ServerError> {
//!     let server = Server::builder()
//!         .host("127.0.0.1")
//!         .port(8080)
//!         .get("/", hello)?
//!         .build();
//!     server.run()
//! }
//! ```
//!
//! # What this crate does not do
//!
//! HTTP/2, HTTP/3, TLS termination, request pipelining, streaming response
//! bodies, byte-range responses, async I/O, persistent sessions, and
//! anything beyond verbatim-file templating are all out of scope; see the
//! crate's design notes for the reasoning.

mod config;
mod errors;
mod gzip;
mod handler;
mod http {
    pub(crate) mod multipart;
    pub mod request;
    pub mod response;
}
mod mime;
mod ordered_map;
mod router;
mod server {
    pub(crate) mod connection;
    pub(crate) mod driver;
}
mod status;
mod strings;
mod upload;

pub use crate::config::{
    BUFFER_SIZE, DEFAULT_HOST, DEFAULT_PORT, HEALTH_CHECK_ENABLED, KEEP_ALIVE_ENABLED,
    KEEP_ALIVE_TIMEOUT, MAX_KEEP_ALIVE_REQUESTS, MAX_REQUEST_SIZE, SOCKET_TIMEOUT, STATIC_DIR,
    TEMPLATE_DIR,
};
pub use crate::errors::{ErrorKind, ServerError};
pub use crate::handler::Handled;
pub use crate::handler::Handler;
pub use crate::http::request::Request;
pub use crate::http::response::{CookieOptions, Response};
pub use crate::mime::sniff as sniff_mime;
pub use crate::ordered_map::{HeaderMap, OrderedMap};
pub use crate::server::driver::{Server, ServerBuilder};
pub use crate::status::StatusCode;
pub use crate::strings::{parse_urlencoded, percent_decode, trim};
pub use crate::upload::UploadedFile;

/// Convenience constructors for [`Handled`] values, mirroring the fixed-
/// status helpers (`Ok`, `Created`, `BadRequest`, ...) the handler adapter
/// specifies.
pub mod handler {
    pub use crate::handler::{
        bad_request, created, internal_server_error, json, method_not_allowed, not_found,
        not_implemented, number, ok, response, text,
    };
}
