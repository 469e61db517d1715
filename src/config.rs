//! Compile-time server configuration.
//!
//! Every knob here is a `pub const`, not a runtime setting: there is no
//! configuration file and no environment-variable overlay. The only two
//! values a caller can change are the bind host and port, both passed to
//! [`crate::ServerBuilder::new`].

/// Default bind address used by [`crate::ServerBuilder::default`].
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default bind port used by [`crate::ServerBuilder::default`].
pub const DEFAULT_PORT: u16 = 8000;

/// Whether `GET /health` is served automatically by the connection driver.
pub const HEALTH_CHECK_ENABLED: bool = true;

/// Hard cap on the bytes read for a single request (request line + headers + body).
pub const MAX_REQUEST_SIZE: usize = 1024 * 1024 * 10;

/// Read timeout applied to the connection socket for a single request, in seconds.
pub const SOCKET_TIMEOUT: u64 = 30;

/// Size of the scratch buffer used to pull bytes off the socket.
pub const BUFFER_SIZE: usize = 8192;

/// Directory `Response::send_file` resolves relative paths against.
pub const STATIC_DIR: &str = "static";
/// Directory `Response::render_template` resolves relative paths against.
pub const TEMPLATE_DIR: &str = "templates";

/// Whether keep-alive connections are honored at all.
pub const KEEP_ALIVE_ENABLED: bool = true;
/// Idle time a keep-alive connection may wait for the next request, in seconds.
pub const KEEP_ALIVE_TIMEOUT: u64 = 5;
/// Maximum number of requests served on a single keep-alive connection.
pub const MAX_KEEP_ALIVE_REQUESTS: u32 = 100;

/// `Server` response header identifying this implementation.
pub const SERVER_IDENT: &str = "CPPServer/1.1";
