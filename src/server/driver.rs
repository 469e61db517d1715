//! The listening socket, accept loop, and public builder (spec.md §4.G).
//!
//! Route registration happens on [`ServerBuilder`]; [`Server::run`] blocks
//! the calling thread, accepting connections and handing each one to
//! [`super::connection::serve`] on its own thread until [`Server::stop`] is
//! called from elsewhere.

use crate::errors::ServerError;
use crate::handler::Handler;
use crate::router::{Router, METHODS};
use crate::server::connection;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Backlog passed to `listen(2)`. There is no portable way to read the
/// platform's `SOMAXCONN` from std alone; this is comfortably above what
/// any embedded deployment of this crate needs.
const LISTEN_BACKLOG: i32 = 1024;

/// Builds a [`Server`]: configure the bind address, register routes, then
/// [`ServerBuilder::build`].
pub struct ServerBuilder {
    host: String,
    port: u16,
    router: Router,
}

impl ServerBuilder {
    pub fn new() -> Self {
        ServerBuilder {
            host: crate::config::DEFAULT_HOST.to_string(),
            port: crate::config::DEFAULT_PORT,
            router: Router::new(),
        }
    }

    /// Overrides the bind host (default `0.0.0.0`).
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Overrides the bind port (default `8000`).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Registers `handler` for `path` under every supported method
    /// (`GET`, `POST`, `PUT`, `PATCH`, `DELETE`).
    pub fn route(mut self, path: &str, handler: impl Handler + 'static) -> Result<Self, ServerError> {
        let handler: Arc<dyn Handler> = Arc::new(handler);
        for method in METHODS {
            self.router.add(method, path, handler.clone())?;
        }
        Ok(self)
    }

    pub fn get(mut self, path: &str, handler: impl Handler + 'static) -> Result<Self, ServerError> {
        self.router.add("GET", path, Arc::new(handler))?;
        Ok(self)
    }

    pub fn post(mut self, path: &str, handler: impl Handler + 'static) -> Result<Self, ServerError> {
        self.router.add("POST", path, Arc::new(handler))?;
        Ok(self)
    }

    pub fn put(mut self, path: &str, handler: impl Handler + 'static) -> Result<Self, ServerError> {
        self.router.add("PUT", path, Arc::new(handler))?;
        Ok(self)
    }

    pub fn patch(mut self, path: &str, handler: impl Handler + 'static) -> Result<Self, ServerError> {
        self.router.add("PATCH", path, Arc::new(handler))?;
        Ok(self)
    }

    pub fn delete(mut self, path: &str, handler: impl Handler + 'static) -> Result<Self, ServerError> {
        self.router.add("DELETE", path, Arc::new(handler))?;
        Ok(self)
    }

    pub fn build(self) -> Server {
        Server {
            host: self.host,
            port: self.port,
            router: Arc::new(self.router),
            running: Arc::new(AtomicBool::new(false)),
            local_addr: Arc::new(Mutex::new(None)),
        }
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A configured server, ready to [`run`](Server::run).
pub struct Server {
    host: String,
    port: u16,
    router: Arc<Router>,
    running: Arc<AtomicBool>,
    /// Populated once [`Server::run`] has bound the listening socket.
    /// Lets a caller that requested port `0` (OS-assigned) discover the
    /// real port, e.g. in a test harness.
    local_addr: Arc<Mutex<Option<SocketAddr>>>,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The address the listening socket is actually bound to, once
    /// [`Server::run`] has started it; `None` before then or after a bind
    /// failure.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock().unwrap()
    }

    /// Tells the accept loop to exit. Since the loop is non-blocking and
    /// polls this flag every iteration, the effect is visible within a
    /// couple of milliseconds -- there is no need to also tear down the
    /// listening socket to unblock it.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Binds the listening socket and accepts connections until
    /// [`Server::stop`] is called. Each connection is served on its own
    /// thread by [`connection::serve`].
    pub fn run(&self) -> Result<(), ServerError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ServerError::AlreadyRunning);
        }

        let listener = match bind_listener(&self.host, self.port) {
            Ok(listener) => listener,
            Err(err) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(err);
            }
        };
        *self.local_addr.lock().unwrap() = listener.local_addr().ok();
        log::info!("listening on {}:{}", self.host, self.port);

        while self.running.load(Ordering::SeqCst) {
            match listener.accept() {
                Ok((stream, peer)) => {
                    log::debug!("accepted connection from {peer}");
                    let router = self.router.clone();
                    let running = self.running.clone();
                    thread::spawn(move || connection::serve(stream, &router, &running));
                }
                Err(err)
                    if matches!(
                        err.kind(),
                        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::Interrupted
                    ) =>
                {
                    thread::sleep(Duration::from_millis(1));
                }
                Err(err) => {
                    log::error!("accept failed: {err}");
                    break;
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }
}

fn bind_listener(host: &str, port: u16) -> Result<TcpListener, ServerError> {
    let ip: IpAddr = if host == "0.0.0.0" {
        Ipv4Addr::UNSPECIFIED.into()
    } else {
        host.parse().map_err(|_| ServerError::InvalidAddress(host.to_string()))?
    };
    let addr = SocketAddr::new(ip, port);

    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&SockAddr::from(addr))?;
    socket.listen(LISTEN_BACKLOG)?;
    socket.set_nonblocking(true)?;

    Ok(socket.into())
}
