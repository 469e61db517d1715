//! Per-connection lifecycle (spec.md §4.G).
//!
//! The accept loop in [`crate::server::driver`] hands each accepted socket
//! to [`serve`] on its own thread. From there everything is synchronous:
//! read one request, dispatch it, write the response, and -- if keep-alive
//! allows it -- wait for the next one on the same socket.

use crate::config::{
    HEALTH_CHECK_ENABLED, KEEP_ALIVE_ENABLED, KEEP_ALIVE_TIMEOUT, MAX_KEEP_ALIVE_REQUESTS,
    SERVER_IDENT, SOCKET_TIMEOUT, STATIC_DIR,
};
use crate::handler;
use crate::http::request::{read_request, Request};
use crate::http::response::Response;
use crate::router::Router;
use crate::status::StatusCode;
use std::io::{self, Write};
use std::net::TcpStream;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Longest URI the connection driver will dispatch; anything past it is
/// rejected with 414 before a route lookup is even attempted.
const MAX_URI_LEN: usize = 1024;

pub(crate) fn serve(mut stream: TcpStream, router: &Router, running: &AtomicBool) {
    if KEEP_ALIVE_ENABLED {
        serve_keep_alive(&mut stream, router, running);
    } else {
        serve_once(&mut stream, router);
    }
}

fn serve_once(stream: &mut TcpStream, router: &Router) {
    if stream.set_read_timeout(Some(Duration::from_secs(SOCKET_TIMEOUT))).is_err() {
        return;
    }
    match read_request(stream) {
        Ok(mut request) => {
            let mut response = dispatch(&mut request, router);
            let _ = send(stream, &mut response, &request);
        }
        Err(err) => {
            log::debug!("request read failed: {err}");
            let _ = send_bad_request(stream);
        }
    }
}

fn serve_keep_alive(stream: &mut TcpStream, router: &Router, running: &AtomicBool) {
    let mut last_activity = Instant::now();
    let mut request_count: u32 = 0;

    loop {
        if !running.load(Ordering::Relaxed) {
            return;
        }
        if last_activity.elapsed() >= Duration::from_secs(KEEP_ALIVE_TIMEOUT) {
            return;
        }
        if request_count >= MAX_KEEP_ALIVE_REQUESTS {
            return;
        }

        match wait_readable(stream) {
            Readiness::TimedOut => continue,
            Readiness::Closed => return,
            Readiness::Ready => {}
        }

        if stream.set_read_timeout(Some(Duration::from_secs(SOCKET_TIMEOUT))).is_err() {
            return;
        }

        let mut request = match read_request(stream) {
            Ok(request) => request,
            Err(err) => {
                log::debug!("request read failed: {err}");
                let _ = send_bad_request(stream);
                return;
            }
        };
        last_activity = Instant::now();
        request_count += 1;

        let keep_alive = connection_wants_keep_alive(&request);
        let mut response = dispatch(&mut request, router);
        if !keep_alive {
            response.header("Connection", "close");
        }
        if send(stream, &mut response, &request).is_err() {
            return;
        }
        if !keep_alive {
            return;
        }
    }
}

/// Per spec.md §4.G: the connection continues only if the request's
/// `Connection` header is exactly `keep-alive` (case-insensitively) --
/// there is no implicit HTTP/1.1 default here, unlike RFC 9112. This must
/// stay in lockstep with [`Response::serialize`]'s own `Connection`/
/// `Keep-Alive` defaulting (spec.md §4.E), which makes the identical
/// literal check; if the two diverge, the header a client sees and the
/// decision the driver actually makes disagree.
fn connection_wants_keep_alive(request: &Request) -> bool {
    request.header("connection").map(|v| v.eq_ignore_ascii_case("keep-alive")).unwrap_or(false)
}

enum Readiness {
    Ready,
    TimedOut,
    Closed,
}

/// A one-second single-socket readiness wait: the std-only equivalent of
/// the original's `select()` poll on the keep-alive path. `peek` with a
/// short read timeout tells us whether bytes (or EOF) are waiting without
/// consuming them, so the real read below still sees the full request.
fn wait_readable(stream: &mut TcpStream) -> Readiness {
    if stream.set_read_timeout(Some(Duration::from_secs(1))).is_err() {
        return Readiness::Closed;
    }
    let mut probe = [0u8; 1];
    match stream.peek(&mut probe) {
        Ok(0) => Readiness::Closed,
        Ok(_) => Readiness::Ready,
        Err(err) if matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
            Readiness::TimedOut
        }
        Err(_) => Readiness::Closed,
    }
}

/// Dispatch order (spec.md §4.G): URI length, then the static-file and
/// health-check short-circuits, then the router. A handler panic is caught
/// and turned into a 500, mirroring the original's `catch (const
/// std::exception&)` around the user callback.
fn dispatch(request: &mut Request, router: &Router) -> Response {
    let mut response = Response::new();

    if request.path().len() > MAX_URI_LEN {
        response.status(StatusCode::UriTooLong).body("URI Too Long\n");
        return response;
    }

    if request.method() == "GET" {
        let prefix = format!("/{STATIC_DIR}/");
        if let Some(rest) = request.path().strip_prefix(prefix.as_str()) {
            let file_path = Path::new(STATIC_DIR).join(rest);
            response.send_file(file_path);
            return response;
        }
        if HEALTH_CHECK_ENABLED && request.path() == "/health" {
            response.status(StatusCode::Ok).body("OK\n");
            return response;
        }
    }

    match router.match_route(request.method(), request.path()) {
        Some((route_handler, vars)) => {
            for (name, value) in vars.iter() {
                request.set_path_var(name.clone(), value.clone());
            }
            match catch_unwind(AssertUnwindSafe(|| route_handler.call(request))) {
                Ok(handled) => handler::apply(handled, &mut response),
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    log::error!("handler panicked: {message}");
                    response
                        .status(StatusCode::InternalServerError)
                        .body(format!("Internal Server Error: {message}\n"));
                }
            }
        }
        None if router.method_has_routes(request.method()) => {
            response.status(StatusCode::NotFound).body("Not Found\n");
        }
        None => {
            response.status(StatusCode::MethodNotAllowed).body("Method Not Allowed\n");
        }
    }

    response
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn send(stream: &mut TcpStream, response: &mut Response, request: &Request) -> io::Result<()> {
    let bytes = response.serialize(request);
    write_all_retrying(stream, &bytes)
}

/// Used only when request parsing itself failed, so there is no [`Request`]
/// (and often no confidence in what the peer will send next) to build a
/// real [`Response`] from -- the connection always closes afterward.
fn send_bad_request(stream: &mut TcpStream) -> io::Result<()> {
    let body = b"Bad Request\n";
    let head = format!(
        "HTTP/1.1 400 Bad Request\r\nServer: {SERVER_IDENT}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    let mut bytes = head.into_bytes();
    bytes.extend_from_slice(body);
    write_all_retrying(stream, &bytes)
}

fn write_all_retrying(stream: &mut TcpStream, mut data: &[u8]) -> io::Result<()> {
    while !data.is_empty() {
        match stream.write(data) {
            Ok(0) => return Err(io::Error::new(io::ErrorKind::WriteZero, "failed to write response")),
            Ok(n) => data = &data[n..],
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Handled;
    use crate::http::request::read_request;
    use std::io::Cursor;
    use std::sync::Arc;

    fn request(raw: &[u8]) -> Request {
        read_request(&mut Cursor::new(raw.to_vec())).unwrap()
    }

    #[test]
    fn uri_over_limit_is_414_before_router_is_consulted() {
        let long_path = format!("GET /{} HTTP/1.1\r\n\r\n", "a".repeat(MAX_URI_LEN + 1));
        let mut req = request(long_path.as_bytes());
        let router = Router::new();
        let response = dispatch(&mut req, &router);
        assert_eq!(response.status_code(), StatusCode::UriTooLong);
    }

    #[test]
    fn health_check_short_circuits_before_the_router() {
        let mut req = request(b"GET /health HTTP/1.1\r\n\r\n");
        let router = Router::new();
        let response = dispatch(&mut req, &router);
        assert_eq!(response.status_code(), StatusCode::Ok);
        assert_eq!(response.body_bytes(), b"OK\n");
    }

    #[test]
    fn method_miss_vs_path_miss_are_distinguished() {
        let mut router = Router::new();
        router.add("GET", "/only", Arc::new(|_: &Request| handler::ok("x"))).unwrap();

        let mut miss_path = request(b"GET /nope HTTP/1.1\r\n\r\n");
        assert_eq!(dispatch(&mut miss_path, &router).status_code(), StatusCode::NotFound);

        let mut miss_method = request(b"POST /only HTTP/1.1\r\n\r\n");
        assert_eq!(dispatch(&mut miss_method, &router).status_code(), StatusCode::MethodNotAllowed);
    }

    #[test]
    fn handler_panic_is_caught_and_turned_into_500() {
        let mut router = Router::new();
        router
            .add("GET", "/boom", Arc::new(|_: &Request| -> Handled { panic!("kaboom") }))
            .unwrap();
        let mut req = request(b"GET /boom HTTP/1.1\r\n\r\n");
        let response = dispatch(&mut req, &router);
        assert_eq!(response.status_code(), StatusCode::InternalServerError);
        assert!(String::from_utf8_lossy(response.body_bytes()).contains("kaboom"));
    }

    #[test]
    fn keep_alive_requires_exact_literal_match() {
        let keep = request(b"GET / HTTP/1.1\r\nConnection: keep-alive\r\n\r\n");
        assert!(connection_wants_keep_alive(&keep));

        let close = request(b"GET / HTTP/1.1\r\nConnection: close\r\n\r\n");
        assert!(!connection_wants_keep_alive(&close));

        // No explicit header: per spec.md §4.G this does *not* default to
        // keep-alive, matching the serializer's own default.
        let bare = request(b"GET / HTTP/1.1\r\n\r\n");
        assert!(!connection_wants_keep_alive(&bare));
    }
}
