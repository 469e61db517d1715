//! The mutable response object handlers build up, and its serialization to
//! HTTP/1.1 wire bytes.

use crate::config::{KEEP_ALIVE_TIMEOUT, MAX_KEEP_ALIVE_REQUESTS, SERVER_IDENT, TEMPLATE_DIR};
use crate::gzip;
use crate::http::request::Request;
use crate::mime;
use crate::ordered_map::HeaderMap;
use crate::status::StatusCode;
use std::fs;
use std::io;
use std::path::Path;

/// Optional clauses for [`Response::set_cookie`]. Each field that is
/// "inapplicable" (empty path, non-positive `max_age`, `false` flags) is
/// simply omitted from the `Set-Cookie` string rather than emitted empty.
#[derive(Debug, Clone)]
pub struct CookieOptions {
    pub path: String,
    pub max_age: i64,
    pub secure: bool,
    pub http_only: bool,
}

impl Default for CookieOptions {
    fn default() -> Self {
        CookieOptions {
            path: "/".to_string(),
            max_age: 0,
            secure: false,
            http_only: false,
        }
    }
}

/// A response under construction. Created with status 200 and the
/// `Server` identity header already set; handlers mutate it through the
/// fluent setters below, and the connection driver serializes it once the
/// handler returns.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Response {
    pub fn new() -> Self {
        let mut headers = HeaderMap::new();
        headers.set("Server", SERVER_IDENT);
        Response { status: StatusCode::Ok, headers, body: Vec::new() }
    }

    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Overwrites `name` (last write wins), except `Set-Cookie`, which
    /// should go through [`Response::set_cookie`] instead.
    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.set(name, value);
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&mut self, body: impl Into<Vec<u8>>) -> &mut Self {
        self.body = body.into();
        self
    }

    pub fn body_bytes(&self) -> &[u8] {
        &self.body
    }

    /// Serializes `value` as the body and forces `Content-Type: application/json`.
    pub fn json(&mut self, value: &serde_json::Value) -> &mut Self {
        self.body = serde_json::to_vec(value).unwrap_or_default();
        self.headers.set("Content-Type", "application/json");
        self
    }

    /// Adds or replaces a `Set-Cookie` entry for `name`. If an existing
    /// `Set-Cookie` entry's value starts with `"{name}="`, it is replaced
    /// in place; otherwise the new cookie is appended. Every other
    /// `Set-Cookie` entry is left untouched -- this header is the one slot
    /// that may carry more than one value at a time.
    pub fn set_cookie(&mut self, name: &str, value: &str, opts: CookieOptions) -> &mut Self {
        let mut cookie = format!("{name}={value}");
        if !opts.path.is_empty() {
            cookie.push_str(&format!("; Path={}", opts.path));
        }
        if opts.max_age > 0 {
            cookie.push_str(&format!("; Max-Age={}", opts.max_age));
        }
        if opts.secure {
            cookie.push_str("; Secure");
        }
        if opts.http_only {
            cookie.push_str("; HttpOnly");
        }

        let prefix = format!("{name}=");
        let existing: Vec<String> = self.headers.get_all("Set-Cookie").map(String::from).collect();
        let mut replaced = false;
        let mut rebuilt = Vec::with_capacity(existing.len() + 1);
        for entry in existing {
            if !replaced && entry.starts_with(&prefix) {
                rebuilt.push(cookie.clone());
                replaced = true;
            } else {
                rebuilt.push(entry);
            }
        }
        if !replaced {
            rebuilt.push(cookie);
        }

        self.headers.remove_all("Set-Cookie");
        for entry in rebuilt {
            self.headers.append("Set-Cookie", entry);
        }
        self
    }

    /// Sets `Location: location` and the given status (default 302 Found).
    pub fn redirect(&mut self, location: &str, status: Option<StatusCode>) -> &mut Self {
        self.header("Location", location);
        self.status(status.unwrap_or(StatusCode::Found))
    }

    /// Reads `TEMPLATE_DIR/name` into the body and sets
    /// `Content-Type: text/html`. A missing or unreadable file is an error
    /// -- left to the caller to propagate (typically by panicking, which
    /// the connection driver turns into a 500 with the error text as body,
    /// matching the original template-not-found failure path).
    pub fn render_template(&mut self, name: &str) -> io::Result<&mut Self> {
        let path = Path::new(TEMPLATE_DIR).join(name);
        let content = fs::read(&path)?;
        self.body = content;
        self.headers.set("Content-Type", "text/html");
        Ok(self)
    }

    /// Serves the file at `full_path`. A missing file is not an error: it
    /// sets 404 with body `"Not Found\n"`. An unreadable file (permissions,
    /// races) sets 500 with the error text as body. Otherwise the body is
    /// the file's bytes and `Content-Type` is sniffed via [`mime::sniff`].
    pub fn send_file(&mut self, full_path: impl AsRef<Path>) -> &mut Self {
        let full_path = full_path.as_ref();
        if !full_path.exists() {
            self.status(StatusCode::NotFound);
            self.body(b"Not Found\n".to_vec());
            return self;
        }
        match fs::read(full_path) {
            Ok(content) => {
                let content_type = mime::sniff(&content);
                self.body(content);
                self.header("Content-Type", content_type);
            }
            Err(err) => {
                self.status(StatusCode::InternalServerError);
                self.body(format!("{err}\n").into_bytes());
            }
        }
        self
    }

    pub fn ok(&mut self, text: impl Into<Vec<u8>>) -> &mut Self {
        self.status(StatusCode::Ok).body(text)
    }

    pub fn created(&mut self, text: impl Into<Vec<u8>>) -> &mut Self {
        self.status(StatusCode::Created).body(text)
    }

    pub fn bad_request(&mut self, text: impl Into<Vec<u8>>) -> &mut Self {
        self.status(StatusCode::BadRequest).body(text)
    }

    pub fn not_found(&mut self, text: impl Into<Vec<u8>>) -> &mut Self {
        self.status(StatusCode::NotFound).body(text)
    }

    pub fn method_not_allowed(&mut self, text: impl Into<Vec<u8>>) -> &mut Self {
        self.status(StatusCode::MethodNotAllowed).body(text)
    }

    pub fn internal_server_error(&mut self, text: impl Into<Vec<u8>>) -> &mut Self {
        self.status(StatusCode::InternalServerError).body(text)
    }

    pub fn not_implemented(&mut self, text: impl Into<Vec<u8>>) -> &mut Self {
        self.status(StatusCode::NotImplemented).body(text)
    }

    /// Applies the compression pre-pass and serializes the full HTTP/1.1
    /// response: status line, headers, blank line, body.
    pub fn serialize(&mut self, request: &Request) -> Vec<u8> {
        self.compress_if_eligible(request);

        let keep_alive = request.header("connection").map(|v| v.eq_ignore_ascii_case("keep-alive")).unwrap_or(false);

        let mut out = Vec::with_capacity(256 + self.body.len());
        out.extend_from_slice(format!("HTTP/1.1 {}\r\n", self.status.status_line_tail()).as_bytes());

        let mut wrote_content_length = false;
        for (name, value) in self.headers.iter() {
            if name.eq_ignore_ascii_case("content-length") {
                wrote_content_length = true;
            }
            out.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
        }
        if !wrote_content_length {
            out.extend_from_slice(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());
        }

        if keep_alive {
            out.extend_from_slice(b"Connection: keep-alive\r\n");
            out.extend_from_slice(
                format!("Keep-Alive: timeout={KEEP_ALIVE_TIMEOUT}, max={MAX_KEEP_ALIVE_REQUESTS}\r\n").as_bytes(),
            );
        } else {
            out.extend_from_slice(b"Connection: close\r\n");
        }

        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        out
    }

    fn compress_if_eligible(&mut self, request: &Request) {
        if self.headers.has("Content-Encoding") {
            return;
        }
        if self.body.len() <= 1024 {
            return;
        }
        let accepts_gzip = request.header("accept-encoding").map(|v| v.contains("gzip")).unwrap_or(false);
        if !accepts_gzip {
            return;
        }
        let content_type = self.headers.get("Content-Type").unwrap_or("");
        if !should_compress(content_type) {
            return;
        }
        if let Ok(compressed) = gzip::compress(&self.body) {
            if compressed.len() < self.body.len() {
                self.body = compressed;
                self.headers.set("Content-Encoding", "gzip");
            }
        }
    }
}

impl Default for Response {
    fn default() -> Self {
        Response::new()
    }
}

fn should_compress(content_type: &str) -> bool {
    content_type.contains("text/")
        || content_type.contains("application/json")
        || content_type.contains("application/javascript")
        || content_type.contains("application/xml")
        || content_type.contains("application/x-www-form-urlencoded")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::read_request;
    use std::io::Cursor;

    fn request(raw: &[u8]) -> Request {
        read_request(&mut Cursor::new(raw.to_vec())).unwrap()
    }

    #[test]
    fn defaults_include_server_header_and_ok_status() {
        let resp = Response::new();
        assert_eq!(resp.status_code(), StatusCode::Ok);
        assert_eq!(resp.headers().get("server"), Some(SERVER_IDENT));
    }

    #[test]
    fn set_cookie_replaces_same_name_in_place() {
        let mut resp = Response::new();
        resp.set_cookie("session", "v1", CookieOptions::default());
        resp.set_cookie("other", "x", CookieOptions::default());
        resp.set_cookie("session", "v2", CookieOptions::default());
        let cookies: Vec<&str> = resp.headers().get_all("Set-Cookie").collect();
        assert_eq!(cookies.len(), 2);
        assert!(cookies[0].starts_with("session=v2"));
        assert!(cookies[1].starts_with("other=x"));
    }

    #[test]
    fn serialize_sets_content_length_and_connection_close_by_default() {
        let req = request(b"GET / HTTP/1.1\r\n\r\n");
        let mut resp = Response::new();
        resp.ok("Hello, World!");
        let bytes = resp.serialize(&req);
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Length: 13\r\n"));
        assert!(text.contains("Connection: close\r\n"));
        assert!(text.ends_with("Hello, World!"));
    }

    #[test]
    fn serialize_echoes_keep_alive_with_timeout_and_max() {
        let req = request(b"GET / HTTP/1.1\r\nConnection: keep-alive\r\n\r\n");
        let mut resp = Response::new();
        resp.ok("hi");
        let text = String::from_utf8(resp.serialize(&req)).unwrap();
        assert!(text.contains("Connection: keep-alive\r\n"));
        assert!(text.contains("Keep-Alive: timeout=5, max=100\r\n"));
    }

    #[test]
    fn compression_only_adopted_when_strictly_smaller() {
        let req = request(b"GET / HTTP/1.1\r\nAccept-Encoding: gzip\r\n\r\n");
        let mut resp = Response::new();
        resp.status(StatusCode::Ok);
        resp.header("Content-Type", "text/plain");
        resp.body(vec![b'a'; 2048]);
        let bytes = resp.serialize(&req);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("Content-Encoding: gzip"));
    }

    #[test]
    fn small_body_is_never_compressed() {
        let req = request(b"GET / HTTP/1.1\r\nAccept-Encoding: gzip\r\n\r\n");
        let mut resp = Response::new();
        resp.header("Content-Type", "text/plain");
        resp.body("short");
        let text = String::from_utf8(resp.serialize(&req)).unwrap();
        assert!(!text.contains("Content-Encoding"));
    }

    #[test]
    fn send_file_reports_not_found_without_failing() {
        let mut resp = Response::new();
        resp.send_file("/no/such/file/anywhere");
        assert_eq!(resp.status_code(), StatusCode::NotFound);
        assert_eq!(resp.body_bytes(), b"Not Found\n");
    }

    #[test]
    fn send_file_sniffs_mime_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        std::fs::write(&path, [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]).unwrap();
        let mut resp = Response::new();
        resp.send_file(&path);
        assert_eq!(resp.headers().get("content-type"), Some("image/png"));
    }
}
