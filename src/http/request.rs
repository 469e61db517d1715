//! The parsed request type and the byte-stream reader that produces it.

use crate::config::{BUFFER_SIZE, MAX_REQUEST_SIZE};
use crate::errors::ErrorKind;
use crate::http::multipart;
use crate::ordered_map::{HeaderMap, OrderedMap};
use crate::strings::{parse_urlencoded, trim};
use crate::upload::UploadedFile;
use std::io::Read;

/// A fully parsed HTTP/1.1 request.
///
/// Constructed once per request by [`read_request`] and treated as
/// read-only by handlers, except for the path-variable bag, which the
/// router populates after a successful pattern match.
#[derive(Debug)]
pub struct Request {
    method: String,
    path: String,
    version: String,
    headers: HeaderMap,
    params: OrderedMap<String>,
    forms: OrderedMap<String>,
    files: OrderedMap<UploadedFile>,
    json: serde_json::Value,
    cookies: OrderedMap<String>,
    body: Vec<u8>,
    path_vars: OrderedMap<String>,
}

impl Request {
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The request path with any query string already stripped.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn query_params(&self) -> &OrderedMap<String> {
        &self.params
    }

    pub fn form(&self, name: &str) -> Option<&str> {
        self.forms.get(name).map(String::as_str)
    }

    pub fn forms(&self) -> &OrderedMap<String> {
        &self.forms
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }

    pub fn files(&self) -> &OrderedMap<UploadedFile> {
        &self.files
    }

    /// Parsed JSON body, or `Value::Null` if the body was not
    /// `application/json`, was empty, or failed to parse.
    pub fn json(&self) -> &serde_json::Value {
        &self.json
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Path variable captured by a pattern route, as a string.
    pub fn path_var(&self, name: &str) -> Option<&str> {
        self.path_vars.get(name).map(String::as_str)
    }

    /// Path variable captured by a pattern route, parsed as a decimal
    /// integer. `None` both when the variable is absent and when it fails
    /// to parse -- the distinction, if it matters, is the handler's to make
    /// by also checking [`Request::path_var`].
    pub fn path_var_int(&self, name: &str) -> Option<i64> {
        self.path_vars.get(name)?.parse().ok()
    }

    pub(crate) fn set_path_var(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.path_vars.set(name, value);
    }
}

/// Reads and parses a single HTTP/1.1 request off `stream`.
///
/// Does not set a socket read timeout itself -- the connection driver sets
/// `SO_RCVTIMEO` before calling this, per §4.D.1.
pub fn read_request<R: Read>(stream: &mut R) -> Result<Request, ErrorKind> {
    let mut buf = Vec::with_capacity(BUFFER_SIZE);
    let header_end = read_until_header_end(stream, &mut buf)?;

    let header_block = &buf[..header_end];
    let mut lines = header_block.split(|&b| b == b'\n').map(strip_cr);

    let request_line = lines.next().ok_or(ErrorKind::InvalidRequestLine)?;
    let (method, target, version) = parse_request_line(request_line)?;

    let mut headers = HeaderMap::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        let text = simdutf8::basic::from_utf8(line).map_err(|_| ErrorKind::InvalidHeader)?;
        if let Some((key, value)) = text.split_once(':') {
            headers.set(trim(key).to_string(), trim(value).to_string());
        }
        // A header line with no colon is silently skipped, per §4.D.3.
    }

    let body_start = header_end + 4;
    let body = read_body(stream, &mut buf, body_start, &headers)?;

    let (path, query_string) = split_target(&target);
    let params = query_string.map(parse_urlencoded).unwrap_or_default();

    let content_type = headers.get("content-type").unwrap_or("").to_string();
    let lower_ct = content_type.to_ascii_lowercase();

    let mut forms = OrderedMap::new();
    let mut files = OrderedMap::new();
    if lower_ct.starts_with("application/x-www-form-urlencoded") {
        forms = parse_urlencoded(&String::from_utf8_lossy(&body));
    } else if let Some(boundary) = multipart::boundary_from_content_type(&content_type) {
        let decoded = multipart::parse(&body, &boundary);
        forms = decoded.forms;
        files = decoded.files;
    }

    let json = if lower_ct == "application/json" && !body.is_empty() {
        serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
    } else {
        serde_json::Value::Null
    };

    // Reference behavior reuses the `&`-splitting urlencoded parser for
    // cookies rather than RFC 6265's `;`-splitting -- see SPEC_FULL §A.
    let cookies = headers
        .get("cookie")
        .map(parse_urlencoded)
        .unwrap_or_default();

    Ok(Request {
        method,
        path,
        version,
        headers,
        params,
        forms,
        files,
        json,
        cookies,
        body,
        path_vars: OrderedMap::new(),
    })
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn parse_request_line(line: &[u8]) -> Result<(String, String, String), ErrorKind> {
    let text = simdutf8::basic::from_utf8(line).map_err(|_| ErrorKind::InvalidRequestLine)?;
    let tokens: Vec<&str> = text.split_ascii_whitespace().collect();
    if tokens.len() != 3 {
        return Err(ErrorKind::InvalidRequestLine);
    }
    Ok((tokens[0].to_string(), tokens[1].to_string(), tokens[2].to_string()))
}

fn split_target(target: &str) -> (String, Option<&str>) {
    match target.find('?') {
        Some(idx) => (target[..idx].to_string(), Some(&target[idx + 1..])),
        None => (target.to_string(), None),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    memchr::memmem::find(haystack, needle)
}

/// Reads from `stream` into `buf` until `"\r\n\r\n"` is seen, returning the
/// index where it starts. Fails if `MAX_REQUEST_SIZE` is exceeded first or
/// the peer closes the connection before sending a full header block.
fn read_until_header_end<R: Read>(stream: &mut R, buf: &mut Vec<u8>) -> Result<usize, ErrorKind> {
    loop {
        if let Some(idx) = find(buf, b"\r\n\r\n") {
            return Ok(idx);
        }
        if buf.len() >= MAX_REQUEST_SIZE {
            return Err(ErrorKind::HeadersTooLarge);
        }
        read_more(stream, buf)?;
    }
}

fn read_more<R: Read>(stream: &mut R, buf: &mut Vec<u8>) -> Result<(), ErrorKind> {
    let mut chunk = [0u8; BUFFER_SIZE];
    let n = stream.read(&mut chunk)?;
    if n == 0 {
        return Err(ErrorKind::InvalidRequestLine);
    }
    buf.extend_from_slice(&chunk[..n]);
    Ok(())
}

/// Reads `buf` (refilling from `stream` as needed) until it holds at least
/// `needed` bytes, enforcing `MAX_REQUEST_SIZE` as an overall cap.
fn ensure_len<R: Read>(stream: &mut R, buf: &mut Vec<u8>, needed: usize) -> Result<(), ErrorKind> {
    if needed > MAX_REQUEST_SIZE {
        return Err(ErrorKind::BodyTooLarge);
    }
    while buf.len() < needed {
        read_more(stream, buf)?;
    }
    Ok(())
}

fn read_body<R: Read>(
    stream: &mut R,
    buf: &mut Vec<u8>,
    body_start: usize,
    headers: &HeaderMap,
) -> Result<Vec<u8>, ErrorKind> {
    let is_chunked = headers
        .get("transfer-encoding")
        .map(|v| v.to_ascii_lowercase().contains("chunked"))
        .unwrap_or(false);

    if is_chunked {
        return read_chunked_body(stream, buf, body_start);
    }

    if let Some(len_str) = headers.get("content-length") {
        let len: usize = len_str.trim().parse().map_err(|_| ErrorKind::InvalidContentLength)?;
        if len > MAX_REQUEST_SIZE {
            return Err(ErrorKind::BodyTooLarge);
        }
        ensure_len(stream, buf, body_start + len)?;
        return Ok(buf[body_start..body_start + len].to_vec());
    }

    Ok(Vec::new())
}

/// Decodes a chunked body starting at `cursor` in `buf`, pulling more bytes
/// from `stream` as needed. This is the single chunked decoder: bytes
/// already buffered past the header terminator and bytes subsequently read
/// from the socket are treated as one continuous stream, so there is no
/// separate "replay the header buffer" step that could double-count or
/// drop a chunk boundary that spilled across a `read()` call.
fn read_chunked_body<R: Read>(
    stream: &mut R,
    buf: &mut Vec<u8>,
    mut cursor: usize,
) -> Result<Vec<u8>, ErrorKind> {
    const MAX_CHUNK_HEADER_LEN: usize = 1024;
    let mut out = Vec::new();

    loop {
        let line_end = loop {
            if let Some(idx) = find(&buf[cursor..], b"\r\n") {
                break cursor + idx;
            }
            if buf.len() - cursor > MAX_CHUNK_HEADER_LEN {
                return Err(ErrorKind::InvalidContentLength);
            }
            read_more(stream, buf)?;
        };
        if line_end - cursor > MAX_CHUNK_HEADER_LEN {
            return Err(ErrorKind::InvalidContentLength);
        }

        let line = simdutf8::basic::from_utf8(&buf[cursor..line_end]).map_err(|_| ErrorKind::InvalidContentLength)?;
        let size_str = line.split(';').next().unwrap_or("").trim();
        let size = usize::from_str_radix(size_str, 16).map_err(|_| ErrorKind::InvalidContentLength)?;
        cursor = line_end + 2;

        if size == 0 {
            ensure_len(stream, buf, cursor + 2)?;
            break;
        }

        if out.len() + size > MAX_REQUEST_SIZE {
            return Err(ErrorKind::BodyTooLarge);
        }

        ensure_len(stream, buf, cursor + size + 2)?;
        out.extend_from_slice(&buf[cursor..cursor + size]);
        cursor += size + 2;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_simple_get_with_query() {
        let raw = b"GET /search?q=rust HTTP/1.1\r\nHost: x\r\n\r\n";
        let req = read_request(&mut Cursor::new(raw.to_vec())).unwrap();
        assert_eq!(req.method(), "GET");
        assert_eq!(req.path(), "/search");
        assert_eq!(req.query("q"), Some("rust"));
        assert_eq!(req.body(), b"");
    }

    #[test]
    fn content_length_body_delivered_exactly() {
        let raw = b"POST /x HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
        let req = read_request(&mut Cursor::new(raw.to_vec())).unwrap();
        assert_eq!(req.body(), b"hello");
    }

    #[test]
    fn chunked_body_concatenates_chunk_payloads() {
        let raw = b"POST /test-chunked HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n";
        let req = read_request(&mut Cursor::new(raw.to_vec())).unwrap();
        assert_eq!(req.body(), b"hello world");
    }

    #[test]
    fn chunked_body_survives_a_read_boundary_spilling_mid_chunk() {
        // Simulate the socket delivering the chunk payload split across
        // two read() calls, right in the middle of the chunk bytes.
        struct Slow {
            chunks: Vec<Vec<u8>>,
        }
        impl Read for Slow {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if self.chunks.is_empty() {
                    return Ok(0);
                }
                let next = self.chunks.remove(0);
                buf[..next.len()].copy_from_slice(&next);
                Ok(next.len())
            }
        }
        let mut stream = Slow {
            chunks: vec![
                b"POST /t HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhel".to_vec(),
                b"lo\r\n0\r\n\r\n".to_vec(),
            ],
        };
        let req = read_request(&mut stream).unwrap();
        assert_eq!(req.body(), b"hello");
    }

    #[test]
    fn form_urlencoded_body_populates_forms() {
        let raw = b"POST /submit-data HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 25\r\n\r\nname=John&email=john@x.io";
        let req = read_request(&mut Cursor::new(raw.to_vec())).unwrap();
        assert_eq!(req.form("name"), Some("John"));
        assert_eq!(req.form("email"), Some("john@x.io"));
    }

    #[test]
    fn invalid_json_body_leaves_json_null_without_failing() {
        let raw = b"POST /x HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: 9\r\n\r\nnot-json!";
        let req = read_request(&mut Cursor::new(raw.to_vec())).unwrap();
        assert!(req.json().is_null());
    }

    #[test]
    fn cookie_header_is_split_on_ampersand_like_urlencoded_forms() {
        let raw = b"GET /x HTTP/1.1\r\nCookie: a=1&b=2\r\n\r\n";
        let req = read_request(&mut Cursor::new(raw.to_vec())).unwrap();
        assert_eq!(req.cookie("a"), Some("1"));
        assert_eq!(req.cookie("b"), Some("2"));
    }

    #[test]
    fn malformed_request_line_fails() {
        let raw = b"GET\r\n\r\n";
        let err = read_request(&mut Cursor::new(raw.to_vec())).unwrap_err();
        assert!(matches!(err, ErrorKind::InvalidRequestLine));
    }

    #[test]
    fn multipart_body_populates_forms_and_files() {
        let body = "--B\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nhi\r\n--B--\r\n";
        let raw = format!(
            "POST /x HTTP/1.1\r\nContent-Type: multipart/form-data; boundary=B\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let req = read_request(&mut Cursor::new(raw.into_bytes())).unwrap();
        assert_eq!(req.form("title"), Some("hi"));
    }
}
