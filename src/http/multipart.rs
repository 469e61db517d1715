//! `multipart/form-data` body decoding.

use crate::ordered_map::OrderedMap;
use crate::upload::UploadedFile;

/// Extracts the `boundary=` parameter from a `Content-Type` header value.
/// Returns `None` if the header doesn't look like `multipart/form-data`
/// with a boundary.
pub fn boundary_from_content_type(content_type: &str) -> Option<String> {
    let lower = content_type.to_ascii_lowercase();
    if !lower.starts_with("multipart/form-data") {
        return None;
    }
    for part in content_type.split(';').skip(1) {
        let part = part.trim();
        if let Some(rest) = part.strip_prefix("boundary=") {
            return Some(rest.trim_matches('"').to_string());
        }
    }
    None
}

/// The result of decoding a multipart body: form fields and uploaded files,
/// both keyed by the part's `name` attribute.
#[derive(Debug, Default)]
pub struct MultipartBody {
    pub forms: OrderedMap<String>,
    pub files: OrderedMap<UploadedFile>,
}

/// Decodes `body` against `boundary`. If the body doesn't begin with the
/// opening boundary line, yields an empty result rather than failing the
/// request.
pub fn parse(body: &[u8], boundary: &str) -> MultipartBody {
    let mut out = MultipartBody::default();

    let opening = format!("--{boundary}\r\n");
    if !body.starts_with(opening.as_bytes()) {
        return out;
    }

    let delimiter = format!("\r\n--{boundary}");
    let mut cursor = opening.len();

    loop {
        let header_end = match find(&body[cursor..], b"\r\n\r\n") {
            Some(idx) => cursor + idx,
            None => break,
        };
        let headers_blob = &body[cursor..header_end];
        let data_start = header_end + 4;

        let next_delim = match find(&body[data_start..], delimiter.as_bytes()) {
            Some(idx) => data_start + idx,
            None => break,
        };
        let data = &body[data_start..next_delim];

        if let Some((name, filename, content_type)) = parse_content_disposition(headers_blob) {
            if let Some(filename) = filename {
                out.files.set(
                    name.clone(),
                    UploadedFile::new(
                        name,
                        filename,
                        content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
                        data.to_vec(),
                    ),
                );
            } else {
                out.forms.set(name, String::from_utf8_lossy(data).into_owned());
            }
        }

        let after_delim = next_delim + delimiter.len();
        // Closing boundary is "--" immediately after the delimiter.
        if body[after_delim..].starts_with(b"--") {
            break;
        }
        // Otherwise a bare "\r\n" separates this delimiter from the next part's headers.
        match find(&body[after_delim..], b"\r\n") {
            Some(idx) => cursor = after_delim + idx + 2,
            None => break,
        }
    }

    out
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    memchr::memmem::find(haystack, needle)
}

/// Parses a part's header block, pulling `name`, `filename` and
/// `Content-Type` out of its `Content-Disposition` line.
fn parse_content_disposition(headers_blob: &[u8]) -> Option<(String, Option<String>, Option<String>)> {
    let text = String::from_utf8_lossy(headers_blob);
    let mut name = None;
    let mut filename = None;
    let mut content_type = None;

    for line in text.split("\r\n") {
        let (key, value) = line.split_once(':')?;
        let key = key.trim();
        let value = value.trim();
        if key.eq_ignore_ascii_case("content-disposition") {
            for token in value.split(';').skip(1) {
                let token = token.trim();
                if let Some((k, v)) = token.split_once('=') {
                    let v = v.trim().trim_matches('"');
                    match k.trim() {
                        "name" => name = Some(v.to_string()),
                        "filename" => filename = Some(v.to_string()),
                        _ => {}
                    }
                }
            }
        } else if key.eq_ignore_ascii_case("content-type") {
            content_type = Some(value.to_string());
        }
    }

    name.map(|name| (name, filename, content_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_extraction() {
        let ct = "multipart/form-data; boundary=----WebKitFormBoundaryXYZ";
        assert_eq!(
            boundary_from_content_type(ct).as_deref(),
            Some("----WebKitFormBoundaryXYZ")
        );
        assert_eq!(boundary_from_content_type("application/json"), None);
    }

    #[test]
    fn parses_field_and_file_parts() {
        let boundary = "B";
        let body = format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"title\"\r\n\r\n\
             hello\r\n\
             --{b}\r\n\
             Content-Disposition: form-data; name=\"avatar\"; filename=\"a.png\"\r\n\
             Content-Type: image/png\r\n\r\n\
             \x89PNG\r\n\
             --{b}--\r\n",
            b = boundary
        );
        let parsed = parse(body.as_bytes(), boundary);
        assert_eq!(parsed.forms.get("title").map(String::as_str), Some("hello"));
        let file = parsed.files.get("avatar").unwrap();
        assert_eq!(file.filename(), "a.png");
        assert_eq!(file.content_type(), "image/png");
        assert_eq!(file.data(), b"\x89PNG");
    }

    #[test]
    fn malformed_opening_yields_empty_result() {
        let parsed = parse(b"not a multipart body", "B");
        assert!(parsed.forms.is_empty());
        assert!(parsed.files.is_empty());
    }
}
