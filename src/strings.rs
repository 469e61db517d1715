//! Byte/string helpers shared by the request reader, router and response
//! builder: trimming, percent-decoding and `application/x-www-form-urlencoded`
//! parsing.

use crate::ordered_map::OrderedMap;

/// Trims ASCII whitespace from both ends, mirroring `std::isspace` rather
/// than Rust's Unicode-aware [`str::trim`].
pub fn trim(input: &str) -> &str {
    input.trim_matches(|c: char| c.is_ascii_whitespace())
}

/// Percent-decodes `input`, turning `+` into a literal space.
///
/// A `%` not followed by two valid hex digits is **not** an error: it is
/// copied through unchanged and scanning resumes at the very next byte. This
/// matches the permissive behavior of the original decoder it was ported
/// from rather than the stricter RFC 3986 reading, which would reject the
/// escape outright.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() && is_hex(bytes[i + 1]) && is_hex(bytes[i + 2]) => {
                let hi = hex_val(bytes[i + 1]);
                let lo = hex_val(bytes[i + 2]);
                out.push((hi << 4) | lo);
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn is_hex(b: u8) -> bool {
    b.is_ascii_digit() || (b'a'..=b'f').contains(&b.to_ascii_lowercase())
}

fn hex_val(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        _ => 0,
    }
}

/// Parses `a=1&b=2` style bodies (and, by reuse, the `Cookie` header -- the
/// request reader feeds the raw `Cookie` value through this same parser
/// rather than splitting on `;` per RFC 6265, a deliberately preserved
/// deviation; see `SPEC_FULL.md` §A) into an [`OrderedMap`].
///
/// Splits on `&` first, then on the first `=` within each pair. Both key
/// and value are trimmed then percent-decoded. A pair with no `=` is kept
/// with an empty value. Empty segments (`&&`, leading/trailing `&`) are
/// skipped. Later pairs overwrite earlier ones with the same key.
pub fn parse_urlencoded(input: &str) -> OrderedMap<String> {
    let mut map = OrderedMap::new();
    for segment in input.split('&') {
        if segment.is_empty() {
            continue;
        }
        let (key, value) = match segment.find('=') {
            Some(idx) => (&segment[..idx], &segment[idx + 1..]),
            None => (segment, ""),
        };
        let key = percent_decode(trim(key));
        let value = percent_decode(trim(value));
        map.set(key, value);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_strips_ascii_whitespace_only() {
        assert_eq!(trim("  hello \t\r\n"), "hello");
    }

    #[test]
    fn percent_decode_handles_plus_and_escapes() {
        assert_eq!(percent_decode("a+b%20c"), "a b c");
    }

    #[test]
    fn percent_decode_passes_through_malformed_escape_without_eating_next_byte() {
        // "%zz" is not a valid escape: the '%' is kept literally and 'z'
        // is still consumed as its own ordinary character on the next step.
        assert_eq!(percent_decode("100%zz"), "100%zz");
        assert_eq!(percent_decode("50%"), "50%");
        assert_eq!(percent_decode("50%2"), "50%2");
    }

    #[test]
    fn parse_urlencoded_last_write_wins_and_skips_empty_segments() {
        let map = parse_urlencoded("a=1&&b=2&a=3&flag");
        assert_eq!(map.get("a").map(String::as_str), Some("3"));
        assert_eq!(map.get("b").map(String::as_str), Some("2"));
        assert_eq!(map.get("flag").map(String::as_str), Some(""));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn parse_urlencoded_trims_and_decodes_both_sides() {
        let map = parse_urlencoded(" name = John%20Doe ");
        assert_eq!(map.get("name").map(String::as_str), Some("John Doe"));
    }
}
