//! Route table and pattern matcher: method + path -> handler.
//!
//! Each method (`GET`, `POST`, `PUT`, `PATCH`, `DELETE`) owns two ordered
//! collections: an exact-path map (O(1) lookup) and a list of compiled
//! [`Pattern`] routes, tried in order. `route(path, handler)` registers the
//! same handler under all five methods; `get`/`post`/`put`/`patch`/`delete`
//! register it under one.

use crate::errors::ServerError;
use crate::handler::Handler;
use crate::ordered_map::OrderedMap;
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) const METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamType {
    Str,
    Int,
}

#[derive(Debug)]
enum Segment {
    Literal(String),
    Capture { name: String, kind: ParamType },
}

/// A compiled `{name}` / `{name:type}` route template.
///
/// Unlike the original's `std::regex`-backed matcher, this walks the
/// template's alternating literal/capture segments directly -- there is no
/// separate regex compilation step, but the match semantics (greedy capture
/// with backtracking so a literal suffix can still anchor) are the same as
/// `^...$` against `([^/]+)` / `([0-9]+)` groups.
#[derive(Debug)]
struct Pattern {
    template: String,
    segments: Vec<Segment>,
    /// Length of the template's leading literal run (0 if it starts with a
    /// capture). Used to order pattern routes deterministically -- see
    /// `Router::add`.
    prefix_len: usize,
}

fn invalid(template: &str, reason: impl Into<String>) -> ServerError {
    ServerError::InvalidRoutePattern { pattern: template.to_string(), reason: reason.into() }
}

fn is_valid_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

impl Pattern {
    fn compile(template: &str) -> Result<Self, ServerError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut pos = 0usize;

        while pos < template.len() {
            let rest = &template[pos..];
            if let Some(after_brace) = rest.strip_prefix('{') {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                let end_rel = after_brace
                    .find('}')
                    .ok_or_else(|| invalid(template, "unclosed parameter bracket"))?;
                let param = &after_brace[..end_rel];
                let (name, kind_str) = match param.split_once(':') {
                    Some((n, t)) => (n, t),
                    None => (param, "string"),
                };
                if !is_valid_var_name(name) {
                    return Err(invalid(template, format!("invalid variable name: {name}")));
                }
                let kind = match kind_str {
                    "string" => ParamType::Str,
                    "int" => ParamType::Int,
                    other => return Err(invalid(template, format!("unsupported variable type: {other}"))),
                };
                segments.push(Segment::Capture { name: name.to_string(), kind });
                pos += 1 + end_rel + 1;
            } else {
                let ch = rest.chars().next().expect("pos < template.len()");
                literal.push(ch);
                pos += ch.len_utf8();
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        let prefix_len = match segments.first() {
            Some(Segment::Literal(lit)) => lit.len(),
            _ => 0,
        };

        Ok(Pattern { template: template.to_string(), segments, prefix_len })
    }

    fn matches(&self, path: &str) -> Option<Vec<(String, String)>> {
        let mut vars = Vec::new();
        if match_segments(&self.segments, path, &mut vars) {
            Some(vars)
        } else {
            None
        }
    }
}

fn match_segments(segments: &[Segment], path: &str, vars: &mut Vec<(String, String)>) -> bool {
    match_from(segments, 0, path, 0, vars)
}

fn match_from(segments: &[Segment], seg_idx: usize, path: &str, cursor: usize, vars: &mut Vec<(String, String)>) -> bool {
    let Some(segment) = segments.get(seg_idx) else {
        return cursor == path.len();
    };
    match segment {
        Segment::Literal(lit) => {
            path[cursor..].starts_with(lit.as_str()) && match_from(segments, seg_idx + 1, path, cursor + lit.len(), vars)
        }
        Segment::Capture { name, kind } => {
            let rest = &path[cursor..];
            let max_len = match kind {
                ParamType::Int => rest.bytes().take_while(u8::is_ascii_digit).count(),
                ParamType::Str => rest.bytes().take_while(|&b| b != b'/').count(),
            };
            // Greedy with backtracking: try the longest candidate first so a
            // literal suffix later in the pattern can still anchor. `len` is
            // a raw byte count, not necessarily a char boundary (the path is
            // never percent-decoded before reaching the router, and non-ASCII
            // bytes are valid here), so `rest.get(..len)` rather than
            // `&rest[..len]` to skip lengths that land mid-character instead
            // of panicking.
            for len in (1..=max_len).rev() {
                let Some(value) = rest.get(..len) else {
                    continue;
                };
                if *kind == ParamType::Int && value.parse::<i64>().is_err() {
                    continue;
                }
                let mark = vars.len();
                vars.push((name.clone(), value.to_string()));
                if match_from(segments, seg_idx + 1, path, cursor + len, vars) {
                    return true;
                }
                vars.truncate(mark);
            }
            false
        }
    }
}

struct PatternRoute {
    pattern: Pattern,
    handler: Arc<dyn Handler>,
}

/// Method + path -> handler table, with typed path-variable capture.
#[derive(Default)]
pub struct Router {
    exact: HashMap<String, HashMap<String, Arc<dyn Handler>>>,
    patterns: HashMap<String, Vec<PatternRoute>>,
}

impl Router {
    pub fn new() -> Self {
        Router { exact: HashMap::new(), patterns: HashMap::new() }
    }

    /// Registers `handler` for `method` and `path`. `path` containing a `{`
    /// is compiled as a pattern route; otherwise it is an exact-path route.
    pub(crate) fn add(&mut self, method: &str, path: &str, handler: Arc<dyn Handler>) -> Result<(), ServerError> {
        if path.contains('{') {
            let pattern = Pattern::compile(path)?;
            let list = self.patterns.entry(method.to_string()).or_default();
            list.push(PatternRoute { pattern, handler });
            // Stable sort: longest literal prefix first, ties keep
            // registration order (spec.md §9 resolved open question).
            list.sort_by(|a, b| b.pattern.prefix_len.cmp(&a.pattern.prefix_len));
        } else {
            self.exact.entry(method.to_string()).or_default().insert(path.to_string(), handler);
        }
        Ok(())
    }

    pub(crate) fn method_has_routes(&self, method: &str) -> bool {
        self.exact.get(method).is_some_and(|m| !m.is_empty()) || self.patterns.get(method).is_some_and(|p| !p.is_empty())
    }

    /// Exact match first, then the method's patterns in registration-aware
    /// order; the first full match wins.
    pub(crate) fn match_route(&self, method: &str, path: &str) -> Option<(Arc<dyn Handler>, OrderedMap<String>)> {
        if let Some(handler) = self.exact.get(method).and_then(|m| m.get(path)) {
            return Some((handler.clone(), OrderedMap::new()));
        }
        let list = self.patterns.get(method)?;
        for route in list {
            if let Some(vars) = route.pattern.matches(path) {
                let mut map = OrderedMap::new();
                for (name, value) in vars {
                    map.set(name, value);
                }
                return Some((route.handler.clone(), map));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler;

    fn dummy() -> Arc<dyn Handler> {
        Arc::new(|_: &crate::http::request::Request| handler::ok("x"))
    }

    #[test]
    fn exact_route_matches_byte_for_byte() {
        let mut router = Router::new();
        router.add("GET", "/p", dummy()).unwrap();
        assert!(router.match_route("GET", "/p").is_some());
        assert!(router.match_route("GET", "/p2").is_none());
    }

    #[test]
    fn int_pattern_rejects_non_decimal() {
        let mut router = Router::new();
        router.add("GET", "/user/{id:int}", dummy()).unwrap();
        let (_, vars) = router.match_route("GET", "/user/42").unwrap();
        assert_eq!(vars.get("id").map(String::as_str), Some("42"));
        assert!(router.match_route("GET", "/user/x").is_none());
    }

    #[test]
    fn string_capture_stops_at_slash() {
        let mut router = Router::new();
        router.add("GET", "/files/{name}", dummy()).unwrap();
        assert!(router.match_route("GET", "/files/a/b").is_none());
        assert!(router.match_route("GET", "/files/a.txt").is_some());
    }

    #[test]
    fn capture_backtracks_for_trailing_literal() {
        let mut router = Router::new();
        router.add("GET", "/report/{id:int}.csv", dummy()).unwrap();
        let (_, vars) = router.match_route("GET", "/report/42.csv").unwrap();
        assert_eq!(vars.get("id").map(String::as_str), Some("42"));
    }

    #[test]
    fn longer_literal_prefix_is_tried_first() {
        let mut router = Router::new();
        router.add("GET", "/users/{id}", dummy()).unwrap();
        router.add("GET", "/users/active/{id}", dummy()).unwrap();
        let (_, vars) = router.match_route("GET", "/users/active/7").unwrap();
        // Only the longer-prefix pattern should be able to match this path
        // at all (the shorter one would swallow "active" as {id}); either
        // way, confirm the longer-prefix route is registered ahead of it.
        assert_eq!(vars.get("id").map(String::as_str), Some("7"));
    }

    #[test]
    fn invalid_variable_name_is_a_registration_error() {
        let mut router = Router::new();
        let err = router.add("GET", "/x/{1bad}", dummy()).unwrap_err();
        assert!(matches!(err, ServerError::InvalidRoutePattern { .. }));
    }

    #[test]
    fn unsupported_type_is_a_registration_error() {
        let mut router = Router::new();
        let err = router.add("GET", "/x/{id:float}", dummy()).unwrap_err();
        assert!(matches!(err, ServerError::InvalidRoutePattern { .. }));
    }

    #[test]
    fn backtracking_capture_never_splits_a_multibyte_char() {
        let mut router = Router::new();
        router.add("GET", "/files/{name}.txt", dummy()).unwrap();
        // "café" is 5 bytes ('é' encodes as 2), so the backtracking loop
        // tries byte length 4 while looking for a trailing ".txt" that
        // isn't there -- byte 4 falls inside 'é', which used to panic with
        // "byte index 4 is not a char boundary" instead of just failing
        // the match.
        assert!(router.match_route("GET", "/files/café").is_none());
        assert!(router.match_route("GET", "/files/café.txt").is_some());
    }

    #[test]
    fn method_with_no_routes_is_distinguished_from_a_path_miss() {
        let mut router = Router::new();
        router.add("GET", "/p", dummy()).unwrap();
        assert!(!router.method_has_routes("POST"));
        assert!(router.method_has_routes("GET"));
    }
}
