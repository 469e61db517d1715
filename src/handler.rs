//! The typed handler adapter (spec.md §4.H).
//!
//! A handler returns [`Handled`], a tagged union over the four payload
//! kinds the original expresses as a C++ template specialization
//! (`Response<T>` for `T` in `{json, std::string, arithmetic, HttpResponse}`).
//! [`apply`] is the match arm that used to live inside `HttpServer::
//! handleResponse`.

use crate::http::request::Request;
use crate::http::response::Response;
use crate::status::StatusCode;

/// What a handler produced, before it has been folded into a [`Response`].
pub enum Handled {
    /// Body is the string verbatim; `Content-Type` is left to the handler.
    Text(StatusCode, String),
    /// Body is the JSON serialization; forces `Content-Type: application/json`.
    Json(StatusCode, serde_json::Value),
    /// Body is the decimal text of the number.
    Number(StatusCode, i64),
    /// Replaces the context's response outright, preserving whatever
    /// headers the handler already set on it.
    Response(Response),
}

/// A registered route handler. Implemented for any
/// `Fn(&Request) -> Handled + Send + Sync`, so plain closures and function
/// items can be registered directly.
pub trait Handler: Send + Sync {
    fn call(&self, request: &Request) -> Handled;
}

impl<F> Handler for F
where
    F: Fn(&Request) -> Handled + Send + Sync,
{
    fn call(&self, request: &Request) -> Handled {
        self(request)
    }
}

/// Folds `handled` into `response`, the adapter step of spec.md §4.H.
pub(crate) fn apply(handled: Handled, response: &mut Response) {
    match handled {
        Handled::Text(status, body) => {
            response.status(status).body(body);
        }
        Handled::Json(status, value) => {
            response.status(status);
            response.json(&value);
        }
        Handled::Number(status, n) => {
            response.status(status).body(n.to_string());
        }
        Handled::Response(new_response) => {
            *response = new_response;
        }
    }
}

/// Builds a JSON-bodied [`Handled`] at `status`.
pub fn json(status: StatusCode, value: serde_json::Value) -> Handled {
    Handled::Json(status, value)
}

/// Builds a text-bodied [`Handled`] at `status`.
pub fn text(status: StatusCode, body: impl Into<String>) -> Handled {
    Handled::Text(status, body.into())
}

/// Builds a numeric-bodied [`Handled`] at `status`.
pub fn number(status: StatusCode, value: i64) -> Handled {
    Handled::Number(status, value)
}

/// Wraps a fully-built [`Response`], replacing whatever the context held.
pub fn response(response: Response) -> Handled {
    Handled::Response(response)
}

/// 200 OK with a text body -- mirrors the original's `Ok(...)` helper.
pub fn ok(body: impl Into<String>) -> Handled {
    text(StatusCode::Ok, body)
}

/// 201 Created with a text body.
pub fn created(body: impl Into<String>) -> Handled {
    text(StatusCode::Created, body)
}

/// 400 Bad Request with a text body.
pub fn bad_request(body: impl Into<String>) -> Handled {
    text(StatusCode::BadRequest, body)
}

/// 404 Not Found with a text body.
pub fn not_found(body: impl Into<String>) -> Handled {
    text(StatusCode::NotFound, body)
}

/// 405 Method Not Allowed with a text body.
pub fn method_not_allowed(body: impl Into<String>) -> Handled {
    text(StatusCode::MethodNotAllowed, body)
}

/// 500 Internal Server Error with a text body.
pub fn internal_server_error(body: impl Into<String>) -> Handled {
    text(StatusCode::InternalServerError, body)
}

/// 501 Not Implemented with a text body.
pub fn not_implemented(body: impl Into<String>) -> Handled {
    text(StatusCode::NotImplemented, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_handled_forces_content_type() {
        let mut response = Response::new();
        apply(json(StatusCode::Ok, serde_json::json!({"a": 1})), &mut response);
        assert_eq!(response.headers().get("content-type"), Some("application/json"));
        assert_eq!(response.body_bytes(), br#"{"a":1}"#);
    }

    #[test]
    fn number_handled_renders_decimal_text() {
        let mut response = Response::new();
        apply(number(StatusCode::Ok, 42), &mut response);
        assert_eq!(response.body_bytes(), b"42");
    }

    #[test]
    fn response_handled_replaces_outright() {
        let mut current = Response::new();
        current.header("X-Stale", "yes");
        let mut replacement = Response::new();
        replacement.header("X-Fresh", "yes");
        apply(super::response(replacement), &mut current);
        assert!(!current.headers().has("X-Stale"));
        assert!(current.headers().has("X-Fresh"));
    }

    #[test]
    fn convenience_constructors_set_fixed_status() {
        let mut r = Response::new();
        apply(not_found("nope"), &mut r);
        assert_eq!(r.status_code(), StatusCode::NotFound);
        assert_eq!(r.body_bytes(), b"nope");
    }
}
