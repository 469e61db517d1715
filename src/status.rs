//! HTTP status code catalog: numeric code to canonical reason phrase.
//!
//! Covers the full 2xx/3xx/4xx/5xx set through code 511. A status built from
//! a code outside that table still round-trips through [`StatusCode::code`]
//! but serializes with reason phrase `"Unknown"`.

macro_rules! set_status_codes {
    ($(
        $(#[$docs:meta])*
        $name:ident = ($num:expr, $str:expr);
    )+) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum StatusCode { $(
            #[doc = concat!(stringify!($num), " ", $str)]
            $(#[$docs])*
            $name,
        )+
            /// Any numeric code not covered by a named variant above.
            /// Serializes with reason phrase `"Unknown"`.
            Unknown(u16),
        }

        impl StatusCode {
            pub const fn code(&self) -> u16 {
                match self { $(
                    StatusCode::$name => $num,
                )+
                    StatusCode::Unknown(code) => *code,
                }
            }

            pub const fn reason_phrase(&self) -> &'static str {
                match self { $(
                    StatusCode::$name => $str,
                )+
                    StatusCode::Unknown(_) => "Unknown",
                }
            }

            /// Maps a raw numeric code to its named variant, or
            /// `Unknown(code)` if the table has no entry for it.
            pub fn from_code(code: u16) -> Self {
                match code { $(
                    $num => StatusCode::$name,
                )+
                    other => StatusCode::Unknown(other),
                }
            }
        }
    }
}

set_status_codes! {
    /// [RFC9110 §15.2.1](https://datatracker.ietf.org/doc/html/rfc9110#section-15.2.1)
    Continue = (100, "Continue");
    /// [RFC9110 §15.2.2](https://datatracker.ietf.org/doc/html/rfc9110#section-15.2.2)
    SwitchingProtocols = (101, "Switching Protocols");
    /// [RFC2518 §10.1](https://datatracker.ietf.org/doc/html/rfc2518#section-10.1)
    Processing = (102, "Processing");
    /// [RFC8297 §2](https://datatracker.ietf.org/doc/html/rfc8297#section-2)
    EarlyHints = (103, "Early Hints");

    /// [RFC9110 §15.3.1](https://datatracker.ietf.org/doc/html/rfc9110#section-15.3.1)
    Ok = (200, "OK");
    /// [RFC9110 §15.3.2](https://datatracker.ietf.org/doc/html/rfc9110#section-15.3.2)
    Created = (201, "Created");
    /// [RFC9110 §15.3.3](https://datatracker.ietf.org/doc/html/rfc9110#section-15.3.3)
    Accepted = (202, "Accepted");
    /// [RFC9110 §15.3.4](https://datatracker.ietf.org/doc/html/rfc9110#section-15.3.4)
    ///
    /// Reason phrase kept hyphenated (`Non-Authoritative Information`) to
    /// match the canonical reference text rather than the unhyphenated
    /// spelling some implementations use.
    NonAuthoritativeInformation = (203, "Non-Authoritative Information");
    /// [RFC9110 §15.3.5](https://datatracker.ietf.org/doc/html/rfc9110#section-15.3.5)
    NoContent = (204, "No Content");
    /// [RFC9110 §15.3.6](https://datatracker.ietf.org/doc/html/rfc9110#section-15.3.6)
    ResetContent = (205, "Reset Content");
    /// [RFC9110 §15.3.7](https://datatracker.ietf.org/doc/html/rfc9110#section-15.3.7)
    PartialContent = (206, "Partial Content");
    /// [RFC4918 §11.1](https://datatracker.ietf.org/doc/html/rfc4918#section-11.1)
    MultiStatus = (207, "Multi-Status");
    /// [RFC5842 §7.1](https://datatracker.ietf.org/doc/html/rfc5842#section-7.1)
    AlreadyReported = (208, "Already Reported");
    /// [RFC3229 §10.4.1](https://datatracker.ietf.org/doc/html/rfc3229#section-10.4.1)
    ImUsed = (226, "IM Used");

    /// [RFC9110 §15.4.1](https://datatracker.ietf.org/doc/html/rfc9110#section-15.4.1)
    MultipleChoices = (300, "Multiple Choices");
    /// [RFC9110 §15.4.2](https://datatracker.ietf.org/doc/html/rfc9110#section-15.4.2)
    MovedPermanently = (301, "Moved Permanently");
    /// [RFC9110 §15.4.3](https://datatracker.ietf.org/doc/html/rfc9110#section-15.4.3)
    Found = (302, "Found");
    /// [RFC9110 §15.4.4](https://datatracker.ietf.org/doc/html/rfc9110#section-15.4.4)
    SeeOther = (303, "See Other");
    /// [RFC9110 §15.4.5](https://datatracker.ietf.org/doc/html/rfc9110#section-15.4.5)
    NotModified = (304, "Not Modified");
    /// [RFC9110 §15.4.6](https://datatracker.ietf.org/doc/html/rfc9110#section-15.4.6)
    UseProxy = (305, "Use Proxy");
    /// [RFC9110 §15.4.7](https://datatracker.ietf.org/doc/html/rfc9110#section-15.4.7)
    TemporaryRedirect = (307, "Temporary Redirect");
    /// [RFC9110 §15.4.8](https://datatracker.ietf.org/doc/html/rfc9110#section-15.4.8)
    PermanentRedirect = (308, "Permanent Redirect");

    /// [RFC9110 §15.5.1](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.1)
    BadRequest = (400, "Bad Request");
    /// [RFC9110 §15.5.2](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.2)
    Unauthorized = (401, "Unauthorized");
    /// [RFC9110 §15.5.3](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.3)
    PaymentRequired = (402, "Payment Required");
    /// [RFC9110 §15.5.4](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.4)
    Forbidden = (403, "Forbidden");
    /// [RFC9110 §15.5.5](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.5)
    NotFound = (404, "Not Found");
    /// [RFC9110 §15.5.6](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.6)
    MethodNotAllowed = (405, "Method Not Allowed");
    /// [RFC9110 §15.5.7](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.7)
    NotAcceptable = (406, "Not Acceptable");
    /// [RFC9110 §15.5.8](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.8)
    ProxyAuthenticationRequired = (407, "Proxy Authentication Required");
    /// [RFC9110 §15.5.9](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.9)
    RequestTimeout = (408, "Request Timeout");
    /// [RFC9110 §15.5.10](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.10)
    Conflict = (409, "Conflict");
    /// [RFC9110 §15.5.11](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.11)
    Gone = (410, "Gone");
    /// [RFC9110 §15.5.12](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.12)
    LengthRequired = (411, "Length Required");
    /// [RFC9110 §15.5.13](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.13)
    PreconditionFailed = (412, "Precondition Failed");
    /// [RFC9110 §15.5.14](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.14)
    PayloadTooLarge = (413, "Payload Too Large");
    /// [RFC9110 §15.5.15](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.15)
    UriTooLong = (414, "URI Too Long");
    /// [RFC9110 §15.5.16](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.16)
    UnsupportedMediaType = (415, "Unsupported Media Type");
    /// [RFC9110 §15.5.17](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.17)
    RangeNotSatisfiable = (416, "Range Not Satisfiable");
    /// [RFC9110 §15.5.18](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.18)
    ExpectationFailed = (417, "Expectation Failed");
    /// [RFC2324 §2.3.2](https://datatracker.ietf.org/doc/html/rfc2324#section-2.3.2)
    ImATeapot = (418, "I'm a teapot");
    /// [RFC9110 §15.5.20](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.20)
    MisdirectedRequest = (421, "Misdirected Request");
    /// [RFC9110 §15.5.21](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.21)
    UnprocessableEntity = (422, "Unprocessable Entity");
    /// [RFC4918 §11.3](https://datatracker.ietf.org/doc/html/rfc4918#section-11.3)
    Locked = (423, "Locked");
    /// [RFC4918 §11.4](https://datatracker.ietf.org/doc/html/rfc4918#section-11.4)
    FailedDependency = (424, "Failed Dependency");
    /// [RFC8470 §5.2](https://datatracker.ietf.org/doc/html/rfc8470#section-5.2)
    TooEarly = (425, "Too Early");
    /// [RFC9110 §15.5.22](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.22)
    UpgradeRequired = (426, "Upgrade Required");
    /// [RFC6585 §3](https://datatracker.ietf.org/doc/html/rfc6585#section-3)
    PreconditionRequired = (428, "Precondition Required");
    /// [RFC6585 §4](https://datatracker.ietf.org/doc/html/rfc6585#section-4)
    TooManyRequests = (429, "Too Many Requests");
    /// [RFC6585 §5](https://datatracker.ietf.org/doc/html/rfc6585#section-5)
    RequestHeaderFieldsTooLarge = (431, "Request Header Fields Too Large");
    /// [RFC7725 §3](https://datatracker.ietf.org/doc/html/rfc7725#section-3)
    UnavailableForLegalReasons = (451, "Unavailable For Legal Reasons");

    /// [RFC9110 §15.6.1](https://datatracker.ietf.org/doc/html/rfc9110#section-15.6.1)
    InternalServerError = (500, "Internal Server Error");
    /// [RFC9110 §15.6.2](https://datatracker.ietf.org/doc/html/rfc9110#section-15.6.2)
    NotImplemented = (501, "Not Implemented");
    /// [RFC9110 §15.6.3](https://datatracker.ietf.org/doc/html/rfc9110#section-15.6.3)
    BadGateway = (502, "Bad Gateway");
    /// [RFC9110 §15.6.4](https://datatracker.ietf.org/doc/html/rfc9110#section-15.6.4)
    ServiceUnavailable = (503, "Service Unavailable");
    /// [RFC9110 §15.6.5](https://datatracker.ietf.org/doc/html/rfc9110#section-15.6.5)
    GatewayTimeout = (504, "Gateway Timeout");
    /// [RFC9110 §15.6.6](https://datatracker.ietf.org/doc/html/rfc9110#section-15.6.6)
    HttpVersionNotSupported = (505, "HTTP Version Not Supported");
    /// [RFC2295 §8.1](https://datatracker.ietf.org/doc/html/rfc2295#section-8.1)
    VariantAlsoNegotiates = (506, "Variant Also Negotiates");
    /// [RFC4918 §11.5](https://datatracker.ietf.org/doc/html/rfc4918#section-11.5)
    InsufficientStorage = (507, "Insufficient Storage");
    /// [RFC5842 §7.2](https://datatracker.ietf.org/doc/html/rfc5842#section-7.2)
    LoopDetected = (508, "Loop Detected");
    /// [RFC2774 §7](https://datatracker.ietf.org/doc/html/rfc2774#section-7)
    NotExtended = (510, "Not Extended");
    /// [RFC6585 §6](https://datatracker.ietf.org/doc/html/rfc6585#section-6)
    NetworkAuthenticationRequired = (511, "Network Authentication Required");
}

impl StatusCode {
    /// The exact `"<code> <reason>"` status-line tail, e.g. `"200 OK"`.
    pub fn status_line_tail(&self) -> String {
        format!("{} {}", self.code(), self.reason_phrase())
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        StatusCode::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_code_resolves_to_named_variant() {
        assert_eq!(StatusCode::from_code(404), StatusCode::NotFound);
        assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    }

    #[test]
    fn non_authoritative_information_keeps_hyphen() {
        assert_eq!(
            StatusCode::NonAuthoritativeInformation.reason_phrase(),
            "Non-Authoritative Information"
        );
    }

    #[test]
    fn unmapped_code_serializes_as_unknown() {
        let status = StatusCode::from_code(499);
        assert_eq!(status.code(), 499);
        assert_eq!(status.reason_phrase(), "Unknown");
    }

    #[test]
    fn round_trips_through_code() {
        for code in [100u16, 204, 301, 404, 429, 500, 511] {
            assert_eq!(StatusCode::from_code(code).code(), code);
        }
    }
}
