use std::borrow::Cow;

use http::StatusCode;
use serde::Serialize;

use crate::core::Response;

/// An HTTP status code paired with a message that is safe to show to clients.
///
/// Its `Display` output is the message alone; the code only shows up once the
/// error is rendered as a response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
#[error("{message}")]
pub struct HighLevelError {
    code: u16,
    message: Cow<'static, str>,
}

/// JSON body written for a classified error.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    status: u16,
    error: &'a str,
}

impl HighLevelError {
    /// Build a high-level error. The code is taken as is.
    pub fn new(code: u16, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub const fn from_static(code: u16, message: &'static str) -> Self {
        Self {
            code,
            message: Cow::Borrowed(message),
        }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The code as a `StatusCode`; codes outside 100..=999 resolve to 500.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Render as `{"status": <code>, "error": "<message>"}` with a matching HTTP status.
    pub fn to_response(&self) -> Response {
        let status = self.status_code().as_u16();
        Response::json(
            status,
            ErrorBody {
                status,
                error: &self.message,
            },
        )
    }
}

pub const DEFAULT_INTERNAL_ERROR: HighLevelError =
    HighLevelError::from_static(500, "internal server error");
pub const BAD_REQUEST: HighLevelError =
    HighLevelError::from_static(400, "missed parameter, incorrect or malformed data");
pub const NOT_FOUND: HighLevelError = HighLevelError::from_static(404, "not found");
pub const UNAUTHORIZED: HighLevelError = HighLevelError::from_static(401, "unauthorized");
pub const FORBIDDEN: HighLevelError = HighLevelError::from_static(403, "forbidden");
pub const CONFLICT: HighLevelError = HighLevelError::from_static(409, "conflict");
pub const TOO_MANY_REQUESTS: HighLevelError =
    HighLevelError::from_static(429, "too many requests");
pub const INTERNAL_SERVER_ERROR: HighLevelError =
    HighLevelError::from_static(500, "internal server error");
pub const NOT_IMPLEMENTED: HighLevelError = HighLevelError::from_static(501, "not implemented");
pub const SERVICE_UNAVAILABLE: HighLevelError =
    HighLevelError::from_static(503, "service unavailable");
pub const GATEWAY_TIMEOUT: HighLevelError = HighLevelError::from_static(504, "gateway timeout");
pub const BAD_GATEWAY: HighLevelError = HighLevelError::from_static(502, "bad gateway");
// Same code as BAD_GATEWAY; callers match on the message.
pub const PROXY_ERROR: HighLevelError = HighLevelError::from_static(502, "proxy error");
pub const UNKNOWN_ERROR: HighLevelError = HighLevelError::from_static(500, "unknown error");

/// Every named default, in declaration order.
pub const DEFAULTS: [HighLevelError; 14] = [
    DEFAULT_INTERNAL_ERROR,
    BAD_REQUEST,
    NOT_FOUND,
    UNAUTHORIZED,
    FORBIDDEN,
    CONFLICT,
    TOO_MANY_REQUESTS,
    INTERNAL_SERVER_ERROR,
    NOT_IMPLEMENTED,
    SERVICE_UNAVAILABLE,
    GATEWAY_TIMEOUT,
    BAD_GATEWAY,
    PROXY_ERROR,
    UNKNOWN_ERROR,
];

#[cfg(test)]
mod tests {
    use super::*;

    fn body_json(res: &Response) -> serde_json::Value {
        serde_json::from_slice(&res.body).unwrap()
    }

    #[test]
    fn display_is_message_only() {
        assert_eq!(NOT_FOUND.to_string(), "not found");
        let custom = HighLevelError::new(418, format!("teapot #{}", 7));
        assert_eq!(custom.to_string(), "teapot #7");
        assert_eq!(custom.code(), 418);
    }

    #[test]
    fn equality_is_by_value() {
        assert_eq!(HighLevelError::new(404, "not found"), NOT_FOUND);
        assert_eq!(DEFAULT_INTERNAL_ERROR, INTERNAL_SERVER_ERROR);
        assert_ne!(BAD_GATEWAY, PROXY_ERROR);
        assert_eq!(BAD_GATEWAY.code(), PROXY_ERROR.code());
    }

    #[test]
    fn defaults_table() {
        let codes: Vec<u16> = DEFAULTS.iter().map(HighLevelError::code).collect();
        assert_eq!(
            codes,
            vec![500, 400, 404, 401, 403, 409, 429, 500, 501, 503, 504, 502, 502, 500]
        );
        assert!(DEFAULTS.iter().all(|e| !e.message().is_empty()));
    }

    #[test]
    fn to_response_writes_status_and_body() {
        let res = NOT_FOUND.to_response();
        assert_eq!(res.status.as_u16(), 404);
        assert_eq!(
            res.headers
                .get(http::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
        assert_eq!(
            body_json(&res),
            serde_json::json!({"status": 404, "error": "not found"})
        );
    }

    #[test]
    fn body_field_order() {
        let res = CONFLICT.to_response();
        assert_eq!(&res.body[..], br#"{"status":409,"error":"conflict"}"#);
    }

    #[test]
    fn invalid_code_resolves_to_500_consistently() {
        let odd = HighLevelError::new(42, "odd");
        let res = odd.to_response();
        assert_eq!(res.status.as_u16(), 500);
        assert_eq!(body_json(&res)["status"], 500);
        assert_eq!(body_json(&res)["error"], "odd");
    }
}
