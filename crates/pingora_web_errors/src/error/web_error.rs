use super::{HasHighLevelForm, HighLevelError, extract_error};
use crate::core::Response;

/// Error type returned by handlers and middleware.
///
/// Wraps anything implementing [`HasHighLevelForm`]; classification sees
/// straight through it.
#[derive(Debug)]
pub struct WebError {
    inner: Box<dyn HasHighLevelForm>,
}

impl WebError {
    /// Create a new WebError from any HasHighLevelForm
    #[track_caller]
    pub fn new<T: HasHighLevelForm + 'static>(err: T) -> Self {
        Self {
            inner: Box::new(err),
        }
    }

    /// Box an arbitrary error. It has no high-level form and classifies as
    /// an internal error.
    pub fn other<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::new(Opaque(Box::new(err)))
    }

    /// Wrap this error with a message. The wrapped error stays reachable for
    /// classification.
    pub fn context(self, message: impl Into<String>) -> Self {
        Self::new(WrappedError {
            message: message.into(),
            form: None,
            inner: self,
        })
    }

    /// Wrap this error and give the wrapper its own high-level form, which
    /// takes precedence over anything inside.
    pub fn context_with(self, form: HighLevelError, message: impl Into<String>) -> Self {
        Self::new(WrappedError {
            message: message.into(),
            form: Some(form),
            inner: self,
        })
    }

    pub fn as_high_level_form(&self) -> &dyn HasHighLevelForm {
        &*self.inner
    }

    /// Classify and render this error as a JSON response.
    pub fn into_response(self) -> Response {
        let high_level = extract_error(&self);
        tracing::error!(
            status_code = high_level.code(),
            error = %self,
            "Web error occurred",
        );
        high_level.to_response()
    }
}

impl std::fmt::Display for WebError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl std::error::Error for WebError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

impl HasHighLevelForm for WebError {
    fn high_level_form(&self) -> Option<&HighLevelError> {
        self.inner.high_level_form()
    }

    fn wrapped(&self) -> Option<&dyn HasHighLevelForm> {
        self.inner.wrapped()
    }
}

/// An error annotated with a message, optionally with its own high-level form.
#[derive(Debug, thiserror::Error)]
#[error("{message}: {inner}")]
pub struct WrappedError {
    message: String,
    form: Option<HighLevelError>,
    #[source]
    inner: WebError,
}

impl HasHighLevelForm for WrappedError {
    fn high_level_form(&self) -> Option<&HighLevelError> {
        self.form.as_ref()
    }

    fn wrapped(&self) -> Option<&dyn HasHighLevelForm> {
        Some(&self.inner)
    }
}

#[derive(Debug)]
struct Opaque(Box<dyn std::error::Error + Send + Sync>);

impl std::fmt::Display for Opaque {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for Opaque {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl HasHighLevelForm for Opaque {}

impl From<HighLevelError> for WebError {
    #[track_caller]
    fn from(err: HighLevelError) -> Self {
        Self::new(err)
    }
}

impl From<WrappedError> for WebError {
    #[track_caller]
    fn from(err: WrappedError) -> Self {
        Self::new(err)
    }
}

impl From<std::io::Error> for WebError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(err)
    }
}

impl From<serde_json::Error> for WebError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BAD_REQUEST, FORBIDDEN, NOT_FOUND};
    use std::error::Error as _;

    #[test]
    fn test_web_error_creation() {
        let web_err = WebError::new(HighLevelError::new(400, "Test error"));

        assert_eq!(
            web_err.as_high_level_form().high_level_form().map(|e| e.code()),
            Some(400)
        );
        assert_eq!(web_err.to_string(), "Test error");
    }

    #[test]
    fn context_formats_like_a_chain() {
        let err = WebError::from(NOT_FOUND).context("user 42");
        assert_eq!(err.to_string(), "user 42: not found");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("not found"));
    }

    #[test]
    fn other_has_no_form() {
        let err = WebError::other(std::fmt::Error);
        assert!(err.high_level_form().is_none());
        assert!(err.wrapped().is_none());
        assert_eq!(extract_error(&err).code(), 500);
    }

    #[test]
    fn serde_json_errors_are_unclassified() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: WebError = parse.into();
        assert_eq!(extract_error(&err).code(), 500);

        let explained = err.context_with(BAD_REQUEST, "decoding body");
        assert_eq!(extract_error(&explained), BAD_REQUEST);
    }

    #[test]
    fn into_response_uses_classified_form() {
        let res = WebError::from(FORBIDDEN).context("admin only").into_response();
        assert_eq!(res.status.as_u16(), 403);
        assert_eq!(&res.body[..], br#"{"status":403,"error":"forbidden"}"#);
    }
}
