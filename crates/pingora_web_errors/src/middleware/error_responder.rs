use async_trait::async_trait;
use std::sync::Arc;

use super::Middleware;
use crate::core::{Handler, Request, Response};
use crate::error::{DEFAULT_INTERNAL_ERROR, HighLevelError, WebError, extract_error_or};

/// Configuration for [`ErrorResponder`]
#[derive(Debug, Clone)]
pub struct ErrorResponderConfig {
    /// Form used for errors that carry none (default: 500 internal server error)
    pub fallback: HighLevelError,
    /// Log each classified error (default: true)
    pub log_errors: bool,
}

impl Default for ErrorResponderConfig {
    fn default() -> Self {
        Self {
            fallback: DEFAULT_INTERNAL_ERROR,
            log_errors: true,
        }
    }
}

impl ErrorResponderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback form for unclassified errors
    pub fn fallback(mut self, fallback: HighLevelError) -> Self {
        self.fallback = fallback;
        self
    }

    /// Enable or disable error logging
    pub fn log_errors(mut self, enabled: bool) -> Self {
        self.log_errors = enabled;
        self
    }
}

/// Turns the last error recorded for a request into a JSON response.
///
/// Runs the rest of the chain first. A returned `Err` counts as a recorded
/// error. With nothing recorded the downstream response passes through
/// untouched; otherwise the error is classified and written as
/// `{"status": <code>, "error": "<message>"}` with the same HTTP status.
///
/// Register it first so it wraps every other middleware.
#[derive(Debug, Clone, Default)]
pub struct ErrorResponder {
    config: ErrorResponderConfig,
}

impl ErrorResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ErrorResponderConfig) -> Self {
        Self { config }
    }

    fn log(&self, high_level: &HighLevelError, err: &WebError) {
        if !self.config.log_errors {
            return;
        }
        if high_level.status_code().is_server_error() {
            tracing::error!(status = high_level.code(), error = %err, "request failed");
        } else {
            tracing::warn!(status = high_level.code(), error = %err, "request rejected");
        }
    }
}

#[async_trait]
impl Middleware for ErrorResponder {
    async fn handle(&self, req: Request, next: Arc<dyn Handler>) -> Result<Response, WebError> {
        let errors = req.errors().clone();

        let downstream = match next.handle(req).await {
            Ok(res) => Some(res),
            Err(err) => {
                errors.push(err);
                None
            }
        };

        let classified = errors.last(|err| {
            let high_level = extract_error_or(err, &self.config.fallback);
            self.log(&high_level, err);
            high_level
        });

        match (classified, downstream) {
            (Some(high_level), _) => Ok(high_level.to_response()),
            (None, Some(res)) => Ok(res),
            // An Err was pushed above, so the list cannot be empty here.
            (None, None) => Ok(self.config.fallback.to_response()),
        }
    }
}
