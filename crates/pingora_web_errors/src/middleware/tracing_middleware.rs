use crate::{
    core::{Errors, Handler, Request, Response},
    error::{WebError, extract_error},
    middleware::Middleware,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{Instrument, info};

/// Tracing middleware that creates a span for each request with request_id context
/// This ensures all tracing calls within the request have the request_id automatically included
#[derive(Clone)]
pub struct TracingMiddleware;

impl TracingMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TracingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Middleware for TracingMiddleware {
    async fn handle(&self, req: Request, next: Arc<dyn Handler>) -> Result<Response, WebError> {
        let request_id = req
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let span = tracing::info_span!(
            "request",
            request_id = request_id.as_str(),
            method = req.method().as_str(),
            path = req.path(),
            status = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
        );
        let span_for_record = span.clone();
        let errors = req.errors().clone();

        async move {
            info!("Request started");
            let start_time = std::time::Instant::now();

            let result = next.handle(req).await;

            span_for_record.record("status", rendered_status(&result, &errors));
            span_for_record.record("latency_ms", start_time.elapsed().as_millis() as u64);

            info!("Request completed");
            result
        }
        .instrument(span)
        .await
    }
}

/// Status the client will see once an outer error responder has run: a
/// returned error first, then the last recorded one, then the response itself.
fn rendered_status(result: &Result<Response, WebError>, errors: &Errors) -> u16 {
    match result {
        Err(err) => extract_error(err).status_code().as_u16(),
        Ok(res) => errors
            .last(|err| extract_error(err).status_code().as_u16())
            .unwrap_or_else(|| res.status.as_u16()),
    }
}
