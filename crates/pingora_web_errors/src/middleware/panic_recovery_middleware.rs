use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use super::Middleware;
use crate::core::{Handler, Request, Response};
use crate::error::{UNKNOWN_ERROR, WebError};

/// Catches panics in the rest of the chain and turns them into an
/// `UNKNOWN_ERROR`, which an outer `ErrorResponder` renders as a 500.
pub struct PanicRecoveryMiddleware;

impl PanicRecoveryMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PanicRecoveryMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Middleware for PanicRecoveryMiddleware {
    async fn handle(&self, req: Request, next: Arc<dyn Handler>) -> Result<Response, WebError> {
        AssertUnwindSafe(next.handle(req))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic_info| {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic occurred".to_string()
                };

                tracing::error!("Panic caught in request handler: {}", panic_msg);

                Err(UNKNOWN_ERROR.into())
            })
    }
}
