use crate::{
    core::{Handler, Request, Response},
    error::WebError,
    middleware::Middleware,
};
use http::HeaderValue;
use std::sync::Arc;

/// Ensures every request and successful response carries an `x-request-id`.
#[derive(Clone)]
pub struct RequestId {
    header: &'static str,
}

impl RequestId {
    pub fn new() -> Self {
        Self {
            header: "x-request-id",
        }
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Middleware for RequestId {
    async fn handle(&self, mut req: Request, next: Arc<dyn Handler>) -> Result<Response, WebError> {
        // Generate or use existing request ID
        let request_id = req
            .headers()
            .get(self.header)
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.is_empty())
            .and_then(|s| HeaderValue::from_str(s).ok())
            .unwrap_or_else(|| {
                HeaderValue::from_str(&crate::utils::request_id::generate())
                    .unwrap_or_else(|_| HeaderValue::from_static("-"))
            });

        req.headers_mut().insert(self.header, request_id.clone());

        let mut res = next.handle(req).await?;

        if !res.headers.contains_key(self.header) {
            res.headers.insert(self.header, request_id);
        }
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Method;

    struct Echo;

    #[async_trait::async_trait]
    impl Handler for Echo {
        async fn handle(&self, req: Request) -> Result<Response, WebError> {
            let id = req
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            Ok(Response::text(200, id))
        }
    }

    #[tokio::test]
    async fn keeps_incoming_id() {
        let req = Request::new(Method::GET, "/").header("x-request-id", "abc-1");
        let res = RequestId::new()
            .handle(req, Arc::new(Echo))
            .await
            .unwrap_or_else(|_| panic!("no error"));
        assert_eq!(&res.body[..], b"abc-1");
        assert_eq!(
            res.headers.get("x-request-id").and_then(|v| v.to_str().ok()),
            Some("abc-1")
        );
    }

    #[tokio::test]
    async fn generates_missing_id() {
        let res = RequestId::new()
            .handle(Request::new(Method::GET, "/"), Arc::new(Echo))
            .await
            .unwrap_or_else(|_| panic!("no error"));
        assert!(!res.body.is_empty());
        assert!(res.headers.contains_key("x-request-id"));
    }
}
