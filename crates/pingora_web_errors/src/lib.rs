//! JSON error responses for Pingora-based servers.
//!
//! Handlers fail with a [`HighLevelError`] (a status code and a client-safe
//! message), or with anything that wraps one. [`ErrorResponder`] sits around
//! the middleware chain, classifies the last recorded error with
//! [`extract_error`] and answers `{"status": <code>, "error": "<message>"}`.
pub mod core;
pub mod error;
pub mod middleware;
pub mod utils;

// Re-export commonly used types at the crate root
pub use crate::core::*;
pub use error::*;
pub use http::StatusCode;
pub use middleware::*;

use async_trait::async_trait;
use http::Response as HttpResponse;
use std::sync::Arc;
use pingora::protocols::http::ServerSession;
use pingora::services::listening::Service;
use pingora_core::apps::HttpServerApp;

/// The main application: holds router and middleware.
pub struct App {
    router: Router,
    pub(crate) middlewares: Vec<Arc<dyn Middleware>>,
}

/// Unmatched routes fail with `NOT_FOUND` so the error responder renders them.
struct NotFoundHandler;

#[async_trait]
impl Handler for NotFoundHandler {
    async fn handle(&self, _req: Request) -> Result<Response, WebError> {
        Err(NOT_FOUND.into())
    }
}

const METHOD_NOT_ALLOWED: HighLevelError = HighLevelError::from_static(405, "method not allowed");

/// Answers OPTIONS with 204 and other methods with 405, both carrying `Allow`.
struct AllowHandler {
    allow: String,
    preflight: bool,
}

#[async_trait]
impl Handler for AllowHandler {
    async fn handle(&self, _req: Request) -> Result<Response, WebError> {
        let res = if self.preflight {
            Response::empty(204)
        } else {
            METHOD_NOT_ALLOWED.to_response()
        };
        Ok(res.header(http::header::ALLOW, self.allow.as_str()))
    }
}

impl App {
    /// Single constructor: requires a Router; middlewares are added later.
    pub fn new(router: Router) -> Self {
        let mut s = Self {
            router,
            middlewares: Vec::new(),
        };
        // Install request-id middleware by default
        s.use_middleware(RequestId::default());
        s
    }

    /// Earlier middlewares wrap later ones; register [`ErrorResponder`] first.
    pub fn use_middleware<M: Middleware + 'static>(&mut self, middleware: M) {
        self.middlewares.push(Arc::new(middleware));
    }

    /// Wrap the app in a Pingora listening service; add listeners before use.
    pub fn to_service(self, name: &str) -> Service<App> {
        Service::new(name.to_string(), self)
    }

    /// Handle a request end-to-end through middlewares and the router.
    pub async fn handle(&self, req: Request) -> Response {
        let (handler, params) = match self.router.find(req.method(), req.path()) {
            Some(hp) => hp,
            None => (self.fallback_handler(&req), Default::default()),
        };

        // Compose middlewares (onion model) around the route handler
        let entry = compose(&self.middlewares, handler);
        let mut response = match entry.handle(req.with_params(params)).await {
            Ok(res) => res,
            // Nothing in the chain rendered this error
            Err(err) => err.into_response(),
        };

        Self::finalize_response_headers(&mut response);
        response
    }

    /// Turn a raw request head into a [`Request`], or the 400 answer for a
    /// target that is not a valid URI.
    pub fn request_from_head(
        method: &Method,
        raw_path: &[u8],
        headers: &http::HeaderMap,
    ) -> Result<Request, Response> {
        let path = String::from_utf8_lossy(raw_path);
        let mut req = match Request::try_new(method.clone(), &*path) {
            Ok(req) => req,
            Err(err) => {
                tracing::warn!(error = %err, path = %path, "rejected request target");
                let mut res = BAD_REQUEST.to_response();
                Self::finalize_response_headers(&mut res);
                return Err(res);
            }
        };
        for (name, value) in headers.iter() {
            if let Ok(v) = value.to_str() {
                req = req.header(name.as_str(), v);
            }
        }
        Ok(req)
    }

    /// Handler for paths with no route under the request's method: OPTIONS
    /// and 405 when other methods match, `NOT_FOUND` otherwise.
    fn fallback_handler(&self, req: &Request) -> Arc<dyn Handler> {
        let mut allowed = self.router.allowed_methods(req.path());
        let preflight = *req.method() == Method::OPTIONS;
        if preflight {
            allowed.push("OPTIONS".to_string());
            allowed.sort();
            allowed.dedup();
        }
        if allowed.is_empty() {
            return Arc::new(NotFoundHandler);
        }
        Arc::new(AllowHandler {
            allow: allowed.join(", "),
            preflight,
        })
    }

    /// Set content-length unless the response already carries one.
    fn finalize_response_headers(response: &mut Response) {
        if response.headers.contains_key(http::header::CONTENT_LENGTH) {
            return;
        }
        response.set_header(http::header::CONTENT_LENGTH, response.body.len().to_string());
    }
}

use pingora::server::ShutdownWatch;
use pingora_core::apps::{HttpPersistentSettings, HttpServerOptions, ReusedHttpStream};
use pingora_http::ResponseHeader;

#[async_trait]
impl HttpServerApp for App {
    async fn process_new_http(
        self: &Arc<Self>,
        mut http: ServerSession,
        shutdown: &ShutdownWatch,
    ) -> Option<ReusedHttpStream> {
        if !(http.read_request().await.ok()?) {
            return None;
        }
        if *shutdown.borrow() {
            http.set_keepalive(None);
        } else {
            http.set_keepalive(Some(60));
        }

        let reqh = http.req_header();
        let is_head = reqh.method == Method::HEAD;

        let res = match Self::request_from_head(&reqh.method, reqh.raw_path(), &reqh.headers) {
            Ok(mut req) => {
                // Read the body only when headers announce one
                if !is_head {
                    let has_te = req.headers().contains_key(http::header::TRANSFER_ENCODING);
                    let has_len = req
                        .headers()
                        .get(http::header::CONTENT_LENGTH)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(0)
                        > 0;
                    if (has_te || has_len)
                        && let Ok(Some(bytes)) = http.read_request_body().await
                    {
                        req = req.with_body(bytes);
                    }
                }
                self.handle(req).await
            }
            Err(res) => {
                // The body was never read, so the connection cannot be reused
                http.set_keepalive(None);
                res
            }
        };

        let mut builder = HttpResponse::builder().status(res.status);
        for (k, v) in res.headers.iter() {
            builder = builder.header(k, v);
        }
        let (parts, _) = match builder.body(()) {
            Ok(r) => r.into_parts(),
            Err(err) => {
                tracing::error!(error = %err, "invalid response head");
                return None;
            }
        };
        let resp_header: ResponseHeader = parts.into();
        if http
            .write_response_header(Box::new(resp_header))
            .await
            .is_err()
        {
            return None;
        }

        // HEAD responses carry no body
        if !is_head {
            let _ = http.write_response_body(res.body, true).await;
        }

        let persistent_settings = HttpPersistentSettings::for_session(&http);
        match http.finish().await {
            Ok(c) => c.map(|s| ReusedHttpStream::new(s, Some(persistent_settings))),
            Err(_) => None,
        }
    }

    fn h2_options(&self) -> Option<pingora::protocols::http::v2::server::H2Options> {
        None
    }
    fn server_options(&self) -> Option<&HttpServerOptions> {
        None
    }
}
