//! Method + path routing for [`App`](crate::App).
//!
//! A lookup miss is not an error here; the app decides whether it becomes a
//! `NOT_FOUND`, a 405 or an OPTIONS answer from [`Router::allowed_methods`].
use crate::core::{Method, Request, Response};
use crate::error::WebError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Endpoint logic. Returning `Err` records the error for the request and
/// halts the chain, the same as [`abort_and_error`](crate::abort_and_error).
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle(&self, req: Request) -> Result<Response, WebError>;
}

/// Adapts a synchronous closure into a [`Handler`].
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(Request) -> Result<Response, WebError> + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> Handler for FnHandler<F>
where
    F: Fn(Request) -> Result<Response, WebError> + Send + Sync + 'static,
{
    async fn handle(&self, req: Request) -> Result<Response, WebError> {
        (self.f)(req)
    }
}

/// Route params keyed by name, e.g. `id` for `/users/{id}`.
pub type Params = HashMap<String, String>;

#[derive(Default)]
pub struct Router {
    routes: HashMap<Method, matchit::Router<Arc<dyn Handler>>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method` on `path` (matchit syntax).
    ///
    /// # Panics
    ///
    /// Panics if the path conflicts with a route already registered for the
    /// same method; routes are fixed at startup.
    pub fn add<S: Into<String>>(&mut self, method: Method, path: S, handler: Arc<dyn Handler>) {
        let path = path.into();
        let routes = self.routes.entry(method.clone()).or_default();
        if let Err(err) = routes.insert(path.as_str(), handler) {
            panic!("cannot route {method} {path}: {err}");
        }
    }

    /// Register a closure for `method` on `path`.
    pub fn add_fn<S, F>(&mut self, method: Method, path: S, f: F)
    where
        S: Into<String>,
        F: Fn(Request) -> Result<Response, WebError> + Send + Sync + 'static,
    {
        self.add(method, path, Arc::new(FnHandler::new(f)))
    }

    pub fn get<S: Into<String>>(&mut self, path: S, handler: Arc<dyn Handler>) {
        self.add(Method::GET, path, handler)
    }

    pub fn post<S: Into<String>>(&mut self, path: S, handler: Arc<dyn Handler>) {
        self.add(Method::POST, path, handler)
    }

    pub fn get_fn<S, F>(&mut self, path: S, f: F)
    where
        S: Into<String>,
        F: Fn(Request) -> Result<Response, WebError> + Send + Sync + 'static,
    {
        self.add_fn(Method::GET, path, f)
    }

    pub fn post_fn<S, F>(&mut self, path: S, f: F)
    where
        S: Into<String>,
        F: Fn(Request) -> Result<Response, WebError> + Send + Sync + 'static,
    {
        self.add_fn(Method::POST, path, f)
    }

    /// Handler and params for `method` on `path`. HEAD uses the GET route
    /// when it has none of its own.
    pub fn find(&self, method: &Method, path: &str) -> Option<(Arc<dyn Handler>, Params)> {
        let matched = self.routes.get(method).and_then(|r| r.at(path).ok());
        match matched {
            Some(m) => {
                let params = m
                    .params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                Some((Arc::clone(m.value), params))
            }
            None if *method == Method::HEAD => self.find(&Method::GET, path),
            None => None,
        }
    }

    /// Sorted names of the methods with a route matching `path`.
    pub fn allowed_methods(&self, path: &str) -> Vec<String> {
        let mut methods: Vec<String> = self
            .routes
            .iter()
            .filter(|(_, r)| r.at(path).is_ok())
            .map(|(m, _)| m.as_str().to_string())
            .collect();
        methods.sort();
        methods
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NOT_FOUND, extract_error};

    struct HelloHandler;

    #[async_trait]
    impl Handler for HelloHandler {
        async fn handle(&self, req: Request) -> Result<Response, WebError> {
            let name = req.param("name").unwrap_or("world");
            Ok(Response::text(200, format!("hi {}", name)))
        }
    }

    #[tokio::test]
    async fn params_reach_the_handler() {
        let mut r = Router::new();
        r.get("/hi/{name}", Arc::new(HelloHandler));

        let (h, params) = r.find(&Method::GET, "/hi/alice").expect("found");
        assert_eq!(params.get("name").map(String::as_str), Some("alice"));
        let req = Request::new(Method::GET, "/hi/alice").with_params(params);
        let res = h.handle(req).await.expect("handler success");
        assert_eq!(std::str::from_utf8(&res.body).unwrap(), "hi alice");
    }

    #[tokio::test]
    async fn closure_handler_errors_propagate() {
        let mut r = Router::new();
        r.get_fn("/users/{id}", |_req| Err(NOT_FOUND.into()));

        let (h, _) = r.find(&Method::GET, "/users/9").expect("found");
        let err = h
            .handle(Request::new(Method::GET, "/users/9"))
            .await
            .err()
            .expect("handler error");
        assert_eq!(extract_error(&err), NOT_FOUND);
    }

    #[test]
    fn head_falls_back_to_get_and_allowed_methods() {
        let mut r = Router::new();
        r.get("/a", Arc::new(HelloHandler));
        r.post("/a", Arc::new(HelloHandler));
        r.add_fn(Method::DELETE, "/a", |_req| Ok(Response::empty(204)));

        assert!(r.find(&Method::HEAD, "/a").is_some());
        assert!(r.find(&Method::PUT, "/a").is_none());
        assert_eq!(r.allowed_methods("/a"), vec!["DELETE", "GET", "POST"]);
        assert!(r.allowed_methods("/b").is_empty());
    }

    #[test]
    #[should_panic(expected = "cannot route GET /a")]
    fn conflicting_route_panics() {
        let mut r = Router::new();
        r.get("/a", Arc::new(HelloHandler));
        r.get("/a", Arc::new(HelloHandler));
    }
}
