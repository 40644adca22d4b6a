use std::collections::HashMap;

use crate::core::Errors;
use crate::error::{BAD_REQUEST, WebError};
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, Uri};

#[derive(Debug)]
pub struct Request {
    pub inner: http::Request<Bytes>,
    pub params: HashMap<String, String>,
    errors: Errors,
}

impl Request {
    /// Build a request for a path known to be a valid URI.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid URI; use [`Request::try_new`] for
    /// targets coming off the wire.
    pub fn new<M: Into<Method>, S: AsRef<str>>(method: M, path: S) -> Self {
        Self::try_new(method, path).expect("valid request path")
    }

    /// Build a request, failing with `BAD_REQUEST` when `path` is not a valid URI.
    pub fn try_new<M: Into<Method>, S: AsRef<str>>(method: M, path: S) -> Result<Self, WebError> {
        let uri = path.as_ref().parse::<Uri>().map_err(|err| {
            WebError::other(err).context_with(BAD_REQUEST, "invalid request target")
        })?;

        let mut inner = http::Request::new(Bytes::new());
        *inner.method_mut() = method.into();
        *inner.uri_mut() = uri;

        Ok(Self {
            inner,
            params: HashMap::new(),
            errors: Errors::new(),
        })
    }

    pub fn header<K, V>(mut self, k: K, v: V) -> Self
    where
        K: TryInto<http::HeaderName>,
        V: TryInto<HeaderValue>,
        K::Error: std::fmt::Debug,
        V::Error: std::fmt::Debug,
    {
        if let (Ok(key), Ok(value)) = (k.try_into(), v.try_into()) {
            self.inner.headers_mut().insert(key, value);
        }
        self
    }

    pub fn with_body<B: Into<Bytes>>(mut self, body: B) -> Self {
        *self.inner.body_mut() = body.into();
        self
    }

    // Convenience accessors for the inner http::Request
    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    pub fn path(&self) -> &str {
        self.inner.uri().path()
    }

    pub fn headers(&self) -> &HeaderMap<HeaderValue> {
        self.inner.headers()
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap<HeaderValue> {
        self.inner.headers_mut()
    }

    pub fn body(&self) -> &Bytes {
        self.inner.body()
    }

    /// Decode the body as JSON. Failures carry no high-level form.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, WebError> {
        Ok(serde_json::from_slice(self.body())?)
    }

    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|s| s.as_str())
    }

    pub fn param_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.param(name).unwrap_or(default)
    }

    /// Errors recorded so far for this request.
    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    /// Record an error without halting.
    pub fn error<E: Into<WebError>>(&self, err: E) {
        self.errors.push(err);
    }
}
