use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{Request, Response};
use crate::error::WebError;

/// Ordered list of errors recorded while handling one request.
///
/// Clones share the same list, so a middleware can keep a handle while the
/// request itself moves down the chain.
#[derive(Debug, Clone, Default)]
pub struct Errors {
    inner: Arc<Mutex<Vec<WebError>>>,
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<WebError>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an error.
    pub fn push<E: Into<WebError>>(&self, err: E) {
        self.lock().push(err.into());
    }

    /// Run `f` on the most recently recorded error, if any.
    pub fn last<R>(&self, f: impl FnOnce(&WebError) -> R) -> Option<R> {
        self.lock().last().map(f)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Record `err` on the request and stop: the returned placeholder halts the
/// rest of the chain and is replaced by the error responder.
///
/// ```ignore
/// if req.param("id").is_none() {
///     return abort_and_error(&req, BAD_REQUEST);
/// }
/// ```
pub fn abort_and_error<E: Into<WebError>>(req: &Request, err: E) -> Result<Response, WebError> {
    req.errors().push(err);
    Ok(Response::empty(200))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Method;
    use crate::error::{CONFLICT, NOT_FOUND, extract_error};

    #[test]
    fn last_is_most_recent() {
        let errors = Errors::new();
        assert!(errors.is_empty());
        assert!(errors.last(|e| extract_error(e)).is_none());

        errors.push(NOT_FOUND);
        errors.push(CONFLICT);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.last(|e| extract_error(e)), Some(CONFLICT));
    }

    #[test]
    fn clones_share_the_list() {
        let errors = Errors::new();
        let handle = errors.clone();
        errors.push(NOT_FOUND);
        assert_eq!(handle.len(), 1);
    }

    #[test]
    fn abort_and_error_records_and_returns_placeholder() {
        let req = Request::new(Method::GET, "/x");
        let res = abort_and_error(&req, NOT_FOUND).unwrap();
        assert_eq!(res.status.as_u16(), 200);
        assert_eq!(req.errors().len(), 1);
    }
}
