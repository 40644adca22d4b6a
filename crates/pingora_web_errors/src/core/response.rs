use bytes::Bytes;
use http::{HeaderMap, HeaderValue, StatusCode};

pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    /// An empty response. Invalid status codes become 500.
    pub fn new(status: u16) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn text<S: Into<String>>(status: u16, body: S) -> Self {
        let mut res = Self::new(status);
        res.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        let text: String = body.into();
        res.body = Bytes::from(text);
        res
    }

    /// Construct an empty response with given status. Does not set content-type.
    pub fn empty(status: u16) -> Self {
        Self::new(status)
    }

    /// Construct a raw bytes response. Does not set content-type.
    pub fn bytes(status: u16, body: impl Into<Bytes>) -> Self {
        let mut res = Self::new(status);
        res.body = body.into();
        res
    }

    /// Construct a JSON response from any serializable value.
    pub fn json(status: u16, value: impl serde::Serialize) -> Self {
        let mut res = Self::new(status);
        res.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        match serde_json::to_vec(&value) {
            Ok(bytes) => {
                res.body = Bytes::from(bytes);
                res
            }
            Err(err) => {
                tracing::error!(error = %err, "JSON serialization failed");
                res.status = StatusCode::INTERNAL_SERVER_ERROR;
                res
            }
        }
    }

    pub fn set_header<K, V>(&mut self, k: K, v: V)
    where
        K: TryInto<http::HeaderName>,
        V: TryInto<HeaderValue>,
        K::Error: std::fmt::Debug,
        V::Error: std::fmt::Debug,
    {
        if let (Ok(key), Ok(value)) = (k.try_into(), v.try_into()) {
            self.headers.insert(key, value);
        }
    }

    pub fn header<K, V>(mut self, k: K, v: V) -> Self
    where
        K: TryInto<http::HeaderName>,
        V: TryInto<HeaderValue>,
        K::Error: std::fmt::Debug,
        V::Error: std::fmt::Debug,
    {
        self.set_header(k, v);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_builds_response() {
        let v = json!({"a": 1, "b": "x"});
        let res = Response::json(200, &v);
        assert_eq!(res.status.as_u16(), 200);
        assert_eq!(
            res.headers
                .get(http::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
        assert_eq!(res.body.as_ref(), serde_json::to_vec(&v).unwrap().as_slice());
    }

    #[test]
    fn empty_and_bytes() {
        let res = Response::empty(204);
        assert_eq!(res.status.as_u16(), 204);
        // content-length is set by App.handle(), not here
        assert!(!res.headers.contains_key(http::header::CONTENT_LENGTH));
        assert!(res.body.is_empty());

        let res = Response::bytes(201, Bytes::from(vec![1, 2, 3]));
        assert_eq!(res.status.as_u16(), 201);
        assert_eq!(res.body.as_ref(), &[1, 2, 3]);
    }

    #[test]
    fn invalid_status_becomes_500() {
        assert_eq!(Response::new(7).status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn manual_headers_not_overridden() {
        let mut res = Response::text(200, "hello");
        res.set_header("content-length", "999");
        assert_eq!(
            res.headers.get(http::header::CONTENT_LENGTH).unwrap(),
            &HeaderValue::from_static("999")
        );
    }
}
