//! HTTP Response with body access.

use crate::base::context::ParseResultExt;
use crate::base::neterror::NetError;
use bytes::Bytes;
use http::header::SET_COOKIE;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Version};

/// HTTP Response with a buffered body.
///
/// Transports collect the body before handing the response to the engine,
/// so a response can be cloned onto call records and inspected repeatedly.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
}

impl HttpResponse {
    /// Create an empty response with the given status.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Create from the parts of an `http::Response` and its collected body.
    pub fn from_parts(parts: http::response::Parts, body: Bytes) -> Self {
        Self {
            status: parts.status,
            version: parts.version,
            headers: parts.headers,
            body,
        }
    }

    /// Append a header. Invalid names or values are rejected.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, NetError> {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| NetError::InvalidHeader)?;
        let value = HeaderValue::from_str(value).map_err(|_| NetError::InvalidHeader)?;
        self.headers.append(name, value);
        Ok(self)
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the HTTP version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Get a reference to the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Every `Set-Cookie` value, in the order the server sent them.
    pub fn set_cookie_headers(&self) -> impl Iterator<Item = &str> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body as UTF-8 text.
    pub fn text(&self) -> Result<String, NetError> {
        String::from_utf8(self.body.to_vec()).map_err(|_| NetError::InvalidUtf8)
    }

    /// Deserialize the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, NetError> {
        serde_json::from_slice(&self.body).parsing_context()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_cookie_order() {
        let response = HttpResponse::new(StatusCode::OK)
            .with_header("Set-Cookie", "a=1")
            .unwrap()
            .with_header("X-Other", "x")
            .unwrap()
            .with_header("set-cookie", "a=2")
            .unwrap();
        let values: Vec<_> = response.set_cookie_headers().collect();
        assert_eq!(values, vec!["a=1", "a=2"]);
    }

    #[test]
    fn test_json_body() {
        let response = HttpResponse::new(StatusCode::OK).with_body(r#"{"id": 7}"#);
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["id"], 7);
    }

    #[test]
    fn test_json_parse_failure() {
        let response = HttpResponse::new(StatusCode::OK).with_body("<html>");
        let err = response.json::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, NetError::ResponseParsingFailed { .. }));
    }

    #[test]
    fn test_text_rejects_invalid_utf8() {
        let response = HttpResponse::new(StatusCode::OK).with_body(vec![0xff, 0xfe]);
        assert!(matches!(response.text(), Err(NetError::InvalidUtf8)));
    }
}
