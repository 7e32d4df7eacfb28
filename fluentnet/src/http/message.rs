//! Outgoing request messages and their bodies.

use crate::base::neterror::NetError;
use crate::http::orderedheaders::OrderedHeaderMap;
use bytes::Bytes;
use http::{Method, Version};
use http_body_util::Full;
use url::Url;

/// Request body for HTTP methods that send data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    /// No body (GET, HEAD, DELETE).
    #[default]
    Empty,
    /// Body with raw bytes.
    Bytes(Bytes),
}

impl From<String> for RequestBody {
    fn from(s: String) -> Self {
        RequestBody::Bytes(Bytes::from(s))
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(v: Vec<u8>) -> Self {
        RequestBody::Bytes(Bytes::from(v))
    }
}

impl From<&str> for RequestBody {
    fn from(s: &str) -> Self {
        RequestBody::Bytes(Bytes::from(s.to_owned()))
    }
}

impl From<Bytes> for RequestBody {
    fn from(b: Bytes) -> Self {
        RequestBody::Bytes(b)
    }
}

impl RequestBody {
    /// Check if the body is empty.
    pub fn is_empty(&self) -> bool {
        match self {
            RequestBody::Empty => true,
            RequestBody::Bytes(b) => b.is_empty(),
        }
    }

    /// Get the length of the body in bytes.
    pub fn len(&self) -> usize {
        match self {
            RequestBody::Empty => 0,
            RequestBody::Bytes(b) => b.len(),
        }
    }

    /// The body as a cheaply cloned byte buffer.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            RequestBody::Empty => Bytes::new(),
            RequestBody::Bytes(b) => b.clone(),
        }
    }
}

/// A fully prepared HTTP request, inspectable by value.
///
/// This is what a transport receives. Hooks see the same value on the
/// call record and may alter it before it is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub method: Method,
    pub url: Url,
    pub version: Version,
    pub headers: OrderedHeaderMap,
    pub body: RequestBody,
}

impl OutgoingMessage {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            version: Version::HTTP_11,
            headers: OrderedHeaderMap::new(),
            body: RequestBody::Empty,
        }
    }

    /// Convert into an `http::Request` for a hyper-based transport.
    /// The fragment is never sent.
    pub fn to_http_request(&self) -> Result<http::Request<Full<Bytes>>, NetError> {
        let mut target = self.url.clone();
        target.set_fragment(None);
        let mut request = http::Request::builder()
            .method(self.method.clone())
            .uri(target.as_str())
            .version(self.version)
            .body(Full::new(self.body.to_bytes()))
            .map_err(|_| NetError::InvalidUrl)?;
        *request.headers_mut() = self.headers.to_header_map()?;
        Ok(request)
    }
}
