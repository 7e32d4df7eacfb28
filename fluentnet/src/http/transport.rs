//! The transport seam: send one prepared message, get one response.

use crate::base::context::TransportResultExt;
use crate::base::neterror::NetError;
use crate::http::message::OutgoingMessage;
use crate::http::response::HttpResponse;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::future::Future;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

/// Alias for the `Future` type returned by a transport.
pub type Sending = Pin<Box<dyn Future<Output = Result<HttpResponse, NetError>> + Send>>;

/// Trait for sending prepared messages.
///
/// This is the only way the engine touches the network. Implementations
/// must be thread-safe and must stop work promptly once `cancel` fires.
/// The engine composes its per-hop timeout into `cancel`, so a transport
/// never needs its own.
pub trait HttpTransport: Send + Sync {
    fn send(&self, message: OutgoingMessage, cancel: CancellationToken) -> Sending;
}

/// Plain HTTP/1.1 transport over hyper-util's pooled client.
///
/// `https` URLs are refused with [`NetError::DisallowedUrlScheme`];
/// inject another [`HttpTransport`] to reach TLS endpoints.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HyperTransport {
    pub fn new() -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
        }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport for HyperTransport {
    fn send(&self, message: OutgoingMessage, cancel: CancellationToken) -> Sending {
        let client = self.client.clone();
        Box::pin(async move {
            if message.url.scheme() != "http" {
                return Err(NetError::DisallowedUrlScheme);
            }
            let request = message.to_http_request()?;
            let url = message.url;

            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(NetError::ConnectionAborted),
                result = client.request(request) => result.connection_context(&url)?,
            };

            let (parts, body) = response.into_parts();
            let body = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(NetError::ConnectionAborted),
                collected = body.collect() => collected.map_err(|_| NetError::HttpBodyError)?.to_bytes(),
            };

            tracing::debug!(url = %url, status = parts.status.as_u16(), "response received");
            Ok(HttpResponse::from_parts(parts, body))
        })
    }
}
