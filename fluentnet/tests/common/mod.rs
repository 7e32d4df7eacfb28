//! Scripted in-memory transport shared by the call tests.
#![allow(dead_code)]

use fluentnet::http::transport::Sending;
use fluentnet::http::{HttpResponse, HttpTransport, OutgoingMessage};
use fluentnet::{Client, NetError, URLRequestContext};
use http::StatusCode;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

type Responder = Box<dyn Fn(&OutgoingMessage) -> Result<HttpResponse, NetError> + Send + Sync>;

/// Answers every message with `responder` and records what was sent.
pub struct ScriptedTransport {
    responder: Responder,
    delay: Option<Duration>,
    sent: Mutex<Vec<OutgoingMessage>>,
}

impl ScriptedTransport {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&OutgoingMessage) -> Result<HttpResponse, NetError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Box::new(responder),
            delay: None,
            sent: Mutex::new(Vec::new()),
        })
    }

    /// Like `new`, but each response takes `delay` unless cancelled.
    pub fn delayed<F>(delay: Duration, responder: F) -> Arc<Self>
    where
        F: Fn(&OutgoingMessage) -> Result<HttpResponse, NetError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Box::new(responder),
            delay: Some(delay),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

impl HttpTransport for ScriptedTransport {
    fn send(&self, message: OutgoingMessage, cancel: CancellationToken) -> Sending {
        self.sent.lock().push(message.clone());
        let result = (self.responder)(&message);
        let delay = self.delay;
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(NetError::ConnectionAborted),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            result
        })
    }
}

pub fn context(transport: &Arc<ScriptedTransport>) -> Arc<URLRequestContext> {
    Arc::new(URLRequestContext::with_transport(transport.clone()))
}

pub fn client(transport: &Arc<ScriptedTransport>) -> Client {
    Client::builder().context(context(transport)).build()
}

pub fn status(code: u16) -> Result<HttpResponse, NetError> {
    Ok(HttpResponse::new(
        StatusCode::from_u16(code).map_err(|_| NetError::InvalidResponse)?,
    ))
}

pub fn ok() -> Result<HttpResponse, NetError> {
    status(200)
}

pub fn redirect(code: u16, location: &str) -> Result<HttpResponse, NetError> {
    status(code)?.with_header("Location", location)
}

pub fn set_cookie(code: u16, set_cookie: &str) -> Result<HttpResponse, NetError> {
    status(code)?.with_header("Set-Cookie", set_cookie)
}
