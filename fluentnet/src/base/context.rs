//! Ergonomic error context helpers.
//!
//! Provides extension traits for adding context to `Result` types,
//! converting transport and parser errors into context-rich `NetError`
//! variants.

use crate::base::neterror::NetError;
use url::Url;

/// Extension trait for adding connection context to transport Results.
pub trait TransportResultExt<T> {
    /// Add connection context to a transport error.
    ///
    /// # Example
    /// ```ignore
    /// use fluentnet::base::context::TransportResultExt;
    ///
    /// let response = client.request(req).await
    ///     .connection_context(&url)?;
    /// // Error: "Connection to example.com:80 failed: connection refused"
    /// ```
    fn connection_context(self, url: &Url) -> Result<T, NetError>;
}

impl<T> TransportResultExt<T> for Result<T, hyper_util::client::legacy::Error> {
    fn connection_context(self, url: &Url) -> Result<T, NetError> {
        self.map_err(|e| {
            if e.is_connect() {
                let host = url.host_str().unwrap_or_default();
                let port = url.port_or_known_default().unwrap_or(80);
                NetError::connection_failed_to(host, port, &e)
            } else {
                tracing::debug!(url = %url, error = %e, "transport failed after connect");
                NetError::ConnectionClosed
            }
        })
    }
}

/// Extension trait for response body parsing Results.
pub trait ParseResultExt<T> {
    /// Convert a parser error into [`NetError::ResponseParsingFailed`].
    /// The call record is attached later by the engine.
    fn parsing_context(self) -> Result<T, NetError>;
}

impl<T> ParseResultExt<T> for Result<T, serde_json::Error> {
    fn parsing_context(self) -> Result<T, NetError> {
        self.map_err(|e| NetError::ResponseParsingFailed {
            message: e.to_string(),
            call: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsing_context() {
        let result: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err = result.parsing_context().unwrap_err();

        match err {
            NetError::ResponseParsingFailed { message, call } => {
                assert!(!message.is_empty());
                assert!(call.is_none());
            }
            _ => panic!("Expected ResponseParsingFailed"),
        }
    }
}
