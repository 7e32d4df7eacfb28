use crate::base::neterror::NetError;
use crate::cookies::jar::CookieJar;
use crate::cookies::requestcookies::RequestCookies;
use crate::http::message::OutgoingMessage;
use crate::http::response::HttpResponse;
use crate::http::transport::HttpTransport;
use http::Version;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// One request/response exchange.
/// Named after net::HttpNetworkTransaction; the network work itself is
/// delegated to an [`HttpTransport`].
pub struct HttpTransaction<'a> {
    transport: &'a Arc<dyn HttpTransport>,
    jar: Option<&'a CookieJar>,
    timeout: Option<Duration>,
}

impl<'a> HttpTransaction<'a> {
    /// `jar` receives the response's cookies; pass `None` when cookies are
    /// disabled.
    pub fn new(
        transport: &'a Arc<dyn HttpTransport>,
        jar: Option<&'a CookieJar>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            transport,
            jar,
            timeout,
        }
    }

    /// Build the message to send from a request description and its
    /// cookies. Jar cookies are only included when `include_jar` is set;
    /// explicit cookies always are.
    pub fn prepare(
        description: &OutgoingMessage,
        cookies: &RequestCookies,
        include_jar: bool,
        version: Version,
    ) -> OutgoingMessage {
        let mut outgoing = description.clone();
        outgoing.version = version;
        if let Some(cookie_header) = cookies.header_value(include_jar) {
            outgoing.headers.insert("Cookie", cookie_header);
        }
        outgoing
    }

    /// Send `message`, bounded by the timeout and by `caller`.
    ///
    /// Returns [`NetError::Cancelled`] if `caller` fired and
    /// [`NetError::ConnectionTimedOut`] if the timeout did. The timer and
    /// the transport's token are released as soon as this returns.
    pub async fn send(
        &self,
        message: OutgoingMessage,
        caller: &CancellationToken,
    ) -> Result<HttpResponse, NetError> {
        let url = message.url.clone();
        let linked = caller.child_token();
        let _guard = linked.clone().drop_guard();

        let sending = self.transport.send(message, linked.clone());
        let deadline = async {
            match self.timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending::<()>().await,
            }
        };

        let result = tokio::select! {
            biased;
            _ = caller.cancelled() => Err(NetError::Cancelled),
            result = sending => result.map_err(|e| {
                if caller.is_cancelled() { NetError::Cancelled } else { e }
            }),
            _ = deadline => {
                tracing::debug!(url = %url, timeout = ?self.timeout, "hop timed out");
                Err(NetError::ConnectionTimedOut)
            }
        };

        if let (Ok(response), Some(jar)) = (&result, self.jar) {
            let accepted = jar.record_response(&url, response.headers());
            if accepted > 0 {
                tracing::trace!(url = %url, accepted, "stored response cookies");
            }
        }

        result
    }
}
