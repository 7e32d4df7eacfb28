//! Records of individual hops.

use crate::base::neterror::NetError;
use crate::http::message::OutgoingMessage;
use crate::http::response::HttpResponse;
use crate::urlrequest::redirect::RedirectDecision;
use std::time::Duration;
use time::OffsetDateTime;
use url::Url;

/// Everything known about one hop of a logical call.
///
/// A record is created when the hop is built and filled in as the hop
/// progresses. Only the engine and hook callbacks mutate it. When a hop
/// follows a redirect, the record of the previous hop is owned by
/// `redirected_from`, so the final record carries the whole chain.
#[derive(Debug, Clone)]
pub struct CallRecord {
    /// The request as described by the caller for this hop, before
    /// cookies were attached.
    pub request: OutgoingMessage,
    /// The message handed to the transport. `BeforeCall` hooks may alter it.
    pub outgoing: OutgoingMessage,
    pub response: Option<HttpResponse>,
    /// Why the hop failed: a transport error, a timeout, or a status that
    /// is not allowed.
    pub error: Option<NetError>,
    /// Set by an `OnError` hook to return the call instead of failing.
    pub error_handled: bool,
    pub started_at: OffsetDateTime,
    pub ended_at: Option<OffsetDateTime>,
    /// The redirect this hop's response asked for, if any.
    pub redirect: Option<RedirectDecision>,
    pub redirected_from: Option<Box<CallRecord>>,
}

impl CallRecord {
    pub(crate) fn new(
        request: OutgoingMessage,
        outgoing: OutgoingMessage,
        redirected_from: Option<Box<CallRecord>>,
    ) -> Self {
        Self {
            request,
            outgoing,
            response: None,
            error: None,
            error_handled: false,
            started_at: OffsetDateTime::now_utc(),
            ended_at: None,
            redirect: None,
            redirected_from,
        }
    }

    /// Whether the hop completed with a response and no error.
    pub fn succeeded(&self) -> bool {
        self.response.is_some() && self.error.is_none()
    }

    pub fn completed(&self) -> bool {
        self.ended_at.is_some()
    }

    pub fn duration(&self) -> Option<Duration> {
        let ended = self.ended_at?;
        Duration::try_from(ended - self.started_at).ok()
    }

    /// URLs visited by this logical call up to and including this hop,
    /// oldest first.
    pub fn redirect_chain(&self) -> Vec<Url> {
        let mut chain = Vec::new();
        let mut current = Some(self);
        while let Some(call) = current {
            chain.push(call.request.url.clone());
            current = call.redirected_from.as_deref();
        }
        chain.reverse();
        chain
    }

    /// Number of hops in this logical call so far.
    pub fn hop_count(&self) -> usize {
        let mut count = 1;
        let mut current = self.redirected_from.as_deref();
        while let Some(call) = current {
            count += 1;
            current = call.redirected_from.as_deref();
        }
        count
    }

    pub(crate) fn failure_summary(&self) -> String {
        let target = format!("{} {}", self.request.method, self.request.url);
        match (&self.response, &self.error) {
            (Some(response), _) => format!(
                "Call failed with status code {}: {target}",
                response.status().as_u16()
            ),
            (None, Some(error)) => format!("Call failed: {error}: {target}"),
            (None, None) => format!("Call failed: {target}"),
        }
    }
}
