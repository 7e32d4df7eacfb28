use crate::base::callstate::CallState;
use crate::base::neterror::NetError;
use crate::cookies::jar::CookieJar;
use crate::cookies::requestcookies::RequestCookies;
use crate::http::message::OutgoingMessage;
use crate::http::statusrange;
use crate::http::transaction::HttpTransaction;
use crate::settings::Settings;
use crate::urlrequest::call::CallRecord;
use crate::urlrequest::context::URLRequestContext;
use crate::urlrequest::hooks::{self, EventHandlers, HookPoint};
use crate::urlrequest::redirect;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Runs one logical call: hops, hooks, redirects and failure classification.
pub struct URLRequestHttpJob {
    context: Arc<URLRequestContext>,
    client_handlers: Option<Arc<EventHandlers>>,
    request_handlers: EventHandlers,
    settings: Settings,
    jar: Option<Arc<CookieJar>>,
    cancel: CancellationToken,
    state: CallState,
}

impl URLRequestHttpJob {
    pub fn new(
        context: Arc<URLRequestContext>,
        client_handlers: Option<Arc<EventHandlers>>,
        request_handlers: EventHandlers,
        settings: Settings,
        jar: Option<Arc<CookieJar>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            context,
            client_handlers,
            request_handlers,
            settings,
            jar,
            cancel,
            state: CallState::Idle,
        }
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    fn transition(&mut self, next: CallState) {
        if !self.state.can_transition_to(next) {
            tracing::debug!(from = ?self.state, to = ?next, "unexpected call state transition");
        }
        tracing::trace!(from = ?self.state, to = ?next, "call state");
        self.state = next;
    }

    /// Hooks run global first, then client, then request.
    async fn fire(&self, point: HookPoint, call: &mut CallRecord) -> Result<(), NetError> {
        let mut scopes: Vec<&EventHandlers> = vec![self.context.handlers()];
        if let Some(client) = &self.client_handlers {
            scopes.push(client);
        }
        scopes.push(&self.request_handlers);
        hooks::dispatch(&scopes, point, call).await
    }

    /// Like [`fire`](Self::fire), but a hook error fails the job.
    async fn fire_in_call(
        &mut self,
        point: HookPoint,
        call: &mut CallRecord,
    ) -> Result<(), NetError> {
        let result = self.fire(point, call).await;
        if result.is_err() {
            self.transition(CallState::Failed);
        }
        result
    }

    /// Fresh outgoing cookie state for a redirect hop, synced to the jar.
    fn cookies_for(&self, url: &Url) -> Arc<RequestCookies> {
        let cookies = Arc::new(RequestCookies::new(url.clone()));
        if let Some(jar) = &self.jar {
            jar.register(&cookies);
        }
        cookies
    }

    /// Send `description` and follow redirects until a final response.
    ///
    /// Returns the final hop's record; earlier hops hang off
    /// [`CallRecord::redirected_from`].
    pub async fn start(
        &mut self,
        description: OutgoingMessage,
        cookies: Arc<RequestCookies>,
    ) -> Result<CallRecord, NetError> {
        let mut description = description;
        let mut cookies = cookies;
        let mut previous: Option<CallRecord> = None;

        loop {
            self.transition(CallState::Building);
            if self.cancel.is_cancelled() {
                self.transition(CallState::Failed);
                return Err(NetError::Cancelled);
            }

            let cookies_enabled = self.settings.cookies_enabled();
            let outgoing = HttpTransaction::prepare(
                &description,
                &cookies,
                cookies_enabled,
                self.settings.http_version(),
            );
            let mut call =
                CallRecord::new(description.clone(), outgoing, previous.take().map(Box::new));
            self.fire_in_call(HookPoint::BeforeCall, &mut call).await?;

            self.transition(CallState::Sending);
            tracing::debug!(
                method = %call.outgoing.method,
                url = %call.outgoing.url,
                hop = call.hop_count(),
                "sending request"
            );
            let jar = if cookies_enabled { self.jar.as_deref() } else { None };
            let transaction =
                HttpTransaction::new(self.context.transport(), jar, self.settings.timeout());
            match transaction.send(call.outgoing.clone(), &self.cancel).await {
                Ok(response) => call.response = Some(response),
                Err(e) => call.error = Some(e),
            }
            call.ended_at = Some(OffsetDateTime::now_utc());
            self.fire_in_call(HookPoint::AfterCall, &mut call).await?;

            if call.error.is_some() {
                return self.fail(call).await;
            }

            let decision = match redirect::decide(&call, &self.settings.redirects()) {
                Ok(decision) => decision,
                Err(e) => {
                    self.transition(CallState::Failed);
                    return Err(e);
                }
            };
            if let Some(decision) = decision {
                call.redirect = Some(decision);
                self.fire_in_call(HookPoint::OnRedirect, &mut call).await?;

                if let Some(decision) = call.redirect.clone().filter(|d| d.follow) {
                    self.transition(CallState::Redirecting);
                    tracing::debug!(
                        url = %decision.url,
                        follow_count = decision.follow_count,
                        change_verb_to_get = decision.change_verb_to_get,
                        "following redirect"
                    );
                    description = decision.next_request(&call.request);
                    cookies = self.cookies_for(&description.url);
                    previous = Some(call);
                    continue;
                }
            }

            let allowed = self.settings.allowed_http_status();
            match call.response.as_ref().map(|r| r.status().as_u16()) {
                Some(status) if statusrange::is_success(status, allowed.as_ref()) => {
                    self.transition(CallState::Completed);
                    return Ok(call);
                }
                Some(status) => {
                    call.error = Some(NetError::UnexpectedStatus { status });
                    return self.fail(call).await;
                }
                None => {
                    call.error = Some(NetError::EmptyResponse);
                    return self.fail(call).await;
                }
            }
        }
    }

    /// Run `OnError` hooks for `call`, which must carry an error.
    ///
    /// A hook that sets `error_handled` turns the failure back into a
    /// successful return of the record.
    pub async fn fail(&mut self, mut call: CallRecord) -> Result<CallRecord, NetError> {
        self.transition(CallState::Failed);
        self.fire(HookPoint::OnError, &mut call).await?;
        if call.error_handled {
            tracing::debug!(url = %call.request.url, "call error handled by hook");
            return Ok(call);
        }
        Err(classify(call))
    }
}

fn classify(call: CallRecord) -> NetError {
    match call.error.clone() {
        Some(NetError::Cancelled) => NetError::Cancelled,
        Some(NetError::ConnectionTimedOut) => NetError::CallTimedOut {
            call: Box::new(call),
        },
        Some(NetError::ResponseParsingFailed { message, .. }) => NetError::ResponseParsingFailed {
            message,
            call: Some(Box::new(call)),
        },
        _ => NetError::CallFailed {
            call: Box::new(call),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::HttpResponse;
    use crate::http::transport::{HttpTransport, Sending};
    use crate::settings::SettingsScope;
    use http::{Method, StatusCode};

    struct FixedStatus(StatusCode);

    impl HttpTransport for FixedStatus {
        fn send(&self, _message: OutgoingMessage, _cancel: CancellationToken) -> Sending {
            let status = self.0;
            Box::pin(async move { Ok(HttpResponse::new(status)) })
        }
    }

    fn job(status: StatusCode, cancel: CancellationToken) -> (URLRequestHttpJob, OutgoingMessage) {
        let context = Arc::new(URLRequestContext::with_transport(Arc::new(FixedStatus(status))));
        let settings = context.resolver_for(&SettingsScope::child_of(context.settings()));
        let url = Url::parse("http://example.com/").unwrap();
        let job =
            URLRequestHttpJob::new(context, None, EventHandlers::new(), settings, None, cancel);
        (job, OutgoingMessage::new(Method::GET, url))
    }

    fn cookies(message: &OutgoingMessage) -> Arc<RequestCookies> {
        Arc::new(RequestCookies::new(message.url.clone()))
    }

    #[tokio::test]
    async fn test_success_completes() {
        let (mut job, message) = job(StatusCode::OK, CancellationToken::new());
        let cookies = cookies(&message);
        let call = job.start(message, cookies).await.unwrap();
        assert!(call.succeeded());
        assert!(call.ended_at.is_some());
        assert_eq!(job.state(), CallState::Completed);
    }

    #[tokio::test]
    async fn test_server_error_fails_with_record() {
        let (mut job, message) = job(StatusCode::INTERNAL_SERVER_ERROR, CancellationToken::new());
        let cookies = cookies(&message);
        let err = job.start(message, cookies).await.unwrap_err();
        assert!(matches!(err, NetError::CallFailed { .. }));
        assert_eq!(err.status(), Some(500));
        assert_eq!(job.state(), CallState::Failed);
    }

    #[tokio::test]
    async fn test_cancelled_before_first_hop() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let (mut job, message) = job(StatusCode::OK, cancel);
        let cookies = cookies(&message);
        let err = job.start(message, cookies).await.unwrap_err();
        assert!(matches!(err, NetError::Cancelled));
    }

    #[tokio::test]
    async fn test_before_call_error_fails_job() {
        let context = Arc::new(URLRequestContext::with_transport(Arc::new(FixedStatus(
            StatusCode::OK,
        ))));
        let settings = context.resolver_for(&SettingsScope::child_of(context.settings()));
        let handlers = EventHandlers::new();
        handlers.add(HookPoint::BeforeCall, |_| {
            Box::pin(async { Err(NetError::InvalidOperation("denied".into())) })
        });
        let mut job = URLRequestHttpJob::new(
            context,
            None,
            handlers,
            settings,
            None,
            CancellationToken::new(),
        );
        let url = Url::parse("http://example.com/").unwrap();
        let message = OutgoingMessage::new(Method::GET, url);
        let cookies = cookies(&message);

        let err = job.start(message, cookies).await.unwrap_err();
        assert!(matches!(err, NetError::InvalidOperation(_)));
        assert_eq!(job.state(), CallState::Failed);
    }

    #[test]
    fn test_classify_maps_timeouts() {
        let url = Url::parse("http://example.com/").unwrap();
        let message = OutgoingMessage::new(Method::GET, url);
        let mut call = CallRecord::new(message.clone(), message, None);
        call.error = Some(NetError::ConnectionTimedOut);
        assert!(matches!(classify(call.clone()), NetError::CallTimedOut { .. }));

        call.error = Some(NetError::Cancelled);
        assert!(matches!(classify(call), NetError::Cancelled));
    }
}
