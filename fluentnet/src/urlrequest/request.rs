use crate::base::neterror::NetError;
use crate::cookies::jar::CookieJar;
use crate::cookies::requestcookies::RequestCookies;
use crate::http::message::{OutgoingMessage, RequestBody};
use crate::http::orderedheaders::OrderedHeaderMap;
use crate::settings::{RedirectOptions, SettingsScope};
use crate::urlrequest::call::CallRecord;
use crate::urlrequest::context::URLRequestContext;
use crate::urlrequest::hooks::{EventHandlers, HookFuture, HookPoint};
use crate::urlrequest::job::URLRequestHttpJob;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http::Method;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A single fluent request.
///
/// Configuration errors (an unparsable URL, a body that fails to
/// serialize) are deferred and returned by [`URLRequest::send`].
///
/// ```rust,no_run
/// use fluentnet::urlrequest::URLRequest;
///
/// # async fn run() -> Result<(), fluentnet::NetError> {
/// let call = URLRequest::new("http://example.com/api")
///     .header("Accept", "application/json")
///     .with_cookie("session", "abc")
///     .send()
///     .await?;
/// println!("{}", call.response.map(|r| r.status()).unwrap_or_default());
/// # Ok(())
/// # }
/// ```
pub struct URLRequest {
    context: Arc<URLRequestContext>,
    client_handlers: Option<Arc<EventHandlers>>,
    method: Method,
    url: Result<Url, NetError>,
    headers: OrderedHeaderMap,
    body: RequestBody,
    deferred: Option<NetError>,
    cookies: Option<Arc<RequestCookies>>,
    jar: Option<Arc<CookieJar>>,
    settings: Arc<SettingsScope>,
    handlers: EventHandlers,
    cancel: CancellationToken,
}

impl URLRequest {
    /// A GET request on the process-wide context.
    pub fn new(url: &str) -> Self {
        Self::with_context(URLRequestContext::global(), Method::GET, url)
    }

    pub fn with_context(context: Arc<URLRequestContext>, method: Method, url: &str) -> Self {
        let url = Url::parse(url).map_err(|_| NetError::InvalidUrl);
        let settings = SettingsScope::child_of(context.settings());
        Self::from_parts(context, None, settings, method, url, OrderedHeaderMap::new(), None)
    }

    pub(crate) fn from_parts(
        context: Arc<URLRequestContext>,
        client_handlers: Option<Arc<EventHandlers>>,
        settings: Arc<SettingsScope>,
        method: Method,
        url: Result<Url, NetError>,
        headers: OrderedHeaderMap,
        jar: Option<Arc<CookieJar>>,
    ) -> Self {
        let cookies = url
            .as_ref()
            .ok()
            .map(|u| Arc::new(RequestCookies::new(u.clone())));
        if let (Some(cookies), Some(jar)) = (&cookies, &jar) {
            jar.register(cookies);
        }
        Self {
            context,
            client_handlers,
            method,
            url,
            headers,
            body: RequestBody::Empty,
            deferred: None,
            cookies,
            jar,
            settings,
            handlers: EventHandlers::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref().ok()
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn headers(&self) -> &OrderedHeaderMap {
        &self.headers
    }

    /// Cookies that will be sent, kept in sync with the attached jar.
    pub fn cookies(&self) -> Option<&Arc<RequestCookies>> {
        self.cookies.as_ref()
    }

    pub fn cookie_jar(&self) -> Option<&Arc<CookieJar>> {
        self.jar.as_ref()
    }

    /// This request's settings scope; unset values fall back to the client
    /// and then to the root context.
    pub fn settings(&self) -> &Arc<SettingsScope> {
        &self.settings
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set a header, replacing any existing value of the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn remove_header(mut self, name: &str) -> Self {
        self.headers.remove(name);
        self
    }

    pub fn basic_auth(self, username: &str, password: &str) -> Self {
        let encoded = STANDARD.encode(format!("{}:{}", username, password));
        self.header("Authorization", format!("Basic {}", encoded))
    }

    pub fn bearer_auth(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }

    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = body.into();
        self
    }

    /// Serialize `value` as the JSON body and set `Content-Type`.
    #[cfg(feature = "json")]
    pub fn json<T: serde::Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                self.body = RequestBody::from(bytes);
                self.headers.insert("Content-Type", "application/json");
            }
            Err(e) => {
                self.deferred = Some(NetError::InvalidOperation(format!(
                    "request body could not be serialized: {}",
                    e
                )));
            }
        }
        self
    }

    /// Send a cookie with this request regardless of any jar.
    pub fn with_cookie(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Some(cookies) = &self.cookies {
            cookies.set_explicit(name, value);
        }
        self
    }

    /// Read cookies from `jar` and store response cookies back into it.
    pub fn with_cookies(mut self, jar: &Arc<CookieJar>) -> Self {
        if let Some(previous) = &self.cookies {
            // Drop jar values synced from a previous jar but keep explicit ones.
            let cookies = Arc::new(RequestCookies::new(previous.url()));
            for (name, value) in previous.entries() {
                if previous.is_explicit(&name) {
                    cookies.set_explicit(name, value);
                }
            }
            jar.register(&cookies);
            self.cookies = Some(cookies);
        }
        self.jar = Some(Arc::clone(jar));
        self
    }

    pub fn timeout(self, timeout: Duration) -> Self {
        self.settings.set_timeout(Some(timeout));
        self
    }

    pub fn no_timeout(self) -> Self {
        self.settings.set_timeout(None);
        self
    }

    /// Treat statuses matching `pattern` (e.g. `"404,5xx"`) as success.
    pub fn allow_http_status(self, pattern: &str) -> Result<Self, NetError> {
        self.settings.set_allowed_http_status(pattern)?;
        Ok(self)
    }

    pub fn allow_any_http_status(self) -> Self {
        self.settings.allow_any_http_status();
        self
    }

    pub fn with_redirects(self, configure: impl FnOnce(&RedirectOptions<'_>)) -> Self {
        configure(&self.settings.redirects());
        self
    }

    pub fn with_settings(self, configure: impl FnOnce(&SettingsScope)) -> Self {
        configure(&self.settings);
        self
    }

    /// Cancel the call when `token` fires.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn before_call<F>(self, hook: F) -> Self
    where
        F: for<'a> Fn(&'a mut CallRecord) -> HookFuture<'a> + Send + Sync + 'static,
    {
        self.handlers.add(HookPoint::BeforeCall, hook);
        self
    }

    pub fn after_call<F>(self, hook: F) -> Self
    where
        F: for<'a> Fn(&'a mut CallRecord) -> HookFuture<'a> + Send + Sync + 'static,
    {
        self.handlers.add(HookPoint::AfterCall, hook);
        self
    }

    pub fn on_error<F>(self, hook: F) -> Self
    where
        F: for<'a> Fn(&'a mut CallRecord) -> HookFuture<'a> + Send + Sync + 'static,
    {
        self.handlers.add(HookPoint::OnError, hook);
        self
    }

    pub fn on_redirect<F>(self, hook: F) -> Self
    where
        F: for<'a> Fn(&'a mut CallRecord) -> HookFuture<'a> + Send + Sync + 'static,
    {
        self.handlers.add(HookPoint::OnRedirect, hook);
        self
    }

    fn into_job(self) -> Result<PreparedJob, NetError> {
        if let Some(err) = self.deferred {
            return Err(err);
        }
        let url = self.url?;
        let cookies = self
            .cookies
            .unwrap_or_else(|| Arc::new(RequestCookies::new(url.clone())));

        let mut description = OutgoingMessage::new(self.method, url);
        description.headers = self.headers;
        description.body = self.body;

        let settings = self.context.resolver_for(&self.settings);
        let job = URLRequestHttpJob::new(
            self.context,
            self.client_handlers,
            self.handlers,
            settings,
            self.jar,
            self.cancel,
        );
        Ok((job, description, cookies))
    }

    /// Send the request, following redirects.
    pub async fn send(self) -> Result<CallRecord, NetError> {
        let (mut job, description, cookies) = self.into_job()?;
        job.start(description, cookies).await
    }

    /// Send and deserialize the final response body.
    ///
    /// An empty body yields `None`. A body that does not parse fails the
    /// call through the `OnError` hooks.
    pub async fn receive_json<T: DeserializeOwned>(self) -> Result<Option<T>, NetError> {
        let (mut job, description, cookies) = self.into_job()?;
        let mut call = job.start(description, cookies).await?;

        let parsed = match call.response.as_ref() {
            Some(response) if !response.body().is_empty() => response.json::<T>().map(Some),
            _ => Ok(None),
        };
        match parsed {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::debug!(url = %call.request.url, error = %e, "response body did not parse");
                call.error = Some(e);
                job.fail(call).await.map(|_| None)
            }
        }
    }
}

type PreparedJob = (URLRequestHttpJob, OutgoingMessage, Arc<RequestCookies>);

impl std::fmt::Debug for URLRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("URLRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}
