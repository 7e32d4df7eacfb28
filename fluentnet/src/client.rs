//! HTTP Client with builder pattern.
//!
//! A client holds defaults shared by the requests it creates: a base URL,
//! default headers, a settings scope, hooks and an optional cookie jar
//! (a "cookie session").
//!
//! # Example
//!
//! ```rust,no_run
//! use fluentnet::Client;
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), fluentnet::NetError> {
//! let client = Client::builder()
//!     .base_url("http://api.example.com/v1")
//!     .header("Accept", "application/json")
//!     .timeout(Duration::from_secs(30))
//!     .cookie_session()
//!     .build();
//!
//! let call = client.get("users").send().await?;
//! # Ok(())
//! # }
//! ```

use crate::base::neterror::NetError;
use crate::cookies::jar::CookieJar;
use crate::http::orderedheaders::OrderedHeaderMap;
use crate::settings::{RedirectOptions, SettingsScope};
use crate::urlrequest::call::CallRecord;
use crate::urlrequest::context::URLRequestContext;
use crate::urlrequest::hooks::{EventHandlers, HookFuture, HookPoint};
use crate::urlrequest::request::URLRequest;
use http::Method;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// HTTP Client for making requests.
///
/// Use [`Client::builder()`] to configure and create a client. Cloning is
/// cheap and clones share settings, hooks and cookies.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientRef>,
}

struct ClientRef {
    context: Arc<URLRequestContext>,
    base_url: Option<String>,
    headers: OrderedHeaderMap,
    settings: Arc<SettingsScope>,
    handlers: Arc<EventHandlers>,
    cookie_jar: Option<Arc<CookieJar>>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Create a new client on the process-wide context.
    pub fn new() -> Self {
        ClientBuilder::default().build()
    }

    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Start building a GET request.
    pub fn get<U: AsRef<str>>(&self, url: U) -> URLRequest {
        self.request(Method::GET, url)
    }

    /// Start building a POST request.
    pub fn post<U: AsRef<str>>(&self, url: U) -> URLRequest {
        self.request(Method::POST, url)
    }

    /// Start building a PUT request.
    pub fn put<U: AsRef<str>>(&self, url: U) -> URLRequest {
        self.request(Method::PUT, url)
    }

    /// Start building a DELETE request.
    pub fn delete<U: AsRef<str>>(&self, url: U) -> URLRequest {
        self.request(Method::DELETE, url)
    }

    /// Start building a HEAD request.
    pub fn head<U: AsRef<str>>(&self, url: U) -> URLRequest {
        self.request(Method::HEAD, url)
    }

    /// Start building a PATCH request.
    pub fn patch<U: AsRef<str>>(&self, url: U) -> URLRequest {
        self.request(Method::PATCH, url)
    }

    /// Start building a request with custom method.
    ///
    /// A relative `url` is appended to the base URL's path.
    pub fn request<U: AsRef<str>>(&self, method: Method, url: U) -> URLRequest {
        let inner = &self.inner;
        let url = resolve_url(inner.base_url.as_deref(), url.as_ref());
        URLRequest::from_parts(
            Arc::clone(&inner.context),
            Some(Arc::clone(&inner.handlers)),
            SettingsScope::child_of(&inner.settings),
            method,
            url,
            inner.headers.clone(),
            inner.cookie_jar.clone(),
        )
    }

    pub fn context(&self) -> &Arc<URLRequestContext> {
        &self.inner.context
    }

    pub fn base_url(&self) -> Option<&str> {
        self.inner.base_url.as_deref()
    }

    /// Headers copied into every new request.
    pub fn headers(&self) -> &OrderedHeaderMap {
        &self.inner.headers
    }

    /// The client's settings scope. Changes apply to requests created
    /// later and to live requests that have not overridden the value.
    pub fn settings(&self) -> &Arc<SettingsScope> {
        &self.inner.settings
    }

    /// Client hooks; they run after global hooks and before request hooks.
    pub fn handlers(&self) -> &Arc<EventHandlers> {
        &self.inner.handlers
    }

    pub fn cookie_jar(&self) -> Option<&Arc<CookieJar>> {
        self.inner.cookie_jar.as_ref()
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url)
            .field("headers", &self.inner.headers)
            .field("settings", &self.inner.settings)
            .field("cookie_session", &self.inner.cookie_jar.is_some())
            .finish()
    }
}

/// Builder for creating a [`Client`].
pub struct ClientBuilder {
    context: Option<Arc<URLRequestContext>>,
    base_url: Option<String>,
    headers: OrderedHeaderMap,
    settings: Arc<SettingsScope>,
    handlers: EventHandlers,
    cookie_jar: Option<Arc<CookieJar>>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            context: None,
            base_url: None,
            headers: OrderedHeaderMap::new(),
            settings: SettingsScope::detached(),
            handlers: EventHandlers::new(),
            cookie_jar: None,
        }
    }
}

impl ClientBuilder {
    /// Use `context` instead of the process-wide one.
    pub fn context(mut self, context: Arc<URLRequestContext>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Add a default header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set request timeout.
    pub fn timeout(self, timeout: Duration) -> Self {
        self.settings.set_timeout(Some(timeout));
        self
    }

    pub fn no_timeout(self) -> Self {
        self.settings.set_timeout(None);
        self
    }

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

    /// Share `jar` between every request of the client.
    pub fn cookie_jar(mut self, jar: Arc<CookieJar>) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    /// Start the client with a fresh, empty jar.
    pub fn cookie_session(self) -> Self {
        self.cookie_jar(Arc::new(CookieJar::new()))
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

    /// Build the client.
    pub fn build(self) -> Client {
        let context = self.context.unwrap_or_else(URLRequestContext::global);
        let settings = SettingsScope::child_with_values(context.settings(), &self.settings);
        Client {
            inner: Arc::new(ClientRef {
                context,
                base_url: self.base_url,
                headers: self.headers,
                settings,
                handlers: Arc::new(self.handlers),
                cookie_jar: self.cookie_jar,
            }),
        }
    }
}

/// Resolve `url` against an optional base, appending relative paths to the
/// base path rather than replacing its last segment.
fn resolve_url(base: Option<&str>, url: &str) -> Result<Url, NetError> {
    match Url::parse(url) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = base.ok_or(NetError::InvalidUrl)?;
            let mut base = Url::parse(base).map_err(|_| NetError::InvalidUrl)?;
            if !base.path().ends_with('/') {
                let path = format!("{}/", base.path());
                base.set_path(&path);
            }
            base.join(url.trim_start_matches('/'))
                .map_err(|_| NetError::InvalidUrl)
        }
        Err(_) => Err(NetError::InvalidUrl),
    }
}
