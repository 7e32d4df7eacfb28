//! URL Request Context - root configuration for calls.
//!
//! Based on Chromium's net::URLRequestContext. A context owns the root
//! settings scope, the global hooks and the transport. Clients and
//! requests hang their own scopes off it. Tests build their own context
//! with a scripted transport and, if needed, an override scope that wins
//! over every other scope.

use crate::http::transport::{HttpTransport, HyperTransport};
use crate::settings::{Settings, SettingsScope};
use crate::urlrequest::hooks::EventHandlers;
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::Arc;

static GLOBAL: Lazy<Arc<URLRequestContext>> = Lazy::new(|| Arc::new(URLRequestContext::new()));

/// Root of the settings chain and owner of the transport.
pub struct URLRequestContext {
    /// Fully populated default settings.
    settings: Arc<SettingsScope>,

    /// Scope consulted before any other, when set.
    overrides: Option<Arc<SettingsScope>>,

    /// Hooks that run for every call made through this context.
    handlers: EventHandlers,

    transport: Arc<dyn HttpTransport>,
}

impl URLRequestContext {
    /// Create a context with default settings and a [`HyperTransport`].
    pub fn new() -> Self {
        Self::with_transport(Arc::new(HyperTransport::new()))
    }

    /// Create a context that sends through `transport`.
    pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            settings: SettingsScope::root(),
            overrides: None,
            handlers: EventHandlers::new(),
            transport,
        }
    }

    /// Install a scope that takes precedence over request, client and
    /// root settings.
    pub fn with_overrides(mut self, overrides: Arc<SettingsScope>) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// The process-wide context used by [`Client::new`](crate::Client::new)
    /// and [`URLRequest::new`](super::request::URLRequest::new).
    pub fn global() -> Arc<URLRequestContext> {
        Arc::clone(&GLOBAL)
    }

    /// Root settings scope.
    pub fn settings(&self) -> &Arc<SettingsScope> {
        &self.settings
    }

    pub fn overrides(&self) -> Option<&Arc<SettingsScope>> {
        self.overrides.as_ref()
    }

    /// Resolver for a scope chained under this context.
    pub fn resolver_for(&self, scope: &Arc<SettingsScope>) -> Settings {
        Settings::new(self.overrides.clone(), Arc::clone(scope))
    }

    /// Global hooks.
    pub fn handlers(&self) -> &EventHandlers {
        &self.handlers
    }

    pub fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }
}

impl Default for URLRequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for URLRequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("URLRequestContext")
            .field("settings", &self.settings)
            .field("overrides", &self.overrides.is_some())
            .field("handlers", &self.handlers)
            .finish()
    }
}
