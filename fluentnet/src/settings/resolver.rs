use crate::http::statusrange::StatusRange;
use crate::settings::scope::{
    SettingValues, SettingsScope, DEFAULT_MAX_AUTO_REDIRECTS, DEFAULT_TIMEOUT,
};
use http::Version;
use std::sync::Arc;
use std::time::Duration;

/// Redirect sub-settings resolved for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedirectSettings {
    pub enabled: bool,
    pub allow_secure_to_insecure: bool,
    pub forward_headers: bool,
    pub forward_authorization_header: bool,
    pub max_auto_redirects: u32,
}

impl Default for RedirectSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            allow_secure_to_insecure: false,
            forward_headers: true,
            forward_authorization_header: false,
            max_auto_redirects: DEFAULT_MAX_AUTO_REDIRECTS,
        }
    }
}

/// Resolves settings for a call.
///
/// Reads consult the override scope first, then the scope chain, and
/// bottom out at static defaults, so a read never fails.
#[derive(Debug, Clone)]
pub struct Settings {
    overrides: Option<Arc<SettingsScope>>,
    scope: Arc<SettingsScope>,
}

impl Settings {
    pub fn new(overrides: Option<Arc<SettingsScope>>, scope: Arc<SettingsScope>) -> Self {
        Self { overrides, scope }
    }

    /// The scope setters on this resolver's owner write to.
    pub fn scope(&self) -> &Arc<SettingsScope> {
        &self.scope
    }

    fn resolve<T>(&self, pick: impl Fn(&SettingValues) -> Option<T>) -> Option<T> {
        self.overrides
            .as_ref()
            .and_then(|o| o.lookup(&pick))
            .or_else(|| self.scope.lookup(&pick))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.resolve(|v| v.timeout).unwrap_or(Some(DEFAULT_TIMEOUT))
    }

    pub fn http_version(&self) -> Version {
        self.resolve(|v| v.http_version).unwrap_or(Version::HTTP_11)
    }

    pub fn allowed_http_status(&self) -> Option<StatusRange> {
        self.resolve(|v| v.allowed_http_status.clone()).flatten()
    }

    pub fn cookies_enabled(&self) -> bool {
        self.resolve(|v| v.cookies_enabled).unwrap_or(true)
    }

    pub fn redirects(&self) -> RedirectSettings {
        let defaults = RedirectSettings::default();
        RedirectSettings {
            enabled: self
                .resolve(|v| v.redirects_enabled)
                .unwrap_or(defaults.enabled),
            allow_secure_to_insecure: self
                .resolve(|v| v.allow_secure_to_insecure)
                .unwrap_or(defaults.allow_secure_to_insecure),
            forward_headers: self
                .resolve(|v| v.forward_headers)
                .unwrap_or(defaults.forward_headers),
            forward_authorization_header: self
                .resolve(|v| v.forward_authorization_header)
                .unwrap_or(defaults.forward_authorization_header),
            max_auto_redirects: self
                .resolve(|v| v.max_auto_redirects)
                .unwrap_or(defaults.max_auto_redirects),
        }
    }
}
