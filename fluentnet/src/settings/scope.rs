use crate::base::neterror::NetError;
use crate::http::statusrange::StatusRange;
use http::Version;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

/// Per-hop timeout unless a scope overrides it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(100);

/// Redirects followed per logical call unless a scope overrides it.
pub const DEFAULT_MAX_AUTO_REDIRECTS: u32 = 10;

/// The sparse values of one scope. `None` means "not set here".
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct SettingValues {
    pub(crate) timeout: Option<Option<Duration>>,
    pub(crate) http_version: Option<Version>,
    pub(crate) allowed_http_status: Option<Option<StatusRange>>,
    pub(crate) redirects_enabled: Option<bool>,
    pub(crate) allow_secure_to_insecure: Option<bool>,
    pub(crate) forward_headers: Option<bool>,
    pub(crate) forward_authorization_header: Option<bool>,
    pub(crate) max_auto_redirects: Option<u32>,
    pub(crate) cookies_enabled: Option<bool>,
}

impl SettingValues {
    /// Every property set to its default.
    pub(crate) fn defaults() -> Self {
        Self {
            timeout: Some(Some(DEFAULT_TIMEOUT)),
            http_version: Some(Version::HTTP_11),
            allowed_http_status: Some(None),
            redirects_enabled: Some(true),
            allow_secure_to_insecure: Some(false),
            forward_headers: Some(true),
            forward_authorization_header: Some(false),
            max_auto_redirects: Some(DEFAULT_MAX_AUTO_REDIRECTS),
            cookies_enabled: Some(true),
        }
    }
}

/// One level of the settings chain.
#[derive(Debug, Default)]
pub struct SettingsScope {
    values: RwLock<SettingValues>,
    parent: Option<Arc<SettingsScope>>,
}

impl SettingsScope {
    /// A parentless scope with every property populated.
    pub fn root() -> Arc<Self> {
        Arc::new(Self {
            values: RwLock::new(SettingValues::defaults()),
            parent: None,
        })
    }

    /// A parentless, empty scope. Used as an override scope.
    pub fn detached() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// An empty scope that falls back to `parent`.
    pub fn child_of(parent: &Arc<SettingsScope>) -> Arc<Self> {
        Arc::new(Self {
            values: RwLock::new(SettingValues::default()),
            parent: Some(Arc::clone(parent)),
        })
    }

    /// A child of `parent` starting with a copy of `source`'s own values.
    pub(crate) fn child_with_values(
        parent: &Arc<SettingsScope>,
        source: &SettingsScope,
    ) -> Arc<Self> {
        Arc::new(Self {
            values: RwLock::new(source.values.read().clone()),
            parent: Some(Arc::clone(parent)),
        })
    }

    pub fn parent(&self) -> Option<&Arc<SettingsScope>> {
        self.parent.as_ref()
    }

    /// Walk this scope and its ancestors, returning the first set value.
    pub(crate) fn lookup<T>(&self, pick: impl Fn(&SettingValues) -> Option<T>) -> Option<T> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(value) = pick(&current.values.read()) {
                return Some(value);
            }
            scope = current.parent.as_deref();
        }
        None
    }

    /// Whether any property is set on this scope itself.
    pub fn has_local_values(&self) -> bool {
        *self.values.read() != SettingValues::default()
    }

    /// Clear this scope's own values so reads fall through to the parent.
    pub fn reset_defaults(&self) {
        *self.values.write() = SettingValues::default();
    }

    fn update(&self, f: impl FnOnce(&mut SettingValues)) {
        f(&mut self.values.write());
    }

    /// Per-hop timeout. `None` disables the timeout.
    pub fn set_timeout(&self, timeout: Option<Duration>) {
        self.update(|v| v.timeout = Some(timeout));
    }

    pub fn set_http_version(&self, version: Version) {
        self.update(|v| v.http_version = Some(version));
    }

    /// Parse and set the allowed-status pattern. An invalid pattern is
    /// rejected and the scope is left unchanged.
    pub fn set_allowed_http_status(&self, pattern: &str) -> Result<(), NetError> {
        let range = StatusRange::parse(pattern)?;
        self.update(|v| v.allowed_http_status = Some(Some(range)));
        Ok(())
    }

    pub fn set_allowed_http_status_range(&self, range: Option<StatusRange>) {
        self.update(|v| v.allowed_http_status = Some(range));
    }

    pub fn allow_any_http_status(&self) {
        self.set_allowed_http_status_range(Some(StatusRange::any()));
    }

    pub fn set_redirects_enabled(&self, enabled: bool) {
        self.update(|v| v.redirects_enabled = Some(enabled));
    }

    pub fn set_allow_secure_to_insecure(&self, allow: bool) {
        self.update(|v| v.allow_secure_to_insecure = Some(allow));
    }

    pub fn set_forward_headers(&self, forward: bool) {
        self.update(|v| v.forward_headers = Some(forward));
    }

    pub fn set_forward_authorization_header(&self, forward: bool) {
        self.update(|v| v.forward_authorization_header = Some(forward));
    }

    pub fn set_max_auto_redirects(&self, max: u32) {
        self.update(|v| v.max_auto_redirects = Some(max));
    }

    pub fn set_cookies_enabled(&self, enabled: bool) {
        self.update(|v| v.cookies_enabled = Some(enabled));
    }

    /// Fluent access to the redirect sub-settings of this scope.
    pub fn redirects(&self) -> RedirectOptions<'_> {
        RedirectOptions { scope: self }
    }
}

/// Redirect setters for one scope.
///
/// ```rust
/// use fluentnet::settings::SettingsScope;
///
/// let scope = SettingsScope::detached();
/// scope.redirects().max_auto_redirects(3).forward_headers(false);
/// ```
pub struct RedirectOptions<'a> {
    scope: &'a SettingsScope,
}

impl RedirectOptions<'_> {
    pub fn enabled(&self, enabled: bool) -> &Self {
        self.scope.set_redirects_enabled(enabled);
        self
    }

    pub fn allow_secure_to_insecure(&self, allow: bool) -> &Self {
        self.scope.set_allow_secure_to_insecure(allow);
        self
    }

    pub fn forward_headers(&self, forward: bool) -> &Self {
        self.scope.set_forward_headers(forward);
        self
    }

    pub fn forward_authorization_header(&self, forward: bool) -> &Self {
        self.scope.set_forward_authorization_header(forward);
        self
    }

    pub fn max_auto_redirects(&self, max: u32) -> &Self {
        self.scope.set_max_auto_redirects(max);
        self
    }
}
