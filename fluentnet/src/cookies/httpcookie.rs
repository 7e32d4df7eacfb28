use crate::base::neterror::NetError;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::{Duration, OffsetDateTime};
use url::{Host, Url};

/// SameSite attribute of a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl From<cookie::SameSite> for SameSite {
    fn from(value: cookie::SameSite) -> Self {
        match value {
            cookie::SameSite::Strict => SameSite::Strict,
            cookie::SameSite::Lax => SameSite::Lax,
            cookie::SameSite::None => SameSite::None,
        }
    }
}

impl From<SameSite> for cookie::SameSite {
    fn from(value: SameSite) -> Self {
        match value {
            SameSite::Strict => cookie::SameSite::Strict,
            SameSite::Lax => cookie::SameSite::Lax,
            SameSite::None => cookie::SameSite::None,
        }
    }
}

/// Why a cookie is not sent to a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    Expired,
    DomainMismatch,
    PathMismatch,
    InsecureScheme,
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Exclusion::Expired => "cookie is expired",
            Exclusion::DomainMismatch => "cookie domain does not match the target host",
            Exclusion::PathMismatch => "cookie path does not match the target path",
            Exclusion::InsecureScheme => "secure cookie cannot be sent over an insecure scheme",
        };
        f.write_str(reason)
    }
}

/// A single cookie and its attributes.
/// Modeled after Chromium's `net::CanonicalCookie`, with identity by name
/// only.
///
/// A cookie is mutable until a [`CookieJar`](super::jar::CookieJar)
/// accepts it. Copies handed out by a jar are locked, and every setter on
/// a locked cookie fails with [`NetError::InvalidOperation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpCookie {
    name: String,
    value: String,
    origin_url: Option<Url>,
    date_received: OffsetDateTime,
    expires: Option<OffsetDateTime>,
    max_age: Option<Duration>,
    domain: Option<String>,
    path: Option<String>,
    secure: bool,
    http_only: bool,
    same_site: Option<SameSite>,
    locked: bool,
}

impl HttpCookie {
    /// A cookie with no origin. It needs both a domain and a path before a
    /// jar will accept it.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            origin_url: None,
            date_received: OffsetDateTime::now_utc(),
            expires: None,
            max_age: None,
            domain: None,
            path: None,
            secure: false,
            http_only: false,
            same_site: None,
            locked: false,
        }
    }

    /// A cookie as if it were set by a response from `origin`.
    pub fn from_origin(origin: Url, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut cookie = Self::new(name, value);
        cookie.origin_url = Some(origin);
        cookie
    }

    /// Parse a `Set-Cookie` header value received from `origin`.
    ///
    /// The value is unquoted and percent-decoded. Unknown attributes are
    /// ignored, as are malformed `Expires` and `Max-Age` values. The result
    /// is not validated; see [`validate`](Self::validate).
    pub fn parse(set_cookie: &str, origin: &Url) -> Result<Self, NetError> {
        Self::parse_at(set_cookie, origin, OffsetDateTime::now_utc())
    }

    /// Like [`parse`](Self::parse) with an explicit receive time.
    pub fn parse_at(
        set_cookie: &str,
        origin: &Url,
        received: OffsetDateTime,
    ) -> Result<Self, NetError> {
        let parsed = cookie::Cookie::parse_encoded(set_cookie).map_err(|e| {
            let name = set_cookie.split(['=', ';']).next().unwrap_or_default().trim();
            NetError::invalid_cookie(name, e.to_string())
        })?;

        Ok(Self {
            name: parsed.name().to_string(),
            value: parsed.value_trimmed().to_string(),
            origin_url: Some(origin.clone()),
            date_received: received,
            expires: parsed.expires_datetime(),
            max_age: parsed.max_age(),
            domain: parsed
                .domain()
                .map(normalize_domain)
                .filter(|d| !d.is_empty()),
            path: parsed.path().map(str::to_string),
            secure: parsed.secure().unwrap_or(false),
            http_only: parsed.http_only().unwrap_or(false),
            same_site: parsed.same_site().map(SameSite::from),
            locked: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn origin_url(&self) -> Option<&Url> {
        self.origin_url.as_ref()
    }

    pub fn date_received(&self) -> OffsetDateTime {
        self.date_received
    }

    pub fn expires(&self) -> Option<OffsetDateTime> {
        self.expires
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn secure(&self) -> bool {
        self.secure
    }

    pub fn http_only(&self) -> bool {
        self.http_only
    }

    pub fn same_site(&self) -> Option<SameSite> {
        self.same_site
    }

    /// Whether a jar has accepted this cookie.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub(crate) fn lock(&mut self) {
        self.locked = true;
    }

    fn ensure_mutable(&self) -> Result<(), NetError> {
        if self.locked {
            return Err(NetError::InvalidOperation(format!(
                "cookie `{}` cannot be modified after it has been added to a jar",
                self.name
            )));
        }
        Ok(())
    }

    pub fn set_value(&mut self, value: impl Into<String>) -> Result<(), NetError> {
        self.ensure_mutable()?;
        self.value = value.into();
        Ok(())
    }

    pub fn set_origin_url(&mut self, origin: Option<Url>) -> Result<(), NetError> {
        self.ensure_mutable()?;
        self.origin_url = origin;
        Ok(())
    }

    pub fn set_date_received(&mut self, received: OffsetDateTime) -> Result<(), NetError> {
        self.ensure_mutable()?;
        self.date_received = received;
        Ok(())
    }

    pub fn set_expires(&mut self, expires: Option<OffsetDateTime>) -> Result<(), NetError> {
        self.ensure_mutable()?;
        self.expires = expires;
        Ok(())
    }

    pub fn set_max_age(&mut self, max_age: Option<Duration>) -> Result<(), NetError> {
        self.ensure_mutable()?;
        self.max_age = max_age;
        Ok(())
    }

    pub fn set_domain(&mut self, domain: Option<&str>) -> Result<(), NetError> {
        self.ensure_mutable()?;
        self.domain = domain.map(normalize_domain).filter(|d| !d.is_empty());
        Ok(())
    }

    pub fn set_path(&mut self, path: Option<&str>) -> Result<(), NetError> {
        self.ensure_mutable()?;
        self.path = path.map(str::to_string);
        Ok(())
    }

    pub fn set_secure(&mut self, secure: bool) -> Result<(), NetError> {
        self.ensure_mutable()?;
        self.secure = secure;
        Ok(())
    }

    pub fn set_http_only(&mut self, http_only: bool) -> Result<(), NetError> {
        self.ensure_mutable()?;
        self.http_only = http_only;
        Ok(())
    }

    pub fn set_same_site(&mut self, same_site: Option<SameSite>) -> Result<(), NetError> {
        self.ensure_mutable()?;
        self.same_site = same_site;
        Ok(())
    }

    /// Check the invariants a jar enforces before accepting the cookie.
    pub fn validate(&self) -> Result<(), NetError> {
        let reject = |reason: String| Err(NetError::invalid_cookie(&self.name, reason));

        if self.name.is_empty() {
            return reject("name is empty".into());
        }
        if self
            .name
            .bytes()
            .any(|b| b.is_ascii_whitespace() || b.is_ascii_control() || b == b'=' || b == b';')
        {
            return reject("name contains invalid characters".into());
        }

        if self.origin_url.is_none() && (self.domain.is_none() || self.path.is_none()) {
            return reject("an origin URL is required unless both Domain and Path are set".into());
        }

        if let (Some(domain), Some(origin)) = (&self.domain, &self.origin_url) {
            match origin.host() {
                Some(Host::Domain(host)) => {
                    if !domain_matches(domain, host) {
                        return reject(format!(
                            "Domain `{domain}` does not match origin host `{host}`"
                        ));
                    }
                }
                Some(Host::Ipv4(ip)) => {
                    if *domain != ip.to_string() {
                        return reject(format!("Domain `{domain}` must equal origin address {ip}"));
                    }
                }
                Some(Host::Ipv6(ip)) => {
                    if domain.trim_start_matches('[').trim_end_matches(']') != ip.to_string() {
                        return reject(format!("Domain `{domain}` must equal origin address {ip}"));
                    }
                }
                None => return reject("origin URL has no host".into()),
            }
        }

        if self.secure {
            if let Some(origin) = &self.origin_url {
                if !is_secure_scheme(origin.scheme()) {
                    return reject("Secure cookies must be set from an HTTPS origin".into());
                }
            }
        }

        if let Some(path) = &self.path {
            if !path.starts_with('/') {
                return reject(format!("Path `{path}` must begin with '/'"));
            }
        }

        if self.name.starts_with("__Host-")
            && (!self.secure || self.domain.is_some() || self.path.as_deref() != Some("/"))
        {
            return reject("__Host- cookies must be Secure, have no Domain, and use Path=/".into());
        }

        if self.name.starts_with("__Secure-") && !self.secure {
            return reject("__Secure- cookies must be Secure".into());
        }

        Ok(())
    }

    /// Absolute expiry, with Max-Age taking precedence over Expires.
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        match self.max_age {
            Some(age) => Some(self.date_received + age),
            None => self.expires,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc())
    }

    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at().is_some_and(|at| at <= now)
    }

    /// Explicit path, or the RFC 6265 default path of the origin URL.
    pub fn effective_path(&self) -> String {
        match (&self.path, &self.origin_url) {
            (Some(path), _) => path.clone(),
            (None, Some(origin)) => default_path(origin.path()),
            (None, None) => "/".to_string(),
        }
    }

    /// Whether this cookie belongs in a request to `url`.
    pub fn should_send_to(&self, url: &Url) -> Result<(), Exclusion> {
        self.should_send_to_at(url, OffsetDateTime::now_utc())
    }

    pub fn should_send_to_at(&self, url: &Url, now: OffsetDateTime) -> Result<(), Exclusion> {
        if self.is_expired_at(now) {
            return Err(Exclusion::Expired);
        }

        let host = url.host_str().ok_or(Exclusion::DomainMismatch)?;
        let host_matches = match (&self.domain, &self.origin_url) {
            // An IP literal only matches itself.
            (Some(domain), _) => match url.host() {
                Some(Host::Domain(_)) => domain_matches(domain, host),
                _ => unbracket(domain.trim_start_matches('.')) == unbracket(host),
            },
            (None, Some(origin)) => origin
                .host_str()
                .is_some_and(|origin_host| origin_host.eq_ignore_ascii_case(host)),
            (None, None) => false,
        };
        if !host_matches {
            return Err(Exclusion::DomainMismatch);
        }

        if !path_matches(&self.effective_path(), url.path()) {
            return Err(Exclusion::PathMismatch);
        }

        if self.secure && !is_secure_scheme(url.scheme()) {
            return Err(Exclusion::InsecureScheme);
        }

        Ok(())
    }

    /// Serialize as a `Set-Cookie` header value.
    pub fn to_set_cookie_string(&self) -> String {
        let mut builder = cookie::Cookie::build((self.name.clone(), self.value.clone()))
            .secure(self.secure)
            .http_only(self.http_only);
        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }
        if let Some(path) = &self.path {
            builder = builder.path(path.clone());
        }
        if let Some(expires) = self.expires {
            builder = builder.expires(expires);
        }
        if let Some(max_age) = self.max_age {
            builder = builder.max_age(max_age);
        }
        if let Some(same_site) = self.same_site {
            builder = builder.same_site(same_site.into());
        }
        builder.build().encoded().to_string()
    }
}

pub(crate) fn is_secure_scheme(scheme: &str) -> bool {
    scheme.eq_ignore_ascii_case("https") || scheme.eq_ignore_ascii_case("wss")
}

fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// RFC 6265 domain matching, without public suffix checks.
pub(crate) fn domain_matches(cookie_domain: &str, request_host: &str) -> bool {
    let cookie_domain = cookie_domain.trim_start_matches('.');

    if request_host.eq_ignore_ascii_case(cookie_domain) {
        return true;
    }

    if request_host.len() > cookie_domain.len() {
        let split = request_host.len() - cookie_domain.len();
        if let Some(suffix) = request_host.get(split..) {
            return suffix.eq_ignore_ascii_case(cookie_domain)
                && request_host.as_bytes()[split - 1] == b'.';
        }
    }

    false
}

fn unbracket(host: &str) -> &str {
    host.trim_start_matches('[').trim_end_matches(']')
}

/// RFC 6265 path matching.
pub(crate) fn path_matches(cookie_path: &str, request_path: &str) -> bool {
    if request_path == cookie_path {
        return true;
    }

    if let Some(rest) = request_path.strip_prefix(cookie_path) {
        return cookie_path.ends_with('/') || rest.starts_with('/');
    }

    false
}

/// RFC 6265 section 5.1.4 default-path.
fn default_path(uri_path: &str) -> String {
    if !uri_path.starts_with('/') {
        return "/".to_string();
    }
    match uri_path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(i) => uri_path[..i].to_string(),
    }
}
