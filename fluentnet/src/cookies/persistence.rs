//! Cookie persistence - save and load cookies to/from disk.
//!
//! Provides JSON-based persistence for [`CookieJar`].

use crate::base::neterror::NetError;
use crate::cookies::httpcookie::{HttpCookie, SameSite};
use crate::cookies::jar::CookieJar;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use url::Url;

/// Serializable representation of a cookie for persistence.
#[derive(Serialize, Deserialize, Debug, Clone)]
struct PersistentCookie {
    name: String,
    value: String,
    origin_url: Option<String>,
    received_unix_secs: i64,
    expires_unix_secs: Option<i64>,
    max_age_secs: Option<i64>,
    domain: Option<String>,
    path: Option<String>,
    secure: bool,
    http_only: bool,
    same_site: Option<SameSite>,
}

impl From<&HttpCookie> for PersistentCookie {
    fn from(cookie: &HttpCookie) -> Self {
        Self {
            name: cookie.name().to_string(),
            value: cookie.value().to_string(),
            origin_url: cookie.origin_url().map(|u| u.to_string()),
            received_unix_secs: cookie.date_received().unix_timestamp(),
            expires_unix_secs: cookie.expires().map(|t| t.unix_timestamp()),
            max_age_secs: cookie.max_age().map(|d| d.whole_seconds()),
            domain: cookie.domain().map(str::to_string),
            path: cookie.path().map(str::to_string),
            secure: cookie.secure(),
            http_only: cookie.http_only(),
            same_site: cookie.same_site(),
        }
    }
}

impl PersistentCookie {
    fn into_cookie(self) -> Result<HttpCookie, io::Error> {
        let invalid = |e: String| io::Error::new(io::ErrorKind::InvalidData, e);

        let mut cookie = HttpCookie::new(self.name.clone(), self.value.clone());
        let origin = self
            .origin_url
            .as_deref()
            .map(Url::parse)
            .transpose()
            .map_err(|e| invalid(e.to_string()))?;
        let received = OffsetDateTime::from_unix_timestamp(self.received_unix_secs)
            .map_err(|e| invalid(e.to_string()))?;
        let expires = self
            .expires_unix_secs
            .map(OffsetDateTime::from_unix_timestamp)
            .transpose()
            .map_err(|e| invalid(e.to_string()))?;

        apply_attributes(&mut cookie, origin, received, expires, &self)
            .map_err(|e| invalid(e.to_string()))?;
        Ok(cookie)
    }
}

fn apply_attributes(
    cookie: &mut HttpCookie,
    origin: Option<Url>,
    received: OffsetDateTime,
    expires: Option<OffsetDateTime>,
    stored: &PersistentCookie,
) -> Result<(), NetError> {
    cookie.set_origin_url(origin)?;
    cookie.set_date_received(received)?;
    cookie.set_expires(expires)?;
    cookie.set_max_age(stored.max_age_secs.map(Duration::seconds))?;
    cookie.set_domain(stored.domain.as_deref())?;
    cookie.set_path(stored.path.as_deref())?;
    cookie.set_secure(stored.secure)?;
    cookie.set_http_only(stored.http_only)?;
    cookie.set_same_site(stored.same_site)
}

/// Save every cookie in a jar to a file.
///
/// # Example
/// ```ignore
/// persistence::save_cookies(&jar, Path::new("/path/to/cookies.json"))?;
/// ```
pub fn save_cookies(jar: &CookieJar, path: &Path) -> io::Result<()> {
    let all_cookies: Vec<PersistentCookie> = jar.cookies().iter().map(Into::into).collect();

    let json = serde_json::to_string_pretty(&all_cookies)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    fs::write(path, json)
}

/// Load cookies from a file into a new jar.
///
/// Expired cookies are skipped, and so are cookies the jar would reject.
pub fn load_cookies(path: &Path) -> io::Result<CookieJar> {
    let json = fs::read_to_string(path)?;
    let persistent_cookies: Vec<PersistentCookie> =
        serde_json::from_str(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let jar = CookieJar::new();
    let now = OffsetDateTime::now_utc();

    for pc in persistent_cookies {
        let cookie = pc.into_cookie()?;
        if cookie.is_expired_at(now) {
            continue;
        }
        if let Err(e) = jar.add_or_update(cookie) {
            tracing::warn!(error = %e, "skipping persisted cookie");
        }
    }

    Ok(jar)
}
