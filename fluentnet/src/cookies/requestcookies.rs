//! Outgoing cookie state of one live request.

use crate::cookies::httpcookie::HttpCookie;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use time::OffsetDateTime;
use url::Url;

#[derive(Debug)]
struct Inner {
    url: Url,
    entries: Vec<(String, String)>,
    explicit: HashSet<String>,
    /// Expiry of jar-derived entries that have one.
    expiry: HashMap<String, OffsetDateTime>,
}

/// The cookies a request will send, kept current with its jar.
///
/// Entries are either explicit (set on the request itself) or synced from
/// a [`CookieJar`](super::jar::CookieJar) the request is registered with.
/// Explicit entries win over jar entries of the same name and are never
/// touched by jar updates.
#[derive(Debug)]
pub struct RequestCookies {
    inner: Mutex<Inner>,
}

impl RequestCookies {
    pub fn new(url: Url) -> Self {
        Self {
            inner: Mutex::new(Inner {
                url,
                entries: Vec::new(),
                explicit: HashSet::new(),
                expiry: HashMap::new(),
            }),
        }
    }

    pub fn url(&self) -> Url {
        self.inner.lock().url.clone()
    }

    /// Set a cookie for this request only.
    pub fn set_explicit(&self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let mut inner = self.inner.lock();
        upsert(&mut inner.entries, &name, value.into());
        inner.expiry.remove(&name);
        inner.explicit.insert(name);
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.inner
            .lock()
            .entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    pub fn is_explicit(&self, name: &str) -> bool {
        self.inner.lock().explicit.contains(name)
    }

    pub fn entries(&self) -> Vec<(String, String)> {
        self.inner.lock().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// The `Cookie` header value, or `None` when nothing would be sent.
    /// With `include_jar == false` only explicit cookies are serialized.
    /// Jar cookies that have expired since they were synced are skipped.
    pub fn header_value(&self, include_jar: bool) -> Option<String> {
        self.header_value_at(include_jar, OffsetDateTime::now_utc())
    }

    pub fn header_value_at(&self, include_jar: bool, now: OffsetDateTime) -> Option<String> {
        let inner = self.inner.lock();
        let pairs: Vec<String> = inner
            .entries
            .iter()
            .filter(|(name, _)| {
                inner.explicit.contains(name)
                    || (include_jar && inner.expiry.get(name).map_or(true, |at| *at > now))
            })
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        (!pairs.is_empty()).then(|| pairs.join("; "))
    }

    /// Recompute whether a jar cookie belongs to this request.
    pub(crate) fn sync_jar_cookie(&self, cookie: &HttpCookie) {
        let mut inner = self.inner.lock();
        if inner.explicit.contains(cookie.name()) {
            return;
        }
        match cookie.should_send_to(&inner.url) {
            Ok(()) => {
                upsert(&mut inner.entries, cookie.name(), cookie.value().to_string());
                match cookie.expires_at() {
                    Some(at) => inner.expiry.insert(cookie.name().to_string(), at),
                    None => inner.expiry.remove(cookie.name()),
                };
            }
            Err(reason) => {
                tracing::trace!(url = %inner.url, cookie = cookie.name(), %reason, "cookie not synced");
                inner.entries.retain(|(n, _)| n != cookie.name());
                inner.expiry.remove(cookie.name());
            }
        }
    }

    pub(crate) fn unsync_jar_cookie(&self, name: &str) {
        let mut inner = self.inner.lock();
        if !inner.explicit.contains(name) {
            inner.entries.retain(|(n, _)| n != name);
            inner.expiry.remove(name);
        }
    }

    /// Drop every jar-derived entry.
    pub(crate) fn clear_jar_cookies(&self) {
        let mut inner = self.inner.lock();
        let Inner {
            entries,
            explicit,
            expiry,
            ..
        } = &mut *inner;
        entries.retain(|(n, _)| explicit.contains(n));
        expiry.clear();
    }
}

fn upsert(entries: &mut Vec<(String, String)>, name: &str, value: String) {
    match entries.iter_mut().find(|(n, _)| n == name) {
        Some((_, v)) => *v = value,
        None => entries.push((name.to_string(), value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_explicit_wins_over_jar() {
        let cookies = RequestCookies::new(url("http://a.com/"));
        cookies.set_explicit("id", "mine");

        let jar_cookie = HttpCookie::from_origin(url("http://a.com/"), "id", "jar");
        cookies.sync_jar_cookie(&jar_cookie);
        assert_eq!(cookies.get("id").as_deref(), Some("mine"));

        cookies.unsync_jar_cookie("id");
        assert_eq!(cookies.get("id").as_deref(), Some("mine"));
    }

    #[test]
    fn test_sync_respects_matching() {
        let cookies = RequestCookies::new(url("http://a.com/x"));
        let other = HttpCookie::from_origin(url("http://b.com/"), "b", "1");
        cookies.sync_jar_cookie(&other);
        assert!(cookies.is_empty());

        let same = HttpCookie::from_origin(url("http://a.com/"), "a", "1");
        cookies.sync_jar_cookie(&same);
        assert_eq!(cookies.header_value(true).as_deref(), Some("a=1"));
    }

    #[test]
    fn test_header_value_insertion_order() {
        let cookies = RequestCookies::new(url("http://a.com/"));
        cookies.set_explicit("z", "1");
        cookies.sync_jar_cookie(&HttpCookie::from_origin(url("http://a.com/"), "a", "2"));
        cookies.set_explicit("m", "3");
        assert_eq!(
            cookies.header_value(true).as_deref(),
            Some("z=1; a=2; m=3")
        );
        assert_eq!(cookies.header_value(false).as_deref(), Some("z=1; m=3"));
    }

    #[test]
    fn test_clear_jar_cookies_keeps_explicit() {
        let cookies = RequestCookies::new(url("http://a.com/"));
        cookies.set_explicit("mine", "1");
        cookies.sync_jar_cookie(&HttpCookie::from_origin(url("http://a.com/"), "jar", "2"));
        cookies.clear_jar_cookies();
        assert_eq!(cookies.entries(), vec![("mine".to_string(), "1".to_string())]);
    }

    #[test]
    fn test_jar_cookie_expiring_after_sync_is_not_sent() {
        let cookies = RequestCookies::new(url("http://a.com/"));
        cookies.set_explicit("mine", "1");
        let mut short = HttpCookie::from_origin(url("http://a.com/"), "short", "2");
        short.set_max_age(Some(Duration::seconds(60))).unwrap();
        cookies.sync_jar_cookie(&short);

        let now = OffsetDateTime::now_utc();
        assert_eq!(
            cookies.header_value_at(true, now).as_deref(),
            Some("mine=1; short=2")
        );
        let later = now + Duration::seconds(120);
        assert_eq!(cookies.header_value_at(true, later).as_deref(), Some("mine=1"));
    }

    #[test]
    fn test_explicit_cookie_never_expires() {
        let cookies = RequestCookies::new(url("http://a.com/"));
        let mut short = HttpCookie::from_origin(url("http://a.com/"), "id", "jar");
        short.set_max_age(Some(Duration::seconds(60))).unwrap();
        cookies.sync_jar_cookie(&short);
        cookies.set_explicit("id", "mine");

        let later = OffsetDateTime::now_utc() + Duration::seconds(120);
        assert_eq!(cookies.header_value_at(true, later).as_deref(), Some("id=mine"));
    }
}
