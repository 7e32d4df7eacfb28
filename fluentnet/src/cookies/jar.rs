use crate::base::neterror::NetError;
use crate::cookies::httpcookie::HttpCookie;
use crate::cookies::requestcookies::RequestCookies;
use dashmap::DashMap;
use http::header::SET_COOKIE;
use http::HeaderMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use time::OffsetDateTime;
use url::Url;

#[derive(Debug, Clone)]
struct StoredCookie {
    /// Insertion sequence; an overwrite keeps the original slot.
    seq: u64,
    cookie: HttpCookie,
}

/// A collection of cookies keyed by name.
/// Modeled after Chromium's `net::CookieMonster`, with one entry per name.
///
/// Requests may [`register`](CookieJar::register) with the jar. Every
/// mutation is pushed into the outgoing cookie state of each live
/// registered request, so a request built before a cookie arrives still
/// sends it.
#[derive(Debug, Default)]
pub struct CookieJar {
    // Using DashMap for high concurrency.
    store: DashMap<String, StoredCookie>,
    next_seq: AtomicU64,
    /// Held across every store write and the matching request updates, so
    /// registered requests observe writes in store order.
    registered: Mutex<Vec<Weak<RequestCookies>>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store a cookie, overwriting any cookie with the same
    /// name. A valid cookie that is already expired deletes the stored one.
    pub fn add_or_update(&self, mut cookie: HttpCookie) -> Result<(), NetError> {
        cookie.validate()?;

        if cookie.is_expired() {
            tracing::debug!(cookie = cookie.name(), "expired cookie removes stored value");
            self.remove(cookie.name());
            return Ok(());
        }

        cookie.lock();
        let name = cookie.name().to_string();
        let mut registered = self.registered.lock();
        self.store
            .entry(name)
            .and_modify(|stored| stored.cookie = cookie.clone())
            .or_insert_with(|| StoredCookie {
                seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                cookie: cookie.clone(),
            });
        for request in live(&mut registered) {
            request.sync_jar_cookie(&cookie);
        }
        Ok(())
    }

    /// Remove a cookie by name and unsync it from registered requests.
    pub fn remove(&self, name: &str) -> Option<HttpCookie> {
        let mut registered = self.registered.lock();
        let removed = self.store.remove(name).map(|(_, stored)| stored.cookie);
        if removed.is_some() {
            for request in live(&mut registered) {
                request.unsync_jar_cookie(name);
            }
        }
        removed
    }

    /// Remove every cookie.
    pub fn clear(&self) {
        let mut registered = self.registered.lock();
        self.store.clear();
        for request in live(&mut registered) {
            request.clear_jar_cookies();
        }
    }

    /// Drop expired cookies. Returns how many were removed.
    pub fn remove_expired(&self) -> usize {
        let now = OffsetDateTime::now_utc();
        let expired: Vec<String> = self
            .store
            .iter()
            .filter(|entry| entry.cookie.is_expired_at(now))
            .map(|entry| entry.key().clone())
            .collect();
        for name in &expired {
            self.remove(name);
        }
        expired.len()
    }

    /// A locked copy of the stored cookie.
    pub fn get(&self, name: &str) -> Option<HttpCookie> {
        self.store.get(name).map(|stored| stored.cookie.clone())
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Every stored cookie in insertion order.
    pub fn cookies(&self) -> Vec<HttpCookie> {
        let mut stored: Vec<StoredCookie> =
            self.store.iter().map(|entry| entry.value().clone()).collect();
        stored.sort_by_key(|s| s.seq);
        stored.into_iter().map(|s| s.cookie).collect()
    }

    /// Cookies that should be sent to `url`, in insertion order.
    pub fn cookies_for(&self, url: &Url) -> Vec<HttpCookie> {
        let now = OffsetDateTime::now_utc();
        self.cookies()
            .into_iter()
            .filter(|c| c.should_send_to_at(url, now).is_ok())
            .collect()
    }

    /// The `Cookie` header value for `url`, if any cookie applies.
    pub fn cookie_header_for(&self, url: &Url) -> Option<String> {
        let pairs: Vec<String> = self
            .cookies_for(url)
            .iter()
            .map(|c| format!("{}={}", c.name(), c.value()))
            .collect();
        (!pairs.is_empty()).then(|| pairs.join("; "))
    }

    /// Parse one `Set-Cookie` value from `origin` and store it.
    pub fn add_from_set_cookie(&self, origin: &Url, header: &str) -> Result<(), NetError> {
        self.add_or_update(HttpCookie::parse(header, origin)?)
    }

    /// Apply every `Set-Cookie` header of a response in server order, so a
    /// later value for a name wins. Rejected cookies are logged and
    /// skipped. Returns how many were accepted.
    pub fn record_response(&self, origin: &Url, headers: &HeaderMap) -> usize {
        let mut accepted = 0;
        for value in headers.get_all(SET_COOKIE) {
            let Ok(line) = value.to_str() else {
                tracing::debug!(url = %origin, "ignoring non-UTF-8 Set-Cookie header");
                continue;
            };
            match self.add_from_set_cookie(origin, line) {
                Ok(()) => accepted += 1,
                Err(e) => tracing::debug!(url = %origin, error = %e, "cookie rejected"),
            }
        }
        accepted
    }

    /// Keep `request`'s outgoing cookies in sync with this jar until the
    /// request is dropped.
    pub fn register(&self, request: &Arc<RequestCookies>) {
        let mut registered = self.registered.lock();
        registered.retain(|weak| weak.strong_count() > 0);
        registered.push(Arc::downgrade(request));
        let url = request.url();
        for cookie in self.cookies_for(&url) {
            request.sync_jar_cookie(&cookie);
        }
    }

    /// Number of live registered requests.
    pub fn registered_count(&self) -> usize {
        let mut registered = self.registered.lock();
        registered.retain(|weak| weak.strong_count() > 0);
        registered.len()
    }

}

/// Upgrade the live handles, pruning dropped ones.
fn live(registered: &mut Vec<Weak<RequestCookies>>) -> Vec<Arc<RequestCookies>> {
    registered.retain(|weak| weak.strong_count() > 0);
    registered.iter().filter_map(Weak::upgrade).collect()
}
