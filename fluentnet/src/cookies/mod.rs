//! Cookie storage, matching, and per-request cookie state.
//!
//! # Architecture
//!
//! This implementation mirrors Chromium's cookie storage architecture,
//! simplified to one cookie per name:
//!
//! | Chromium (C++) | fluentnet (Rust) | Responsibility |
//! |----------------|------------------|----------------|
//! | `net::CookieMonster` | [`CookieJar`](jar::CookieJar) | Cookie jar synced with live requests |
//! | `net::CanonicalCookie` | [`HttpCookie`](httpcookie::HttpCookie) | Single cookie, validation and matching |
//! | `SqlitePersistentCookieStore` | [`persistence`] | Disk persistence (JSON) |
//!
//! # Example
//!
//! ```rust
//! use fluentnet::cookies::jar::CookieJar;
//! use url::Url;
//!
//! let jar = CookieJar::new();
//! let origin = Url::parse("http://example.com/").unwrap();
//! jar.add_from_set_cookie(&origin, "session=abc; Path=/").unwrap();
//! assert_eq!(jar.cookie_header_for(&origin).as_deref(), Some("session=abc"));
//! ```
//!
//! Domain matching follows RFC 6265 without public suffix checks.

pub mod httpcookie;
pub mod jar;
pub mod persistence;
pub mod requestcookies;

pub use httpcookie::{Exclusion, HttpCookie, SameSite};
pub use jar::CookieJar;
pub use requestcookies::RequestCookies;
