//! # fluentnet
//!
//! A fluent HTTP client core with Chromium-style naming.
//!
//! `fluentnet` turns a request description into one or more HTTP
//! exchanges: it attaches cookies from a jar, applies layered settings,
//! follows redirects, runs lifecycle hooks and reports every hop as a
//! [`CallRecord`].
//!
//! ## Features
//!
//! - **Cookies**: RFC 6265 validation and matching, a shared jar kept in
//!   sync with live requests, JSON persistence
//! - **Redirects**: RFC 7231 verb rules, header forwarding policy,
//!   circular-redirect detection and a hop cap
//! - **Settings**: per-call values resolved request, client, root, with an
//!   optional override scope for tests
//! - **Hooks**: async `BeforeCall`, `AfterCall`, `OnError`, `OnRedirect`
//!   at global, client and request scope
//! - **Transport**: pluggable [`HttpTransport`]; a plain HTTP/1.1
//!   [`HyperTransport`] by default
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fluentnet::{Client, CookieJar};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), fluentnet::NetError> {
//!     let jar = Arc::new(CookieJar::new());
//!     let client = Client::builder().cookie_jar(Arc::clone(&jar)).build();
//!
//!     let call = client
//!         .get("http://example.com/login")
//!         .with_redirects(|r| {
//!             r.max_auto_redirects(3);
//!         })
//!         .send()
//!         .await?;
//!
//!     println!("{} hops, {} cookies", call.hop_count(), jar.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error codes, call states and result extensions
//! - [`cookies`] - Cookie model, jar and persistence
//! - [`http`] - Outgoing messages, responses, status ranges and transport
//! - [`settings`] - Layered settings scopes
//! - [`urlrequest`] - Requests, the send loop, hooks and redirects

pub mod base;
pub mod client;
pub mod cookies;
pub mod http;
pub mod settings;
pub mod urlrequest;

pub use crate::base::neterror::NetError;
pub use crate::client::{Client, ClientBuilder};
pub use crate::cookies::{CookieJar, HttpCookie};
pub use crate::http::{HttpResponse, HttpTransport, HyperTransport};
pub use crate::urlrequest::{CallRecord, URLRequest, URLRequestContext};
