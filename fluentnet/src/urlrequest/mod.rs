//! Calls: the fluent request, its send loop, hooks and redirect policy.
//!
//! Naming follows Chromium's net/url_request: a [`URLRequest`] is the
//! caller-facing object, a [`URLRequestHttpJob`](job::URLRequestHttpJob)
//! drives its hops, and a [`URLRequestContext`] holds what every request
//! shares.

pub mod call;
pub mod context;
pub mod hooks;
pub mod job;
pub mod redirect;
pub mod request;

pub use call::CallRecord;
pub use context::URLRequestContext;
pub use hooks::{EventHandlers, HookFuture, HookPoint};
pub use redirect::RedirectDecision;
pub use request::URLRequest;
