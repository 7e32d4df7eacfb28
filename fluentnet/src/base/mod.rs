//! Base types and error handling.
//!
//! Provides foundational types mirroring Chromium's `net/base/`:
//! - [`NetError`](neterror::NetError): network and call error codes
//! - [`CallState`](callstate::CallState): states of a call's send loop

pub mod callstate;
pub mod context;
pub mod neterror;
