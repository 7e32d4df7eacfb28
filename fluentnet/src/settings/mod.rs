//! Layered call settings.
//!
//! Every [`SettingsScope`] holds only the values explicitly set on it plus
//! a link to its parent. Reads walk the chain at call time, so a change to
//! a client's scope is visible to requests created earlier unless they
//! override it. A [`Settings`] resolver puts an optional override scope in
//! front of the chain:
//!
//! ```text
//! override -> request -> client -> root context -> static defaults
//! ```

pub mod resolver;
pub mod scope;

pub use resolver::{RedirectSettings, Settings};
pub use scope::{RedirectOptions, SettingsScope, DEFAULT_MAX_AUTO_REDIRECTS, DEFAULT_TIMEOUT};
