//! Lifecycle hooks.
//!
//! Every hook has one asynchronous signature and receives the hop's
//! [`CallRecord`] mutably. A synchronous hook returns a ready future:
//!
//! ```rust
//! use fluentnet::urlrequest::hooks::{EventHandlers, HookPoint};
//!
//! let handlers = EventHandlers::new();
//! handlers.add(HookPoint::BeforeCall, |call| {
//!     call.outgoing.headers.insert("X-Trace", "1");
//!     Box::pin(async { Ok(()) })
//! });
//! ```

use crate::base::neterror::NetError;
use crate::urlrequest::call::CallRecord;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Alias for the `Future` type returned by a hook.
pub type HookFuture<'a> = BoxFuture<'a, Result<(), NetError>>;

/// A registered hook.
pub type Hook = Arc<dyn for<'a> Fn(&'a mut CallRecord) -> HookFuture<'a> + Send + Sync>;

/// Points in a hop's lifecycle where hooks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    /// After the outgoing message is built, before it is sent.
    BeforeCall,
    /// After the transport returns, whether it succeeded or not.
    AfterCall,
    /// When the call is about to fail. A hook may set
    /// [`CallRecord::error_handled`] to return the call instead.
    OnError,
    /// Before a redirect is followed. A hook may clear
    /// `call.redirect.follow` to stop at the current response.
    OnRedirect,
}

/// Hooks registered at one scope (root context, client, or request).
#[derive(Default)]
pub struct EventHandlers {
    handlers: RwLock<Vec<(HookPoint, Hook)>>,
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F>(&self, point: HookPoint, hook: F)
    where
        F: for<'a> Fn(&'a mut CallRecord) -> HookFuture<'a> + Send + Sync + 'static,
    {
        self.handlers.write().push((point, Arc::new(hook)));
    }

    /// Hooks for `point`, in registration order.
    pub fn hooks_for(&self, point: HookPoint) -> Vec<Hook> {
        self.handlers
            .read()
            .iter()
            .filter(|(p, _)| *p == point)
            .map(|(_, hook)| Arc::clone(hook))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }

    pub fn clear(&self) {
        self.handlers.write().clear();
    }
}

impl Clone for EventHandlers {
    fn clone(&self) -> Self {
        Self {
            handlers: RwLock::new(self.handlers.read().clone()),
        }
    }
}

impl fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandlers")
            .field("count", &self.len())
            .finish()
    }
}

/// Run the hooks for `point` of each scope in order, least specific first.
/// The first hook error stops dispatch and is returned as is.
pub(crate) async fn dispatch(
    scopes: &[&EventHandlers],
    point: HookPoint,
    call: &mut CallRecord,
) -> Result<(), NetError> {
    for handlers in scopes {
        for hook in handlers.hooks_for(point) {
            hook(&mut *call).await?;
        }
    }
    Ok(())
}
