//! Control-event bus
//!
//! Out-of-band signals (`Flush`, `Reset`) travel here instead of through the
//! message pipeline. Stateful processors subscribe while their channel is
//! being built and react when the logger publishes.
//!
//! ## Rules
//! - `publish` delivers synchronously, in subscription order.
//! - Listeners are snapshotted before delivery, so a listener may subscribe
//!   or unsubscribe without deadlocking the bus.
//! - A panicking listener does not stop delivery to the remaining ones; its
//!   panic is returned to the publisher as an error.

use super::error::LoggerError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Control signal broadcast by a logger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoggerEvent {
    /// Deliver anything buffered now
    Flush,
    /// The logger is about to discard its channels
    Reset,
}

pub type Listener = Arc<dyn Fn(&LoggerEvent) + Send + Sync>;

#[derive(Default)]
struct BusInner {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(u64, Listener)>>,
}

#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; the returned handle removes it again
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&LoggerEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.write().push((id, Arc::new(listener)));
        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver `event` to every listener registered at call time
    pub fn publish(&self, event: LoggerEvent) -> Vec<LoggerError> {
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        let mut errors = Vec::new();
        for listener in listeners {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| listener(&event))) {
                errors.push(LoggerError::ListenerPanicked {
                    message: super::error::panic_message(payload.as_ref()),
                });
            }
        }
        errors
    }

    /// Remove every listener
    pub fn clear(&self) {
        self.inner.listeners.write().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.listeners.read().is_empty()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Deregistration handle returned by `EventBus::subscribe`.
///
/// Dropping the handle keeps the listener registered; call `unsubscribe`
/// to remove it.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: u64,
    bus: Weak<BusInner>,
}

impl Subscription {
    /// Remove the listener; returns `false` if it was already gone
    pub fn unsubscribe(&self) -> bool {
        let Some(bus) = self.bus.upgrade() else {
            return false;
        };
        let mut listeners = bus.listeners.write();
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != self.id);
        listeners.len() != before
    }
}
