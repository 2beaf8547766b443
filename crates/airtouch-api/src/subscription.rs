//! Update notification bookkeeping

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Callback invoked with the id of the unit or zone that changed
pub type UpdateCallback = Arc<dyn Fn(u8) + Send + Sync>;

/// A unique identifier for a registered callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Registered update callbacks for one unit or zone
pub struct Subscribers {
    callbacks: DashMap<SubscriptionId, UpdateCallback>,
    next_id: AtomicU64,
}

impl Subscribers {
    pub fn new() -> Self {
        Self {
            callbacks: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a callback
    pub fn subscribe(&self, callback: UpdateCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        trace!(?id, "Adding update subscriber");
        self.callbacks.insert(id, callback);
        id
    }

    /// Remove a callback, returning whether it was registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        trace!(?id, "Removing update subscriber");
        self.callbacks.remove(&id).is_some()
    }

    /// Invoke every registered callback
    pub fn notify(&self, changed_id: u8) {
        // Collect first so callbacks may (un)subscribe without deadlocking the map
        let callbacks: Vec<UpdateCallback> =
            self.callbacks.iter().map(|r| r.value().clone()).collect();
        trace!(changed_id, subscribers = callbacks.len(), "Notifying subscribers");
        for callback in callbacks {
            callback(changed_id);
        }
    }

    /// Number of registered callbacks
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl Default for Subscribers {
    fn default() -> Self {
        Self::new()
    }
}
