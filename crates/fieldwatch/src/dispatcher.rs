#![forbid(unsafe_code)]

//! Per-entity change broadcast.
//!
//! [`ChangeDispatcher`] fans a [`ChangeBatch`] out to every current
//! subscriber, synchronously, in subscription order. [`DispatcherSlot`] is
//! the lazily-materialized per-entity accessor: field wrappers publish
//! through it, and publishing while no dispatcher was ever created is a
//! silent no-op, so entities that never look at their own change stream
//! pay nothing.
//!
//! Subscribers are stored as `Weak` callbacks and cleaned up lazily during
//! notification; the strong reference lives in the [`Subscription`] guard,
//! so dropping the guard is all it takes to unsubscribe.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in subscription order.
//! 2. Delivery is synchronous: `emit` returns only after every callback ran.
//! 3. A subscriber added while a batch is being delivered sees only future
//!    batches, never the one in flight.
//! 4. Dropping a [`Subscription`] removes the callback before the next
//!    delivery cycle.
//! 5. A slot materializes at most one dispatcher; clones of the slot (and
//!    of the dispatcher) are handles to the same state.
//!
//! # Failure Modes
//!
//! - Publish with no dispatcher: silent no-op, never an error.
//! - Subscriber dropped mid-delivery: the in-flight batch may still reach
//!   it (the delivery snapshot holds the callback alive); it receives
//!   nothing afterwards.

use std::cell::{OnceCell, RefCell};
use std::rc::{Rc, Weak};

use crate::change::ChangeBatch;

type SubscriberFn = dyn Fn(&ChangeBatch);

/// Broadcast channel delivering change batches to subscribers.
///
/// Cloning a `ChangeDispatcher` creates a new handle to the **same**
/// subscriber list.
#[derive(Clone)]
pub struct ChangeDispatcher {
    subscribers: Rc<RefCell<Vec<Weak<SubscriberFn>>>>,
}

impl std::fmt::Debug for ChangeDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeDispatcher")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl Default for ChangeDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeDispatcher {
    /// Create a dispatcher with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Register a callback invoked for every batch emitted after this call.
    ///
    /// The returned [`Subscription`] owns the callback; keep it alive for
    /// as long as the callback should run.
    #[must_use]
    pub fn subscribe(&self, callback: impl Fn(&ChangeBatch) + 'static) -> Subscription {
        let callback: Rc<SubscriberFn> = Rc::new(callback);
        self.subscribers.borrow_mut().push(Rc::downgrade(&callback));
        Subscription {
            _callback: callback,
        }
    }

    /// Deliver `batch` to every current subscriber, in subscription order.
    ///
    /// Dead entries are pruned on the way. Callbacks run without any
    /// internal borrow held, so they may freely subscribe, unsubscribe, or
    /// write wrapped fields (re-entrant emit).
    pub fn emit(&self, batch: &ChangeBatch) {
        let live: Vec<Rc<SubscriberFn>> = {
            let mut subscribers = self.subscribers.borrow_mut();
            subscribers.retain(|weak| weak.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(
            message = "dispatcher.emit",
            fields = batch.len(),
            subscribers = live.len()
        );

        for callback in live {
            callback(batch);
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

/// RAII guard for one dispatcher subscription.
///
/// The callback runs for every batch emitted while the guard is alive.
/// Dropping the guard (or calling [`unsubscribe`](Self::unsubscribe))
/// removes it.
pub struct Subscription {
    _callback: Rc<SubscriberFn>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

impl Subscription {
    /// Remove the callback. Equivalent to dropping the guard.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

/// Lazily-materialized per-entity dispatcher.
///
/// An entity owns one slot and hands clones to each of its field wrappers;
/// all handles share the same (at most one) dispatcher. The dispatcher is
/// created on first [`get_or_create`](Self::get_or_create), so an entity
/// nobody observes never allocates one.
#[derive(Clone, Default)]
pub struct DispatcherSlot {
    inner: Rc<OnceCell<ChangeDispatcher>>,
}

impl std::fmt::Debug for DispatcherSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatcherSlot")
            .field("materialized", &self.inner.get().is_some())
            .finish()
    }
}

impl DispatcherSlot {
    /// Create an empty slot (no dispatcher yet).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The dispatcher, if one was previously created. Never creates one.
    #[must_use]
    pub fn get(&self) -> Option<ChangeDispatcher> {
        self.inner.get().cloned()
    }

    /// The dispatcher, creating and registering it on first call.
    ///
    /// Creation is idempotent: every call returns a handle to the same
    /// dispatcher.
    #[must_use]
    pub fn get_or_create(&self) -> ChangeDispatcher {
        self.inner.get_or_init(ChangeDispatcher::new).clone()
    }

    /// Deliver `batch` if a dispatcher exists; silently do nothing
    /// otherwise.
    pub fn publish(&self, batch: &ChangeBatch) {
        if let Some(dispatcher) = self.inner.get() {
            dispatcher.emit(batch);
        }
    }
}
