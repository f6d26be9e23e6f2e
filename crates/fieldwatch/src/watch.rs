#![forbid(unsafe_code)]

//! Plain watch wrappers: store on difference, publish a one-field batch.
//!
//! [`WatchedBool`] and [`WatchedNumber`] pair a private backing slot with a
//! public `get`/`set` surface. A write compares the incoming value to the
//! stored one and, only when they differ, stores it and publishes
//! `{name: Change(old, new)}` on the entity's [`DispatcherSlot`].
//!
//! # Invariants
//!
//! 1. `get()` always returns the last stored value.
//! 2. Re-assigning the stored value is a complete no-op: no storage write,
//!    no publish.
//! 3. Numeric comparison is `f64`'s `==`: NaN never equals NaN, so
//!    repeated NaN writes store and publish every time.
//! 4. Construction stores the initial value raw and publishes nothing.

use std::cell::Cell;

use crate::change::{Change, ChangeBatch};
use crate::dispatcher::DispatcherSlot;
use crate::slot::NumSlot;

/// Change-tracked boolean field.
#[derive(Debug)]
pub struct WatchedBool {
    name: &'static str,
    value: Cell<bool>,
    changes: DispatcherSlot,
}

impl WatchedBool {
    /// Wrap a boolean field named `name`, publishing on `changes`.
    #[must_use]
    pub fn new(name: &'static str, initial: bool, changes: &DispatcherSlot) -> Self {
        Self {
            name,
            value: Cell::new(initial),
            changes: changes.clone(),
        }
    }

    /// Field name used in published batches.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last stored value.
    #[must_use]
    pub fn get(&self) -> bool {
        self.value.get()
    }

    /// Store `value` and publish, unless it equals the stored value.
    pub fn set(&self, value: bool) {
        let old = self.value.get();
        if old == value {
            return;
        }
        self.value.set(value);

        #[cfg(feature = "tracing")]
        tracing::trace!(message = "field.set", field = self.name, before = old, after = value);

        self.changes
            .publish(&ChangeBatch::single(self.name, Change::new(old, value)));
    }
}

/// Change-tracked numeric field.
///
/// NaN is stored as-is and, being unequal to itself, republishes on every
/// write; use [`Clamped`](crate::Clamped) for fields that must stay
/// in-range and finite.
#[derive(Debug)]
pub struct WatchedNumber {
    name: &'static str,
    value: NumSlot,
    changes: DispatcherSlot,
}

impl WatchedNumber {
    /// Wrap a numeric field named `name`, publishing on `changes`.
    #[must_use]
    pub fn new(name: &'static str, initial: f64, changes: &DispatcherSlot) -> Self {
        Self {
            name,
            value: NumSlot::new(initial),
            changes: changes.clone(),
        }
    }

    /// Field name used in published batches.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last stored value.
    #[must_use]
    pub fn get(&self) -> f64 {
        self.value.get()
    }

    /// Handle to the backing slot, for use as another field's bound.
    #[must_use]
    pub fn slot(&self) -> NumSlot {
        self.value.clone()
    }

    /// Store `value` and publish, unless it equals the stored value.
    ///
    /// NaN equals nothing, so a NaN write always stores and publishes.
    pub fn set(&self, value: f64) {
        let old = self.value.get();
        if old == value {
            return;
        }
        self.value.set(value);

        #[cfg(feature = "tracing")]
        tracing::trace!(message = "field.set", field = self.name, before = old, after = value);

        self.changes
            .publish(&ChangeBatch::single(self.name, Change::new(old, value)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn collect(changes: &DispatcherSlot) -> (Rc<RefCell<Vec<ChangeBatch>>>, crate::Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = changes
            .get_or_create()
            .subscribe(move |batch| sink.borrow_mut().push(batch.clone()));
        (seen, sub)
    }

    #[test]
    fn bool_accessor() {
        let changes = DispatcherSlot::new();
        let flag = WatchedBool::new("flag", false, &changes);

        assert_eq!(flag.name(), "flag");
        assert!(!flag.get());
        flag.set(true);
        assert!(flag.get());
        flag.set(false);
        assert!(!flag.get());
    }

    #[test]
    fn bool_publishes_on_change() {
        let changes = DispatcherSlot::new();
        let flag = WatchedBool::new("flag", false, &changes);
        let (seen, _sub) = collect(&changes);

        flag.set(true);
        flag.set(false);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], ChangeBatch::single("flag", Change::new(false, true)));
        assert_eq!(seen[1], ChangeBatch::single("flag", Change::new(true, false)));
    }

    #[test]
    fn bool_same_value_does_not_publish() {
        let changes = DispatcherSlot::new();
        let flag = WatchedBool::new("flag", false, &changes);
        let (seen, _sub) = collect(&changes);

        flag.set(false);
        assert!(seen.borrow().is_empty());

        flag.set(true);
        assert_eq!(seen.borrow().len(), 1);
        flag.set(true);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn bool_without_dispatcher_still_stores() {
        let changes = DispatcherSlot::new();
        let flag = WatchedBool::new("flag", false, &changes);

        flag.set(true);
        assert!(flag.get());
        assert!(changes.get().is_none());
    }

    #[test]
    fn number_accessor() {
        let changes = DispatcherSlot::new();
        let value = WatchedNumber::new("value", 0.0, &changes);

        assert_eq!(value.name(), "value");
        assert_eq!(value.get(), 0.0);
        value.set(5.0);
        assert_eq!(value.get(), 5.0);
        value.set(9_007_199_254_740_991.0);
        assert_eq!(value.get(), 9_007_199_254_740_991.0);
    }

    #[test]
    fn number_publishes_on_change() {
        let changes = DispatcherSlot::new();
        let value = WatchedNumber::new("value", 0.0, &changes);
        let (seen, _sub) = collect(&changes);

        value.set(100.0);
        assert_eq!(value.get(), 100.0);
        value.set(25.678);
        assert_eq!(value.get(), 25.678);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], ChangeBatch::single("value", Change::new(0.0, 100.0)));
        assert_eq!(seen[1], ChangeBatch::single("value", Change::new(100.0, 25.678)));
    }

    #[test]
    fn number_same_value_does_not_publish() {
        let changes = DispatcherSlot::new();
        let value = WatchedNumber::new("value", 0.0, &changes);
        let (seen, _sub) = collect(&changes);

        value.set(0.0);
        assert!(seen.borrow().is_empty());

        value.set(50.0);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn nan_is_stored_and_republishes() {
        let changes = DispatcherSlot::new();
        let value = WatchedNumber::new("value", 1.234, &changes);
        let (seen, _sub) = collect(&changes);

        value.set(f64::NAN);
        assert!(value.get().is_nan());
        assert_eq!(seen.borrow().len(), 1);
        let first = seen.borrow()[0].number("value").expect("numeric change");
        assert_eq!(first.before, 1.234);
        assert!(first.after.is_nan());

        // NaN != NaN: the second NaN write fires again.
        value.set(f64::NAN);
        assert!(value.get().is_nan());
        assert_eq!(seen.borrow().len(), 2);
        let second = seen.borrow()[1].number("value").expect("numeric change");
        assert!(second.before.is_nan());
        assert!(second.after.is_nan());

        // And leaving NaN publishes normally.
        value.set(0.0);
        assert_eq!(value.get(), 0.0);
        assert_eq!(seen.borrow().len(), 3);
        let third = seen.borrow()[2].number("value").expect("numeric change");
        assert!(third.before.is_nan());
        assert_eq!(third.after, 0.0);
    }

    #[test]
    fn number_without_dispatcher_still_stores() {
        let changes = DispatcherSlot::new();
        let value = WatchedNumber::new("value", 0.0, &changes);

        value.set(100.0);
        assert_eq!(value.get(), 100.0);
        assert!(changes.get().is_none());
    }

    #[test]
    fn multiple_fields_share_one_stream() {
        let changes = DispatcherSlot::new();
        let value = WatchedNumber::new("value", 0.0, &changes);
        let other = WatchedNumber::new("other", -100.0, &changes);
        let (seen, _sub) = collect(&changes);

        value.set(12.34);
        other.set(50.0);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], ChangeBatch::single("value", Change::new(0.0, 12.34)));
        assert_eq!(seen[1], ChangeBatch::single("other", Change::new(-100.0, 50.0)));
    }

    #[test]
    fn slot_handle_tracks_the_field() {
        let changes = DispatcherSlot::new();
        let value = WatchedNumber::new("value", 3.0, &changes);
        let slot = value.slot();

        assert_eq!(slot.get(), 3.0);
        value.set(7.0);
        assert_eq!(slot.get(), 7.0);
    }

    #[test]
    fn construction_does_not_publish() {
        let changes = DispatcherSlot::new();
        let (seen, _sub) = collect(&changes);

        let _flag = WatchedBool::new("flag", true, &changes);
        let _value = WatchedNumber::new("value", 42.0, &changes);
        assert!(seen.borrow().is_empty());
    }
}
