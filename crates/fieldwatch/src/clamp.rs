#![forbid(unsafe_code)]

//! Bounded numeric wrappers: clamp between live sibling slots, with
//! optional target coupling.
//!
//! [`Clamped`] floors each write and bounds it between its `min` and `max`
//! sibling slots. When coupled to a target sibling, a write that lands
//! above the target's current value drags the target up with it, and both
//! changes ride in one batch. [`ClampedTarget`] is the symmetric wrapper
//! for the target field itself: it roams between the clamped field's live
//! value and the shared `max`, and never touches or reports the base
//! field.
//!
//! Each wrapper reads its sibling slots fresh on every write. Over the
//! same slots the pair maintains `min <= value <= target <= max` as a
//! standing invariant across arbitrary interleavings of writes to either
//! field.
//!
//! # Invariants
//!
//! 1. Bounds are read at write time, never cached at construction.
//! 2. Floor is applied before bounding, so stored values are integral for
//!    integral bounds and always land within `[min, max]`.
//! 3. NaN input coerces to 0 before clamping; NaN is never stored.
//! 4. A base write raises a coupled target, never lowers it, and reports
//!    both fields in a single batch.
//! 5. A target write publishes only the target's own change.
//!
//! # Failure Modes
//!
//! - Inconsistent bound slots (`min > max`, NaN bounds): undefined
//!   behavior by contract; the wrappers never panic, the stored value is
//!   whatever the bounding arithmetic yields.

use crate::change::{Change, ChangeBatch};
use crate::dispatcher::DispatcherSlot;
use crate::slot::NumSlot;

/// Floor, then bound between the live `min`/`max` values.
///
/// Max is applied before min, so min wins when the bounds cross.
fn clamp_floor(value: f64, min: f64, max: f64) -> f64 {
    let value = if value.is_nan() { 0.0 } else { value };
    value.floor().min(max).max(min)
}

struct TargetLink {
    name: &'static str,
    slot: NumSlot,
}

/// Numeric field bounded by two sibling slots, with optional target
/// coupling.
pub struct Clamped {
    name: &'static str,
    value: NumSlot,
    min: NumSlot,
    max: NumSlot,
    target: Option<TargetLink>,
    changes: DispatcherSlot,
}

impl std::fmt::Debug for Clamped {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clamped")
            .field("name", &self.name)
            .field("value", &self.value.get())
            .field("min", &self.min.get())
            .field("max", &self.max.get())
            .field("target", &self.target.as_ref().map(|t| t.name))
            .finish()
    }
}

impl Clamped {
    /// Wrap a numeric field named `name`, bounded by the live values of
    /// `min` and `max`, publishing on `changes`.
    ///
    /// `initial` is stored raw: not clamped, not published.
    #[must_use]
    pub fn new(
        name: &'static str,
        initial: f64,
        min: &NumSlot,
        max: &NumSlot,
        changes: &DispatcherSlot,
    ) -> Self {
        Self {
            name,
            value: NumSlot::new(initial),
            min: min.clone(),
            max: max.clone(),
            target: None,
            changes: changes.clone(),
        }
    }

    /// Couple a target sibling: writes that land above the target's
    /// current value raise it to match, in the same batch.
    ///
    /// `name` is the target field's public name as reported in batches;
    /// `slot` is its backing slot. Without this call, target coupling is
    /// fully disabled.
    #[must_use]
    pub fn with_target(mut self, name: &'static str, slot: &NumSlot) -> Self {
        self.target = Some(TargetLink {
            name,
            slot: slot.clone(),
        });
        self
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

    /// Handle to the backing slot, for use as a sibling's bound (a
    /// [`ClampedTarget`] takes it as its lower bound).
    #[must_use]
    pub fn slot(&self) -> NumSlot {
        self.value.clone()
    }

    /// Floor and clamp `value` into `[min, max]`, store it, and publish.
    ///
    /// Equal stored value is a complete no-op. When a coupled target sits
    /// below the new value it is raised to match, and the raise rides in
    /// the same batch as this field's change. The target is written
    /// directly at the slot level so its own set pipeline never runs.
    pub fn set(&self, value: f64) {
        let new = clamp_floor(value, self.min.get(), self.max.get());
        let old = self.value.get();
        if old == new {
            return;
        }
        self.value.set(new);

        #[cfg(feature = "tracing")]
        tracing::trace!(message = "field.clamp", field = self.name, before = old, after = new);

        let mut batch = ChangeBatch::single(self.name, Change::new(old, new));
        if let Some(target) = &self.target {
            let target_old = target.slot.get();
            if target_old < new {
                target.slot.set(new);
                batch.insert(target.name, Change::new(target_old, new));
            }
        }
        self.changes.publish(&batch);
    }
}

/// Target field bounded between the clamped base field's live value and
/// the shared maximum.
pub struct ClampedTarget {
    name: &'static str,
    value: NumSlot,
    base: NumSlot,
    max: NumSlot,
    changes: DispatcherSlot,
}

impl std::fmt::Debug for ClampedTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClampedTarget")
            .field("name", &self.name)
            .field("value", &self.value.get())
            .field("base", &self.base.get())
            .field("max", &self.max.get())
            .finish()
    }
}

impl ClampedTarget {
    /// Wrap a target field named `name`, bounded below by the live value
    /// of `base` (the clamped field's slot) and above by `max`.
    ///
    /// `initial` is stored raw: not clamped, not published.
    #[must_use]
    pub fn new(
        name: &'static str,
        initial: f64,
        base: &NumSlot,
        max: &NumSlot,
        changes: &DispatcherSlot,
    ) -> Self {
        Self {
            name,
            value: NumSlot::new(initial),
            base: base.clone(),
            max: max.clone(),
            changes: changes.clone(),
        }
    }

    /// Field name used in published batches.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last stored value.
    ///
    /// Reflects raises performed by the coupled [`Clamped`] field, which
    /// writes this wrapper's slot directly.
    #[must_use]
    pub fn get(&self) -> f64 {
        self.value.get()
    }

    /// Handle to the backing slot, for [`Clamped::with_target`].
    #[must_use]
    pub fn slot(&self) -> NumSlot {
        self.value.clone()
    }

    /// Floor and clamp `value` into `[base, max]`, store it, and publish
    /// `{name: Change(old, new)}` only.
    ///
    /// The base field is never touched or reported by this path.
    pub fn set(&self, value: f64) {
        let new = clamp_floor(value, self.base.get(), self.max.get());
        let old = self.value.get();
        if old == new {
            return;
        }
        self.value.set(new);

        #[cfg(feature = "tracing")]
        tracing::trace!(message = "field.clamp_target", field = self.name, before = old, after = new);

        self.changes
            .publish(&ChangeBatch::single(self.name, Change::new(old, new)));
    }
}
