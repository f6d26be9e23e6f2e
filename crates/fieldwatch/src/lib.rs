#![forbid(unsafe_code)]

//! Change-tracked field wrappers for plain data entities.
//!
//! `fieldwatch` turns the fields of an ordinary struct into normalized,
//! change-tracked properties. Writing through a wrapper coerces the
//! incoming value, compares it to the stored one, and publishes a
//! [`ChangeBatch`] on the entity's dispatcher only when the effective
//! value actually changed. Reads always return the last stored value.
//!
//! Three write policies are provided:
//!
//! - [`WatchedBool`] / [`WatchedNumber`] store on difference and publish a
//!   one-field batch.
//! - [`Clamped`] floors and bounds each write between two sibling slots
//!   read live, optionally dragging a coupled target field upward in the
//!   same batch when exceeded.
//! - [`ClampedTarget`] is the symmetric wrapper for the target field,
//!   bounded between the clamped field's live value and the shared
//!   maximum.
//!
//! Everything is single-threaded and synchronous: a write computes,
//! stores, and delivers to every subscriber before returning.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use fieldwatch::{Change, Clamped, ClampedTarget, DispatcherSlot, NumSlot, WatchedBool};
//!
//! struct Reactor {
//!     changes: DispatcherSlot,
//!     online: WatchedBool,
//!     power: Clamped,
//!     power_target: ClampedTarget,
//! }
//!
//! impl Reactor {
//!     fn new() -> Self {
//!         let changes = DispatcherSlot::new();
//!         let power_min = NumSlot::new(0.0);
//!         let power_max = NumSlot::new(10.0);
//!         let power = Clamped::new("power", 0.0, &power_min, &power_max, &changes);
//!         let power_target =
//!             ClampedTarget::new("power_target", 8.0, &power.slot(), &power_max, &changes);
//!         let power = power.with_target("power_target", &power_target.slot());
//!         Self {
//!             online: WatchedBool::new("online", false, &changes),
//!             power,
//!             power_target,
//!             changes,
//!         }
//!     }
//! }
//!
//! let reactor = Reactor::new();
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//! let _sub = reactor
//!     .changes
//!     .get_or_create()
//!     .subscribe(move |batch| sink.borrow_mut().push(batch.clone()));
//!
//! reactor.online.set(true);
//! reactor.power.set(50.0); // clamped to 10, drags the target 8 -> 10
//!
//! assert_eq!(reactor.power.get(), 10.0);
//! assert_eq!(reactor.power_target.get(), 10.0);
//!
//! let batches = seen.borrow();
//! assert_eq!(batches[0].boolean("online"), Some(Change::new(false, true)));
//! assert_eq!(batches[1].number("power"), Some(Change::new(0.0, 10.0)));
//! assert_eq!(batches[1].number("power_target"), Some(Change::new(8.0, 10.0)));
//!
//! drop(batches);
//! reactor.power.set(100.0); // already pinned at the max: no publish
//! assert_eq!(seen.borrow().len(), 2);
//! ```

pub mod change;
pub mod clamp;
pub mod dispatcher;
pub mod slot;
pub mod watch;

pub use change::{Change, ChangeBatch, FieldChange};
pub use clamp::{Clamped, ClampedTarget};
pub use dispatcher::{ChangeDispatcher, DispatcherSlot, Subscription};
pub use slot::NumSlot;
pub use watch::{WatchedBool, WatchedNumber};
