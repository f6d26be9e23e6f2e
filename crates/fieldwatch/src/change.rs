#![forbid(unsafe_code)]

//! Change records and per-write change batches.
//!
//! A [`Change`] is the immutable before/after pair for one field
//! transition. A [`ChangeBatch`] maps field names to the changes produced
//! as a side effect of a single logical write — usually one entry, two when
//! a clamped write drags its coupled target along — and is delivered to
//! subscribers as one notification.
//!
//! # Invariants
//!
//! 1. A `Change` is created once per field mutation and never mutated
//!    afterward; it has no identity beyond its values.
//! 2. A published batch carries at least one entry (wrappers publish
//!    nothing for no-op writes).
//! 3. Entry order is not significant; lookups are by field name.

use ahash::AHashMap;

/// Immutable before/after pair for one field transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change<T> {
    /// Value stored before the write.
    pub before: T,
    /// Value stored by the write.
    pub after: T,
}

impl<T> Change<T> {
    /// Record a transition from `before` to `after`.
    #[must_use]
    pub fn new(before: T, after: T) -> Self {
        Self { before, after }
    }
}

/// A change to one field of either primitive kind.
///
/// One entity stream mixes boolean and numeric fields, so batch entries
/// carry the kind alongside the pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldChange {
    /// Transition of a boolean field.
    Bool(Change<bool>),
    /// Transition of a numeric field.
    Number(Change<f64>),
}

impl FieldChange {
    /// The boolean transition, if this is a boolean field change.
    #[must_use]
    pub fn as_bool(self) -> Option<Change<bool>> {
        match self {
            Self::Bool(change) => Some(change),
            Self::Number(_) => None,
        }
    }

    /// The numeric transition, if this is a numeric field change.
    #[must_use]
    pub fn as_number(self) -> Option<Change<f64>> {
        match self {
            Self::Number(change) => Some(change),
            Self::Bool(_) => None,
        }
    }
}

impl From<Change<bool>> for FieldChange {
    fn from(change: Change<bool>) -> Self {
        Self::Bool(change)
    }
}

impl From<Change<f64>> for FieldChange {
    fn from(change: Change<f64>) -> Self {
        Self::Number(change)
    }
}

/// All fields mutated as a side effect of one logical write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeBatch {
    fields: AHashMap<&'static str, FieldChange>,
}

impl ChangeBatch {
    /// Create an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a batch holding a single field change.
    #[must_use]
    pub fn single(name: &'static str, change: impl Into<FieldChange>) -> Self {
        let mut batch = Self::new();
        batch.insert(name, change);
        batch
    }

    /// Add (or replace) the change recorded for `name`.
    pub fn insert(&mut self, name: &'static str, change: impl Into<FieldChange>) {
        self.fields.insert(name, change.into());
    }

    /// The change recorded for `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<FieldChange> {
        self.fields.get(name).copied()
    }

    /// The numeric change recorded for `name`, if any.
    #[must_use]
    pub fn number(&self, name: &str) -> Option<Change<f64>> {
        self.get(name).and_then(FieldChange::as_number)
    }

    /// The boolean change recorded for `name`, if any.
    #[must_use]
    pub fn boolean(&self, name: &str) -> Option<Change<bool>> {
        self.get(name).and_then(FieldChange::as_bool)
    }

    /// Whether the batch records a change for `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Whether the batch records a change for any of `names`.
    #[must_use]
    pub fn has_any(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.contains(name))
    }

    /// Number of fields recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the batch records no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(field name, change)` entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, FieldChange)> + '_ {
        self.fields.iter().map(|(name, change)| (*name, *change))
    }
}
