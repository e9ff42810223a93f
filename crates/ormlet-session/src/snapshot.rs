//! Snapshot-based change detection.
//!
//! A snapshot is the ordered sequence of an entity's field values at load
//! time, sorted lexicographically by field name so that any two snapshots of
//! the same entity shape are positionally comparable. Snapshots are immutable
//! once taken; detecting change means capturing a *new* sequence and
//! comparing, never mutating the stored one.
//!
//! The engine assumes the entity's shape is stable between capture and
//! comparison; a structure that changes mid-session is undefined behavior.

use crate::EntityKey;
use ormlet_core::Value;
use std::collections::HashMap;

/// An entity's field values at a point in time, sorted by field name.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    values: Vec<Value>,
}

impl Snapshot {
    /// Capture a snapshot from `(field name, value)` pairs.
    ///
    /// Pairs may arrive in any order; capture sorts by field name so the
    /// resulting sequence is deterministic.
    pub fn capture(fields: &[(&'static str, Value)]) -> Self {
        let mut sorted: Vec<&(&'static str, Value)> = fields.iter().collect();
        sorted.sort_by_key(|(name, _)| *name);
        Self {
            values: sorted.into_iter().map(|(_, v)| v.clone()).collect(),
        }
    }

    /// Positional pairwise comparison against another snapshot.
    ///
    /// Two nulls at the same position compare equal; null against non-null
    /// signals change. Sequences of different lengths never match.
    pub fn matches(&self, other: &Snapshot) -> bool {
        self.values == other.values
    }

    /// The captured values, in field-name order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// Maps each tracked entity to its load-time snapshot.
///
/// Maintained in lockstep with the identity map: every key present in one is
/// present in the other, and both are cleared together at session close.
#[derive(Default)]
pub struct SnapshotTable {
    snapshots: HashMap<EntityKey, Snapshot>,
}

impl SnapshotTable {
    /// Create a new empty snapshot table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            snapshots: HashMap::new(),
        }
    }

    /// Store the load-time snapshot for a key.
    pub fn record(&mut self, key: EntityKey, snapshot: Snapshot) {
        self.snapshots.insert(key, snapshot);
    }

    /// Compare a freshly captured snapshot to the stored one.
    ///
    /// A key with no stored snapshot is treated as changed.
    pub fn is_dirty(&self, key: &EntityKey, current: &Snapshot) -> bool {
        match self.snapshots.get(key) {
            Some(stored) => !stored.matches(current),
            None => true,
        }
    }

    /// Check if a snapshot exists for the given key.
    pub fn has_snapshot(&self, key: &EntityKey) -> bool {
        self.snapshots.contains_key(key)
    }

    /// Clear all snapshots.
    pub fn clear_all(&mut self) {
        self.snapshots.clear();
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Check if there are no snapshots.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
