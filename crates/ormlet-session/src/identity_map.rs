//! Identity map: at most one in-memory instance per `(type, id)`.
//!
//! Every entity the session loads is held behind an `Arc<RwLock<E>>` so
//! callers can mutate it in place while the session keeps the single
//! authoritative handle. Repeated `get` calls for the same key return clones
//! of the *same* `Arc`: reference identity, never a fresh decode.
//!
//! Entries also carry the flush metadata the session needs at close time
//! (resolved table, id, and a closure re-reading the live entity's fields),
//! captured while the concrete type is still in scope so the close-time diff
//! never has to downcast per entity type.

use crate::EntityKey;
use ormlet_core::{Entity, EntityMeta, Value};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A shared handle to an identity-mapped entity.
pub type EntityRef<E> = Arc<RwLock<E>>;

/// Reads the live entity's declared fields as `(field name, value)` pairs.
type FieldReader = Box<dyn Fn() -> Vec<(&'static str, Value)> + Send + Sync>;

/// A tracked entry: the type-erased handle plus flush metadata.
pub(crate) struct Tracked {
    /// Type-erased `Arc<RwLock<E>>`.
    handle: Box<dyn Any + Send + Sync>,
    /// Resolved table name (checked before registration).
    pub(crate) table: &'static str,
    /// The entity's id.
    pub(crate) id: i64,
    /// Descriptor table, for column mapping at flush time.
    pub(crate) meta: &'static EntityMeta,
    /// Re-reads the entity's current field values through the shared handle.
    pub(crate) read_fields: FieldReader,
}

/// Identity map keyed by [`EntityKey`].
///
/// Pure in-memory state; the session is its only writer and no I/O happens
/// here.
#[derive(Default)]
pub struct IdentityMap {
    entries: HashMap<EntityKey, Tracked>,
}

impl IdentityMap {
    /// Create a new empty identity map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register an entity under a key, returning its shared handle.
    ///
    /// The caller is expected to have checked for an existing entry first;
    /// registering over a live key replaces the previous handle.
    pub fn put<E: Entity + 'static>(
        &mut self,
        key: EntityKey,
        table: &'static str,
        entity: E,
    ) -> EntityRef<E> {
        let arc: EntityRef<E> = Arc::new(RwLock::new(entity));
        let reader = Arc::clone(&arc);
        let tracked = Tracked {
            handle: Box::new(Arc::clone(&arc)),
            table,
            id: key.id(),
            meta: E::meta(),
            read_fields: Box::new(move || {
                reader.read().expect("entity lock poisoned").to_row()
            }),
        };
        self.entries.insert(key, tracked);
        arc
    }

    /// Get the handle registered for a key, if any.
    ///
    /// The returned `Arc` is a clone of the stored one; modifications through
    /// it are visible to the session.
    pub fn get<E: Entity + 'static>(&self, key: &EntityKey) -> Option<EntityRef<E>> {
        let entry = self.entries.get(key)?;
        let arc = entry.handle.downcast_ref::<EntityRef<E>>()?;
        Some(Arc::clone(arc))
    }

    /// Check if a key is registered.
    pub fn contains(&self, key: &EntityKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over tracked entries for the close-time diff.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&EntityKey, &Tracked)> {
        self.entries.iter()
    }

    /// Clear all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Get the number of entries in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
