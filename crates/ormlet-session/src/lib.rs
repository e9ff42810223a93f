//! Unit of work session for ormlet.
//!
//! `ormlet-session` is the **unit-of-work layer**. It coordinates object
//! identity, snapshot-based change detection, and deferred writes against a
//! relational store.
//!
//! # Role In The Architecture
//!
//! - **Identity map**: ensures a single in-memory instance per `(type, id)`.
//! - **Snapshot table**: records each entity's load-time field values.
//! - **Session**: serves `find`, and on `close` diffs every cached entity
//!   against its snapshot, flushing the changed ones with one UPDATE each.
//!
//! # Design Philosophy
//!
//! - **Explicit over implicit**: writes happen at `close`, nowhere else.
//! - **Blocking by contract**: every store access runs to completion on the
//!   caller's thread; a session is single-threaded state.
//! - **Type erasure at the edge**: the identity map stores erased handles but
//!   every public lookup is strongly typed through the `(TypeId, id)` key.
//!
//! # Example
//!
//! ```ignore
//! let mut session = Session::new(provider);
//!
//! // Load by primary key (registers the entity and its snapshot)
//! let person = session.find::<Person>(1)?;
//!
//! // Mutate in place through the shared handle
//! person.write().expect("entity lock poisoned").first_name = "Stas".to_string();
//!
//! // Flush changed entities and clear all tracking
//! session.close()?;
//! ```

pub mod identity_map;
pub mod snapshot;
pub mod sql;
pub mod unit_of_work;

pub use identity_map::{EntityRef, IdentityMap};
pub use snapshot::{Snapshot, SnapshotTable};
pub use unit_of_work::{Session, SessionState};

use ormlet_core::Entity;
use std::any::TypeId;

/// Unique key for an entity in the identity map: entity type plus id.
///
/// Ids are unique only within a type, so both components participate in
/// hashing and equality. The type tag makes a mismatched-type lookup
/// unrepresentable at the API surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityKey {
    /// Type identifier for the entity type.
    type_id: TypeId,
    /// Primary key value.
    id: i64,
}

impl EntityKey {
    /// Create a key for an entity type and id.
    pub fn of<E: Entity + 'static>(id: i64) -> Self {
        Self {
            type_id: TypeId::of::<E>(),
            id,
        }
    }

    /// Get the id component.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Get the type identifier component.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}
