//! The unit-of-work session.
//!
//! A [`Session`] tracks every entity it loads and applies their changes to
//! the store as one deferred batch at [`Session::close`]. Between load and
//! close, callers mutate entities in place through the shared handles the
//! session hands out; no writes happen until close.
//!
//! A session is single-threaded state used sequentially for exactly one
//! logical unit of work. Independent sessions may run concurrently against
//! the same store, but nothing coordinates them: two sessions can load and
//! mutate their own copy of the same row, and whichever closes last wins,
//! silently overwriting the other's changes.

use crate::identity_map::{EntityRef, IdentityMap};
use crate::snapshot::{Snapshot, SnapshotTable};
use crate::{EntityKey, sql};
use ormlet_core::{
    Connection, ConnectionProvider, Entity, EntityMeta, FlushError, FlushFailure, MetadataError,
    NotFoundError, Result, StateError, Value,
};

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepting `find` and `update`.
    Open,
    /// Flush performed, all tracking cleared; no further operations.
    Closed,
}

/// The central unit-of-work manager.
///
/// Orchestrates find/load, caches via the identity map, tracks load-time
/// snapshots, and on close diffs every cached entity against its snapshot,
/// issuing one UPDATE per changed entity.
pub struct Session<P: ConnectionProvider> {
    /// Supplies one connection per store operation.
    provider: P,
    /// At most one live instance per `(type, id)`.
    store: IdentityMap,
    /// Load-time snapshots, in lockstep with the store.
    snapshots: SnapshotTable,
    /// Lifecycle state.
    state: SessionState,
}

impl<P: ConnectionProvider> Session<P> {
    /// Create a new open session over a connection provider.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            store: IdentityMap::new(),
            snapshots: SnapshotTable::new(),
            state: SessionState::Open,
        }
    }

    /// Get the session's lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Get a reference to the underlying connection provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Load an entity by id.
    ///
    /// On a cache hit the identity-mapped handle is returned unchanged with
    /// no store round-trip. On a miss, a parameterized SELECT runs through a
    /// fresh connection scope, exactly the first result row is decoded (zero
    /// rows fail with a not-found error), and the new entity is registered
    /// together with its load-time snapshot.
    #[tracing::instrument(level = "debug", skip(self), fields(entity = E::meta().entity))]
    pub fn find<E: Entity + 'static>(&mut self, id: i64) -> Result<EntityRef<E>> {
        self.ensure_open("find")?;

        let key = EntityKey::of::<E>(id);
        if let Some(cached) = self.store.get::<E>(&key) {
            tracing::debug!(id, "identity map hit");
            return Ok(cached);
        }

        let meta = E::meta();
        let table = meta.table_name()?;
        let statement = sql::select_by_id(table);

        // The connection lives for this one SELECT; the scope releases it on
        // success, decode failure, and execution failure alike.
        let row = {
            let mut conn = self.provider.acquire()?;
            let mut rows = conn.query(&statement, &[Value::BigInt(id)])?;
            if rows.is_empty() {
                return Err(NotFoundError {
                    table: table.to_string(),
                    id,
                }
                .into());
            }
            rows.swap_remove(0)
        };

        let entity = E::from_row(&row)?;
        let handle = self.store.put(key, table, entity);
        let fields = handle.read().expect("entity lock poisoned").to_row();
        self.snapshots.record(key, data_snapshot(meta, &fields));
        tracing::debug!(id, table, "loaded and registered");
        Ok(handle)
    }

    /// Write an entity's current state to the store.
    ///
    /// Renders every non-identifier field, changed or not, into a single
    /// UPDATE keyed by id. This is the flush primitive `close` runs for each
    /// dirty entity; it is not a partial-update API, and updating a detached
    /// entity does not make any session start tracking it.
    #[tracing::instrument(level = "debug", skip(self, entity), fields(entity = E::meta().entity))]
    pub fn update<E: Entity>(&mut self, entity: &E) -> Result<()> {
        self.ensure_open("update")?;

        let meta = E::meta();
        let table = meta.table_name()?;
        let id = entity
            .id()
            .ok_or_else(|| MetadataError::missing_identifier(meta.entity))?;
        let fields = entity.to_row();
        execute_update(&self.provider, meta, table, id, &fields)
    }

    /// Flush changed entities and clear all tracking.
    ///
    /// Every cached entity's snapshot is recomputed and compared to the one
    /// taken at load; each changed entity gets one UPDATE through its own
    /// connection scope. One entity's failure never blocks the rest: failures
    /// are collected and reported in aggregate after the whole pass. Both the
    /// identity map and the snapshot table are cleared unconditionally, so a
    /// session never leaks tracking state, flush errors included.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn close(&mut self) -> Result<()> {
        self.ensure_open("close")?;
        self.state = SessionState::Closed;

        let mut failures = Vec::new();
        for (key, tracked) in self.store.iter() {
            let fields = (tracked.read_fields)();
            let current = data_snapshot(tracked.meta, &fields);
            if !self.snapshots.is_dirty(key, &current) {
                continue;
            }
            tracing::debug!(table = tracked.table, id = tracked.id, "flushing changed entity");
            if let Err(source) =
                execute_update(&self.provider, tracked.meta, tracked.table, tracked.id, &fields)
            {
                tracing::debug!(
                    table = tracked.table,
                    id = tracked.id,
                    error = %source,
                    "flush failed for entity"
                );
                failures.push(FlushFailure {
                    table: tracked.table,
                    id: tracked.id,
                    source: Box::new(source),
                });
            }
        }

        self.store.clear();
        self.snapshots.clear_all();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(FlushError { failures }.into())
        }
    }

    fn ensure_open(&self, operation: &'static str) -> Result<()> {
        match self.state {
            SessionState::Open => Ok(()),
            SessionState::Closed => Err(StateError::closed(operation).into()),
        }
    }
}

/// Capture a snapshot of the non-identifier fields.
fn data_snapshot(meta: &'static EntityMeta, fields: &[(&'static str, Value)]) -> Snapshot {
    let identifier = meta.identifier_field().map(|f| f.name);
    let data: Vec<(&'static str, Value)> = fields
        .iter()
        .filter(|(name, _)| Some(*name) != identifier)
        .cloned()
        .collect();
    Snapshot::capture(&data)
}

/// Run one UPDATE for an entity's current field values.
///
/// Acquires its own connection, binds every non-identifier column in
/// declaration order followed by the id, and releases the connection when
/// the scope ends, whichever way it ends.
fn execute_update<P: ConnectionProvider>(
    provider: &P,
    meta: &'static EntityMeta,
    table: &'static str,
    id: i64,
    fields: &[(&'static str, Value)],
) -> Result<()> {
    let identifier = meta.identifier_field().map(|f| f.name);

    let mut columns = Vec::new();
    let mut params = Vec::new();
    for (name, value) in fields {
        if Some(*name) == identifier {
            continue;
        }
        columns.push(meta.column_name(*name));
        params.push(value.clone());
    }

    let statement = sql::update_by_id(table, &columns);
    params.push(Value::BigInt(id));

    let mut conn = provider.acquire()?;
    conn.execute(&statement, &params)?;
    Ok(())
}
