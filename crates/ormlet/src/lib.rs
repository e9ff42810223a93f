//! A minimal unit-of-work persistence layer for relational stores.
//!
//! ormlet maps in-memory entity structs to rows, tracks their identity and
//! mutations inside a [`Session`], and defers every write until the session
//! closes. The session's identity map guarantees at most one live instance
//! per `(type, id)`; snapshot comparison at close time decides which entities
//! get written back.
//!
//! # Example
//!
//! ```ignore
//! use ormlet::{ConnectOptions, SessionFactory};
//!
//! let options = ConnectOptions::new("localhost", "postgres", "postgres")
//!     .password("password");
//! let provider = PgProvider::connect(options)?;
//! let factory = SessionFactory::new(provider);
//!
//! let mut session = factory.open_session();
//! let person = session.find::<Person>(1)?;
//! println!("{:?}", person.read().expect("entity lock poisoned"));
//!
//! person.write().expect("entity lock poisoned").first_name = "Stas".to_string();
//! session.close()?;
//!
//! // A fresh session re-reads the flushed state.
//! let mut session = factory.open_session();
//! println!("{:?}", session.find::<Person>(1)?.read().expect("entity lock poisoned"));
//! ```

mod factory;

pub use factory::SessionFactory;
pub use ormlet_core::{
    ColumnInfo, ConnectOptions, Connection, ConnectionError, ConnectionErrorKind,
    ConnectionProvider, Entity, EntityMeta, Error, FieldMeta, FlushError, FlushFailure, FromValue,
    MetadataError, NotFoundError, QueryError, Result, Row, StateError, TypeError, Value,
};
pub use ormlet_session::{
    EntityKey, EntityRef, IdentityMap, Session, SessionState, Snapshot, SnapshotTable,
};
