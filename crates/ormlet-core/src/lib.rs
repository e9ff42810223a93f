//! Core types and traits for the ormlet persistence layer.
//!
//! This crate provides the foundational abstractions the unit-of-work session
//! is built on:
//!
//! - `Entity` trait for struct-to-row mapping
//! - `EntityMeta`/`FieldMeta` declarative descriptor tables
//! - `Value` and `Row` for dynamically-typed store data
//! - `Connection`/`ConnectionProvider` boundary traits
//! - The error taxonomy shared by every layer

pub mod connection;
pub mod entity;
pub mod error;
pub mod meta;
pub mod row;
pub mod value;

pub use connection::{ConnectOptions, Connection, ConnectionProvider};
pub use entity::Entity;
pub use error::{
    ConnectionError, ConnectionErrorKind, Error, FlushError, FlushFailure, MetadataError,
    NotFoundError, QueryError, Result, StateError, TypeError,
};
pub use meta::{EntityMeta, FieldMeta};
pub use row::{ColumnInfo, FromValue, Row};
pub use value::Value;
