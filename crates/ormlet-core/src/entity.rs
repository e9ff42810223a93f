//! Entity trait for struct-to-row mapping.
//!
//! Implementations are hand-written descriptor tables plus accessor methods;
//! there is no runtime introspection. A typical implementation:
//!
//! ```
//! use ormlet_core::{Entity, EntityMeta, FieldMeta, Result, Row, Value};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Person {
//!     id: Option<i64>,
//!     first_name: String,
//!     last_name: String,
//! }
//!
//! static PERSON_META: EntityMeta = EntityMeta::new("Person")
//!     .table("persons")
//!     .fields(&[
//!         FieldMeta::new("id").identifier(),
//!         FieldMeta::new("first_name").column("first_name"),
//!         FieldMeta::new("last_name").column("last_name"),
//!     ]);
//!
//! impl Entity for Person {
//!     fn meta() -> &'static EntityMeta {
//!         &PERSON_META
//!     }
//!
//!     fn to_row(&self) -> Vec<(&'static str, Value)> {
//!         vec![
//!             ("id", self.id.into()),
//!             ("first_name", self.first_name.clone().into()),
//!             ("last_name", self.last_name.clone().into()),
//!         ]
//!     }
//!
//!     fn from_row(row: &Row) -> Result<Self> {
//!         Ok(Self {
//!             id: row.get_named("id")?,
//!             first_name: row.get_named("first_name")?,
//!             last_name: row.get_named("last_name")?,
//!         })
//!     }
//!
//!     fn id(&self) -> Option<i64> {
//!         self.id
//!     }
//! }
//! ```

use crate::Result;
use crate::meta::EntityMeta;
use crate::row::Row;
use crate::value::Value;

/// Trait for types that map to rows of a relational table.
///
/// Identity is defined solely by `(type, id)`, never by field contents; two
/// instances with equal ids name the same logical row even if their fields
/// have diverged in memory.
pub trait Entity: Sized + Send + Sync {
    /// The descriptor table for this entity type.
    fn meta() -> &'static EntityMeta;

    /// Read every declared field's current value, in declaration order.
    ///
    /// Pairs are `(field name, value)`; column mapping is the descriptor's
    /// job, not this method's.
    fn to_row(&self) -> Vec<(&'static str, Value)>;

    /// Construct an instance from a decoded result row.
    ///
    /// Each field binds by its explicit column name, or by its own name when
    /// no mapping exists.
    fn from_row(row: &Row) -> Result<Self>;

    /// The identifier value; `None` until the entity has been persisted.
    fn id(&self) -> Option<i64>;
}
