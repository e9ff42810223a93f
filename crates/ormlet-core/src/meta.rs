//! Declarative entity metadata.
//!
//! Table and column mappings are explicit descriptor tables built once per
//! entity type, not derived at runtime. The descriptor enumerates every
//! declared field, including the identifier, in a stable order; snapshot
//! capture and UPDATE rendering depend on that stability.

use crate::error::MetadataError;

/// Metadata about a single entity field.
#[derive(Debug, Clone)]
pub struct FieldMeta {
    /// Field name on the entity type
    pub name: &'static str,
    /// Database column name, when it differs from the field name
    pub column: Option<&'static str>,
    /// Whether this field is the entity's identifier
    pub identifier: bool,
}

impl FieldMeta {
    /// Create a field descriptor mapped to a column of the same name.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            column: None,
            identifier: false,
        }
    }

    /// Set an explicit database column name.
    pub const fn column(mut self, name: &'static str) -> Self {
        self.column = Some(name);
        self
    }

    /// Mark this field as the identifier.
    pub const fn identifier(mut self) -> Self {
        self.identifier = true;
        self
    }

    /// The column this field binds to; the field name when no explicit
    /// mapping exists.
    pub fn column_name(&self) -> &'static str {
        self.column.unwrap_or(self.name)
    }
}

/// Metadata about an entity type: its table mapping and field descriptors.
///
/// The table mapping is optional at declaration time; querying a type without
/// one is a configuration error surfaced by [`EntityMeta::table_name`].
#[derive(Debug, Clone)]
pub struct EntityMeta {
    /// Entity type name, used in error messages.
    pub entity: &'static str,
    table: Option<&'static str>,
    fields: &'static [FieldMeta],
}

impl EntityMeta {
    /// Create metadata for an entity type with no table mapping.
    pub const fn new(entity: &'static str) -> Self {
        Self {
            entity,
            table: None,
            fields: &[],
        }
    }

    /// Declare the table this entity maps to.
    pub const fn table(mut self, name: &'static str) -> Self {
        self.table = Some(name);
        self
    }

    /// Declare the field descriptors, in declaration order.
    pub const fn fields(mut self, fields: &'static [FieldMeta]) -> Self {
        self.fields = fields;
        self
    }

    /// Resolve the table name, failing when the type declares none.
    pub fn table_name(&self) -> Result<&'static str, MetadataError> {
        self.table
            .ok_or_else(|| MetadataError::missing_table(self.entity))
    }

    /// Resolve a field's column name, defaulting to the field name itself.
    ///
    /// Unknown fields also fall back to their own name; the descriptor table
    /// is the source of truth for *mappings*, not for field existence.
    pub fn column_name(&self, field: &'static str) -> &'static str {
        self.fields
            .iter()
            .find(|f| f.name == field)
            .map_or(field, FieldMeta::column_name)
    }

    /// All declared field descriptors, identifier included.
    pub fn all_fields(&self) -> &'static [FieldMeta] {
        self.fields
    }

    /// Field descriptors excluding the identifier, in declaration order.
    ///
    /// These are the fields that participate in snapshots and UPDATE set
    /// lists.
    pub fn data_fields(&self) -> impl Iterator<Item = &'static FieldMeta> {
        self.fields.iter().filter(|f| !f.identifier)
    }

    /// The identifier field descriptor, if one was declared.
    pub fn identifier_field(&self) -> Option<&'static FieldMeta> {
        self.fields.iter().find(|f| f.identifier)
    }
}
