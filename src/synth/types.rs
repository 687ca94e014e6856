//! Physical schema types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::sql::SqlType;

/// How a column relates to the logical schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnForm {
    /// Surrogate key of `entity` (own key, or a foreign key in a
    /// relationship/subclass table)
    Key { entity: String },
    /// Scalar attribute, or a leaf of a flattened composite
    Value,
    /// Whole composite attribute stored as one structured column
    Composite,
    /// Multivalued attribute stored inline as an array
    Array,
    /// Multivalued attribute stored as a scalar in its own table, one row per value
    Normalized,
}

impl ColumnForm {
    pub fn is_key(&self) -> bool {
        matches!(self, ColumnForm::Key { .. })
    }
}

/// One column of a physical table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalColumn {
    pub name: String,
    pub sql_type: SqlType,
    /// Attribute unique name; for keys, the key column name itself
    pub source: String,
    pub form: ColumnForm,
    /// Top-level composite this column was split out of
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flattened_from: Option<String>,
}

impl PhysicalColumn {
    pub fn key(name: impl Into<String>, entity: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            source: name.clone(),
            name,
            sql_type: SqlType::Integer,
            form: ColumnForm::Key {
                entity: entity.into(),
            },
            flattened_from: None,
        }
    }
}

/// A synthesized table. Column order is significant: the first column is
/// the join key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalTable {
    pub name: String,
    /// Position of the grouping this table was built from
    pub grouping: usize,
    pub columns: Vec<PhysicalColumn>,
}

impl PhysicalTable {
    pub fn column(&self, name: &str) -> Option<&PhysicalColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn first_column(&self) -> Option<&PhysicalColumn> {
        self.columns.first()
    }

    pub fn has_source(&self, source: &str) -> bool {
        self.columns.iter().any(|c| c.source == source)
    }
}

/// One field of a composite type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeField {
    pub name: String,
    pub sql_type: SqlType,
}

/// A named structured type synthesized for a composite attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeType {
    pub name: String,
    pub fields: Vec<CompositeField>,
}

/// Synthesizer output: tables in grouping order, composite types in
/// creation order (nested types before the types that use them).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalSchema {
    pub tables: Vec<PhysicalTable>,
    #[serde(default)]
    pub types: IndexMap<String, CompositeType>,
}

impl PhysicalSchema {
    pub fn table(&self, name: &str) -> Option<&PhysicalTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn composite_type(&self, name: &str) -> Option<&CompositeType> {
        self.types.get(name)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
