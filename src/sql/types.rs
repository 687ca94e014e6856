//! Column types emitted for synthesized tables.
//!
//! The attribute type vocabulary is tiny, so the physical vocabulary is too:
//!
//! | Attribute type | Column type       |
//! |----------------|-------------------|
//! | INT / INTEGER  | `INTEGER`         |
//! | VARCHAR        | `VARCHAR(255)`    |
//! | COMPOSITE      | named composite   |
//! | anything else  | `TEXT`            |
//!
//! Multivalued attributes kept inline wrap the element type in `Array`.

use serde::{Deserialize, Serialize};

use crate::records::AttrType;

/// Width used for every VARCHAR column.
pub const VARCHAR_WIDTH: u16 = 255;

/// SQL-level column type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlType {
    Integer,
    Varchar(u16),
    Text,
    /// Reference to a synthesized composite type by name
    Composite(String),
    Array(Box<SqlType>),
}

impl SqlType {
    /// Scalar column type for a non-composite attribute type.
    ///
    /// A `COMPOSITE` reaching here has no synthesized type and is stored as
    /// opaque text.
    pub fn scalar(attr_type: &AttrType) -> Self {
        match attr_type {
            AttrType::Integer => SqlType::Integer,
            AttrType::Varchar => SqlType::Varchar(VARCHAR_WIDTH),
            AttrType::Composite | AttrType::Other(_) => SqlType::Text,
        }
    }

    pub fn array_of(inner: SqlType) -> Self {
        SqlType::Array(Box::new(inner))
    }
}
