//! Input records handed over by the DSL front end.
//!
//! The front end turns `CREATE ENTITY` / `CREATE RELATIONSHIP` statements into
//! these plain records; the compiler never sees source text. Records are
//! deserialized from JSON:
//!
//! ```json
//! {
//!   "entities": [
//!     { "table_name": "Person", "entity_type": "REGULAR",
//!       "attributes": [
//!         { "attr_name": "person_id", "attr_type": "INT", "is_primary_key": true },
//!         { "attr_name": "phone_numbers", "attr_type": "VARCHAR", "is_multivalued": true }
//!       ] }
//!   ],
//!   "relationships": []
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of entity declared by the DSL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Regular,
    Weak,
    Subclass,
}

/// Declared attribute type.
///
/// The DSL knows a handful of scalar types; anything it does not recognise
/// is kept verbatim and stored as opaque text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AttrType {
    Integer,
    Varchar,
    Composite,
    Other(String),
}

impl AttrType {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "INT" | "INTEGER" => AttrType::Integer,
            "VARCHAR" => AttrType::Varchar,
            "COMPOSITE" => AttrType::Composite,
            _ => AttrType::Other(raw.to_string()),
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, AttrType::Composite)
    }
}

impl From<String> for AttrType {
    fn from(raw: String) -> Self {
        AttrType::parse(&raw)
    }
}

impl From<AttrType> for String {
    fn from(ty: AttrType) -> Self {
        ty.to_string()
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrType::Integer => write!(f, "INT"),
            AttrType::Varchar => write!(f, "VARCHAR"),
            AttrType::Composite => write!(f, "COMPOSITE"),
            AttrType::Other(raw) => write!(f, "{}", raw),
        }
    }
}

/// One attribute declaration, possibly composite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub attr_name: String,
    pub attr_type: AttrType,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub is_discriminator: bool,
    #[serde(default)]
    pub is_multivalued: bool,
    /// Non-empty only for `COMPOSITE` attributes.
    #[serde(default)]
    pub sub_attributes: Vec<AttributeRecord>,
}

impl AttributeRecord {
    pub fn new(name: impl Into<String>, attr_type: AttrType) -> Self {
        Self {
            attr_name: name.into(),
            attr_type,
            is_primary_key: false,
            is_discriminator: false,
            is_multivalued: false,
            sub_attributes: Vec::new(),
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn multivalued(mut self) -> Self {
        self.is_multivalued = true;
        self
    }

    pub fn composite(name: impl Into<String>, parts: Vec<AttributeRecord>) -> Self {
        Self {
            sub_attributes: parts,
            ..Self::new(name, AttrType::Composite)
        }
    }
}

/// `CREATE [WEAK] ENTITY ... [DEPENDS ON | SUBCLASS OF parent]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub table_name: String,
    pub entity_type: EntityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_entity: Option<String>,
    pub attributes: Vec<AttributeRecord>,
}

/// One side of a relationship, with its optional role label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl EndpointRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// `CREATE RELATIONSHIP name (...) BETWEEN e1 (...) AND e2 (...)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub table_name: String,
    pub entity1: EndpointRecord,
    pub entity2: EndpointRecord,
    #[serde(default)]
    pub attributes: Vec<AttributeRecord>,
}

/// A whole schema as emitted by the front end.
///
/// Entities are applied in order before relationships, so owners and parents
/// must be listed before the entities that reference them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRecords {
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
    #[serde(default)]
    pub relationships: Vec<RelationshipRecord>,
}

impl SchemaRecords {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// A connected subgraph: node names that will be materialized together into
/// one physical table.
///
/// Names are case-normalized on construction. A grouping may repeat one
/// entity name, which marks a relationship between two instances of that
/// entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Grouping {
    names: Vec<String>,
}

impl Grouping {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn contains(&self, unique_name: &str) -> bool {
        self.names.iter().any(|n| n == unique_name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names that appear more than once, in first-occurrence order.
    pub fn repeated(&self) -> Vec<&str> {
        let mut repeated: Vec<&str> = Vec::new();
        for (i, name) in self.names.iter().enumerate() {
            if self.names[..i].contains(name) && !repeated.contains(&name.as_str()) {
                repeated.push(name);
            }
        }
        repeated
    }

    /// Load an ordered list of groupings from a JSON array of arrays.
    pub fn list_from_json(json: &str) -> serde_json::Result<Vec<Grouping>> {
        serde_json::from_str(json)
    }
}

impl From<Vec<String>> for Grouping {
    fn from(names: Vec<String>) -> Self {
        Grouping::new(names)
    }
}

impl From<Grouping> for Vec<String> {
    fn from(grouping: Grouping) -> Self {
        grouping.names
    }
}
