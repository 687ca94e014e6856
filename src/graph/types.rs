//! Node and edge types for the ER graph.

use serde::{Deserialize, Serialize};

use crate::records::{AttrType, EntityKind};

// ============================================================================
// Node Types
// ============================================================================

/// Discriminant of a [`GraphNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Entity,
    Relationship,
    Attribute,
}

/// Entity node.
///
/// `parent` and `attributes` hold unique names of other nodes in the same
/// graph; they are handles, not ownership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityNode {
    /// Declared name
    pub name: String,
    /// Case-normalized lookup key
    pub unique_name: String,
    pub kind: EntityKind,
    /// Owner (weak entity) or superclass (subclass)
    pub parent: Option<String>,
    /// Every attribute owned by this entity, nested ones included, in
    /// declaration (pre-)order
    pub attributes: Vec<String>,
}

impl EntityNode {
    pub fn is_subclass(&self) -> bool {
        self.kind == EntityKind::Subclass
    }

    pub fn is_weak(&self) -> bool {
        self.kind == EntityKind::Weak
    }
}

/// Relationship node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipNode {
    pub name: String,
    pub unique_name: String,
    /// First endpoint entity (unique name)
    pub entity1: String,
    /// Second endpoint entity (unique name)
    pub entity2: String,
    /// Role labels, present when the DSL declared roles for both endpoints
    pub roles: Option<(String, String)>,
    /// Attributes attached to the relationship itself
    pub attributes: Vec<String>,
}

impl RelationshipNode {
    /// True when both endpoints are the same entity.
    pub fn is_recursive(&self) -> bool {
        self.entity1 == self.entity2
    }
}

/// Attribute node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeNode {
    pub name: String,
    /// Dotted path: `owner.attr[.sub...]`
    pub unique_name: String,
    pub attr_type: AttrType,
    pub is_multivalued: bool,
    pub is_primary_key: bool,
    pub is_discriminator: bool,
    /// Owning entity or relationship
    pub owner: String,
    /// Enclosing composite attribute, for sub-attributes
    pub parent: Option<String>,
    /// Sub-attributes, for composites
    pub children: Vec<String>,
}

impl AttributeNode {
    pub fn is_composite(&self) -> bool {
        self.attr_type.is_composite()
    }

    /// Path below the owner: `person.name.first` → `name.first`.
    pub fn local_path(&self) -> &str {
        self.unique_name
            .split_once('.')
            .map(|(_, rest)| rest)
            .unwrap_or(&self.unique_name)
    }

    /// Top-level attribute this one hangs under (itself when top-level).
    pub fn root_name(&self) -> &str {
        self.local_path()
            .split('.')
            .next()
            .unwrap_or(&self.unique_name)
    }
}

/// A node of the ER graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphNode {
    Entity(EntityNode),
    Relationship(RelationshipNode),
    Attribute(AttributeNode),
}

impl GraphNode {
    pub fn name(&self) -> &str {
        match self {
            GraphNode::Entity(n) => &n.name,
            GraphNode::Relationship(n) => &n.name,
            GraphNode::Attribute(n) => &n.name,
        }
    }

    pub fn unique_name(&self) -> &str {
        match self {
            GraphNode::Entity(n) => &n.unique_name,
            GraphNode::Relationship(n) => &n.unique_name,
            GraphNode::Attribute(n) => &n.unique_name,
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            GraphNode::Entity(_) => NodeType::Entity,
            GraphNode::Relationship(_) => NodeType::Relationship,
            GraphNode::Attribute(_) => NodeType::Attribute,
        }
    }

    pub fn is_entity(&self) -> bool {
        matches!(self, GraphNode::Entity(_))
    }

    pub fn is_relationship(&self) -> bool {
        matches!(self, GraphNode::Relationship(_))
    }

    pub fn is_attribute(&self) -> bool {
        matches!(self, GraphNode::Attribute(_))
    }
}

// ============================================================================
// Edge Types
// ============================================================================

/// Kind of a directed edge.
///
/// - ENTITY_ATTRIBUTE: entity/relationship → top-level attribute
/// - ATTRIBUTE_ATTRIBUTE: composite → sub-attribute
/// - ENTITY_RELATIONSHIP: relationship → endpoint entity
/// - ENTITY_ENTITY: subclass/weak entity → parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    EntityAttribute,
    AttributeAttribute,
    EntityRelationship,
    EntityEntity,
}

/// Edge as seen from outside the graph: kind plus endpoint names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRecord<'a> {
    pub kind: EdgeKind,
    pub source: &'a str,
    pub target: &'a str,
}
