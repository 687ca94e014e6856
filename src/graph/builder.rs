//! Graph construction from front-end records.
//!
//! `add_entity` and `add_relationship` build the node for the record, then
//! walk its attribute records recursively so that every composite owns its
//! sub-attributes (`owner.attr.sub` unique names) before the next top-level
//! attribute is added.

use crate::records::{AttributeRecord, EntityKind, EntityRecord, RelationshipRecord, SchemaRecords};

use super::{AttributeNode, EdgeKind, EntityNode, ErGraph, GraphNode, RelationshipNode};

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while building or querying the graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("Node not found: {0}")]
    NotFound(String),

    #[error("Invalid state for {node}: {reason}")]
    InvalidState { node: String, reason: String },

    #[error("Duplicate node name: {0}")]
    DuplicateNode(String),
}

impl GraphError {
    pub(crate) fn invalid(node: impl Into<String>, reason: impl Into<String>) -> Self {
        GraphError::InvalidState {
            node: node.into(),
            reason: reason.into(),
        }
    }
}

pub type GraphResult<T> = Result<T, GraphError>;

// ============================================================================
// Construction Entry Point
// ============================================================================

impl ErGraph {
    /// Build a graph from a complete schema: entities first, in order, then
    /// relationships.
    pub fn from_records(records: &SchemaRecords) -> GraphResult<Self> {
        let mut graph = ErGraph::new();
        for entity in &records.entities {
            graph.add_entity(entity)?;
        }
        for relationship in &records.relationships {
            graph.add_relationship(relationship)?;
        }
        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "populated ER graph"
        );
        Ok(graph)
    }

    /// Add an entity and all of its attributes.
    ///
    /// Weak entities and subclasses must name a parent that is already in
    /// the graph.
    pub fn add_entity(&mut self, record: &EntityRecord) -> GraphResult<()> {
        let unique_name = record.table_name.to_lowercase();

        let parent = match record.entity_type {
            EntityKind::Regular => None,
            EntityKind::Weak | EntityKind::Subclass => {
                let parent_name = record.parent_entity.as_deref().ok_or_else(|| {
                    GraphError::invalid(&unique_name, "weak entity or subclass without a parent")
                })?;
                Some(self.entity(parent_name)?.unique_name.clone())
            }
        };

        self.insert_node(GraphNode::Entity(EntityNode {
            name: record.table_name.clone(),
            unique_name: unique_name.clone(),
            kind: record.entity_type,
            parent: parent.clone(),
            attributes: Vec::new(),
        }))?;

        for attr in &record.attributes {
            self.add_attribute(attr, &unique_name, &unique_name, None)?;
        }

        if let Some(parent) = parent {
            self.link(EdgeKind::EntityEntity, &unique_name, &parent)?;
        }

        Ok(())
    }

    /// Add a relationship between two existing entities, plus its own attributes.
    pub fn add_relationship(&mut self, record: &RelationshipRecord) -> GraphResult<()> {
        let unique_name = record.table_name.to_lowercase();
        let entity1 = self.entity(&record.entity1.name)?.unique_name.clone();
        let entity2 = self.entity(&record.entity2.name)?.unique_name.clone();

        let roles = match (&record.entity1.role, &record.entity2.role) {
            (Some(r1), Some(r2)) => Some((r1.clone(), r2.clone())),
            (None, None) => None,
            _ => {
                return Err(GraphError::invalid(
                    &unique_name,
                    "a role label is declared for only one endpoint",
                ))
            }
        };

        self.insert_node(GraphNode::Relationship(RelationshipNode {
            name: record.table_name.clone(),
            unique_name: unique_name.clone(),
            entity1: entity1.clone(),
            entity2: entity2.clone(),
            roles,
            attributes: Vec::new(),
        }))?;

        for attr in &record.attributes {
            self.add_attribute(attr, &unique_name, &unique_name, None)?;
        }

        self.link(EdgeKind::EntityRelationship, &unique_name, &entity1)?;
        self.link(EdgeKind::EntityRelationship, &unique_name, &entity2)?;

        Ok(())
    }

    /// Add one attribute under `path`, recursing into composite parts.
    fn add_attribute(
        &mut self,
        record: &AttributeRecord,
        path: &str,
        owner: &str,
        parent: Option<&str>,
    ) -> GraphResult<()> {
        let unique_name = format!("{}.{}", path, record.attr_name).to_lowercase();

        self.insert_node(GraphNode::Attribute(AttributeNode {
            name: record.attr_name.clone(),
            unique_name: unique_name.clone(),
            attr_type: record.attr_type.clone(),
            is_multivalued: record.is_multivalued,
            is_primary_key: record.is_primary_key,
            is_discriminator: record.is_discriminator,
            owner: owner.to_string(),
            parent: parent.map(str::to_string),
            children: Vec::new(),
        }))?;

        match self.node_mut(owner)? {
            GraphNode::Entity(e) => e.attributes.push(unique_name.clone()),
            GraphNode::Relationship(r) => r.attributes.push(unique_name.clone()),
            GraphNode::Attribute(_) => {
                return Err(GraphError::invalid(owner, "attribute owner is an attribute"))
            }
        }

        match parent {
            Some(parent) => {
                if let GraphNode::Attribute(p) = self.node_mut(parent)? {
                    p.children.push(unique_name.clone());
                }
                self.link(EdgeKind::AttributeAttribute, parent, &unique_name)?;
            }
            None => self.link(EdgeKind::EntityAttribute, owner, &unique_name)?,
        }

        if record.attr_type.is_composite() {
            for sub in &record.sub_attributes {
                self.add_attribute(sub, &unique_name, owner, Some(&unique_name))?;
            }
        }

        Ok(())
    }

    // ========================================================================
    // Raw insertion (shared with the persisted-graph loader)
    // ========================================================================

    /// Insert a node, enforcing unique-name uniqueness.
    pub(crate) fn insert_node(&mut self, node: GraphNode) -> GraphResult<()> {
        let key = node.unique_name().to_string();
        if self.node_index.contains_key(&key) {
            return Err(GraphError::DuplicateNode(key));
        }
        let idx = self.graph.add_node(node);
        self.node_index.insert(key, idx);
        Ok(())
    }

    /// Add an edge between two existing nodes.
    pub(crate) fn link(&mut self, kind: EdgeKind, source: &str, target: &str) -> GraphResult<()> {
        let s = self.index_of(source)?;
        let t = self.index_of(target)?;
        self.graph.add_edge(s, t, kind);
        Ok(())
    }

    fn node_mut(&mut self, unique_name: &str) -> GraphResult<&mut GraphNode> {
        let idx = self.index_of(unique_name)?;
        Ok(&mut self.graph[idx])
    }
}
