//! Lookup and traversal over the ER graph.
//!
//! Every lookup is by unique name and fails with [`GraphError::NotFound`]
//! rather than returning a default.

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use super::{
    AttributeNode, EdgeKind, EntityNode, ErGraph, GraphError, GraphNode, GraphResult,
    RelationshipNode,
};

impl ErGraph {
    pub(crate) fn index_of(&self, unique_name: &str) -> GraphResult<NodeIndex> {
        let key = unique_name.to_lowercase();
        self.node_index
            .get(&key)
            .copied()
            .ok_or(GraphError::NotFound(key))
    }

    /// Look up any node by unique name (case-insensitive).
    pub fn get_node_by_name(&self, unique_name: &str) -> GraphResult<&GraphNode> {
        let idx = self.index_of(unique_name)?;
        Ok(&self.graph[idx])
    }

    pub fn entity(&self, unique_name: &str) -> GraphResult<&EntityNode> {
        match self.get_node_by_name(unique_name)? {
            GraphNode::Entity(e) => Ok(e),
            other => Err(GraphError::invalid(
                other.unique_name(),
                format!("expected an entity, found {:?}", other.node_type()),
            )),
        }
    }

    pub fn relationship(&self, unique_name: &str) -> GraphResult<&RelationshipNode> {
        match self.get_node_by_name(unique_name)? {
            GraphNode::Relationship(r) => Ok(r),
            other => Err(GraphError::invalid(
                other.unique_name(),
                format!("expected a relationship, found {:?}", other.node_type()),
            )),
        }
    }

    pub fn attribute(&self, unique_name: &str) -> GraphResult<&AttributeNode> {
        match self.get_node_by_name(unique_name)? {
            GraphNode::Attribute(a) => Ok(a),
            other => Err(GraphError::invalid(
                other.unique_name(),
                format!("expected an attribute, found {:?}", other.node_type()),
            )),
        }
    }

    /// Nodes adjacent to `unique_name` in either direction, in edge insertion
    /// order. A node linked twice (self-relationship) appears twice.
    pub fn get_neighbors(&self, unique_name: &str) -> GraphResult<Vec<&GraphNode>> {
        let idx = self.index_of(unique_name)?;

        let mut adjacent: Vec<(usize, NodeIndex)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.id().index(), e.target()))
            .chain(
                self.graph
                    .edges_directed(idx, Direction::Incoming)
                    .map(|e| (e.id().index(), e.source())),
            )
            .collect();
        adjacent.sort_by_key(|(edge, _)| *edge);

        Ok(adjacent.into_iter().map(|(_, n)| &self.graph[n]).collect())
    }

    /// All attributes of an entity, nested ones included.
    ///
    /// Fails with `InvalidState` for a non-entity or an entity without
    /// attributes.
    pub fn get_attributes(&self, unique_name: &str) -> GraphResult<Vec<&AttributeNode>> {
        let entity = self.entity(unique_name)?;
        if entity.attributes.is_empty() {
            return Err(GraphError::invalid(
                &entity.unique_name,
                "entity has no attributes",
            ));
        }
        entity
            .attributes
            .iter()
            .map(|a| self.attribute(a))
            .collect()
    }

    /// Top-level attributes of an entity or relationship, in declaration order.
    pub fn top_level_attributes(&self, unique_name: &str) -> GraphResult<Vec<&AttributeNode>> {
        let owned = match self.get_node_by_name(unique_name)? {
            GraphNode::Entity(e) => &e.attributes,
            GraphNode::Relationship(r) => &r.attributes,
            GraphNode::Attribute(a) => {
                return Err(GraphError::invalid(
                    &a.unique_name,
                    "attributes do not own top-level attributes",
                ))
            }
        };
        let mut top = Vec::new();
        for name in owned {
            let attr = self.attribute(name)?;
            if attr.parent.is_none() {
                top.push(attr);
            }
        }
        Ok(top)
    }

    /// Resolve a relationship's two endpoint entities through its
    /// ENTITY_RELATIONSHIP edges, checked against the node's own fields.
    pub fn relationship_endpoints(
        &self,
        unique_name: &str,
    ) -> GraphResult<(&EntityNode, &EntityNode)> {
        let rel = self.relationship(unique_name)?;
        let idx = self.index_of(unique_name)?;

        let mut linked: Vec<(usize, NodeIndex)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .filter(|e| *e.weight() == EdgeKind::EntityRelationship)
            .map(|e| (e.id().index(), e.target()))
            .collect();
        linked.sort_by_key(|(edge, _)| *edge);

        let endpoints: Vec<&EntityNode> = linked
            .into_iter()
            .filter_map(|(_, n)| match &self.graph[n] {
                GraphNode::Entity(e) => Some(e),
                _ => None,
            })
            .collect();

        match endpoints.as_slice() {
            [e1, e2] if e1.unique_name == rel.entity1 && e2.unique_name == rel.entity2 => {
                Ok((*e1, *e2))
            }
            _ => Err(GraphError::invalid(
                &rel.unique_name,
                "relationship endpoints cannot be resolved",
            )),
        }
    }
}
