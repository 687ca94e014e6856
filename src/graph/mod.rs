//! ER graph - entities, relationships and attributes as typed nodes.
//!
//! Nodes live in a `petgraph` arena and are addressed by their case-normalized
//! `unique_name`. Back-references (attribute → owner, sub-attribute → composite,
//! subclass → parent) are stored as names and resolved through the index, so
//! the graph never holds reference cycles.
//!
//! Edges:
//! - ENTITY_ATTRIBUTE: owner → top-level attribute
//! - ATTRIBUTE_ATTRIBUTE: composite → sub-attribute
//! - ENTITY_RELATIONSHIP: relationship → endpoint entity
//! - ENTITY_ENTITY: subclass/weak entity → parent

mod builder;
pub mod query;
pub mod types;

pub use builder::{GraphError, GraphResult};
pub use types::*;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// The logical ER schema.
#[derive(Debug, Clone)]
pub struct ErGraph {
    /// The underlying directed graph
    graph: DiGraph<GraphNode, EdgeKind>,

    /// Index: unique name → NodeIndex
    node_index: HashMap<String, NodeIndex>,
}

impl ErGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_index: HashMap::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> Vec<EdgeRecord<'_>> {
        self.graph
            .edge_references()
            .map(|e| EdgeRecord {
                kind: *e.weight(),
                source: self.graph[e.source()].unique_name(),
                target: self.graph[e.target()].unique_name(),
            })
            .collect()
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityNode> {
        self.nodes().filter_map(|n| match n {
            GraphNode::Entity(e) => Some(e),
            _ => None,
        })
    }

    pub fn contains(&self, unique_name: &str) -> bool {
        self.node_index.contains_key(&unique_name.to_lowercase())
    }
}

impl Default for ErGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Two graphs are equal when they hold the same nodes and edges in the same order.
impl PartialEq for ErGraph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes().eq(other.nodes()) && self.edges() == other.edges()
    }
}
