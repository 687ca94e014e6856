//! Persisted form of a compiled graph.
//!
//! The compile and reconstruction passes can run separately: the first writes
//! the graph with every annotation attached to its node, the second reads it
//! back without rerunning classification or synthesis.
//!
//! ```json
//! {
//!   "nodes": [
//!     { "node_type": "ENTITY", "unique_name": "person", "entity_type": "REGULAR",
//!       "attributes": ["person.person_id", "person.name"],
//!       "tables": ["rel0"], "structure": [ ... ] },
//!     { "node_type": "ATTRIBUTE", "unique_name": "person.name", "entity": "person", ... }
//!   ],
//!   "edges": [ { "kind": "ENTITY_ATTRIBUTE", "source": "person", "target": "person.name" } ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::compile::CompiledGraph;
use crate::graph::{
    AttributeNode, EdgeKind, EntityNode, ErGraph, GraphError, GraphNode, RelationshipNode,
};
use crate::layout::{Layout, LayoutDecision};
use crate::mapping::TableOwnership;
use crate::records::{AttrType, EntityKind};
use crate::structure::{LogicalAttribute, Structures};

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Malformed graph JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{node} refers to unknown node {reference}")]
    DanglingReference { node: String, reference: String },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type PersistResult<T> = Result<T, PersistError>;

#[derive(Debug, Serialize, Deserialize)]
struct PersistedGraph {
    nodes: Vec<PersistedNode>,
    edges: Vec<PersistedEdge>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "node_type", rename_all = "SCREAMING_SNAKE_CASE")]
enum PersistedNode {
    Entity(PersistedEntity),
    Relationship(PersistedRelationship),
    Attribute(PersistedAttribute),
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedEntity {
    name: String,
    unique_name: String,
    entity_type: EntityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_entity: Option<String>,
    attributes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    layout: Option<LayoutDecision>,
    tables: Vec<String>,
    structure: Vec<LogicalAttribute>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedRelationship {
    name: String,
    unique_name: String,
    entity1: String,
    entity2: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    roles: Option<(String, String)>,
    attributes: Vec<String>,
    tables: Vec<String>,
    structure: Vec<LogicalAttribute>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedAttribute {
    name: String,
    unique_name: String,
    attr_type: AttrType,
    is_multivalued: bool,
    is_primary_key: bool,
    is_discriminator: bool,
    /// Owning entity or relationship
    entity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    sub_attributes: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedEdge {
    kind: EdgeKind,
    source: String,
    target: String,
}

/// Serialize a compiled graph to pretty-printed JSON.
pub fn to_json(compiled: &CompiledGraph) -> PersistResult<String> {
    let nodes = compiled
        .graph
        .nodes()
        .map(|node| match node {
            GraphNode::Entity(e) => PersistedNode::Entity(PersistedEntity {
                name: e.name.clone(),
                unique_name: e.unique_name.clone(),
                entity_type: e.kind,
                parent_entity: e.parent.clone(),
                attributes: e.attributes.clone(),
                layout: compiled.layout.get(&e.unique_name).copied(),
                tables: compiled.ownership.tables_of(&e.unique_name).to_vec(),
                structure: structure_of(compiled, &e.unique_name),
            }),
            GraphNode::Relationship(r) => PersistedNode::Relationship(PersistedRelationship {
                name: r.name.clone(),
                unique_name: r.unique_name.clone(),
                entity1: r.entity1.clone(),
                entity2: r.entity2.clone(),
                roles: r.roles.clone(),
                attributes: r.attributes.clone(),
                tables: compiled.ownership.tables_of(&r.unique_name).to_vec(),
                structure: structure_of(compiled, &r.unique_name),
            }),
            GraphNode::Attribute(a) => PersistedNode::Attribute(PersistedAttribute {
                name: a.name.clone(),
                unique_name: a.unique_name.clone(),
                attr_type: a.attr_type.clone(),
                is_multivalued: a.is_multivalued,
                is_primary_key: a.is_primary_key,
                is_discriminator: a.is_discriminator,
                entity: a.owner.clone(),
                parent_attribute: a.parent.clone(),
                sub_attributes: a.children.clone(),
            }),
        })
        .collect();

    let edges = compiled
        .graph
        .edges()
        .into_iter()
        .map(|e| PersistedEdge {
            kind: e.kind,
            source: e.source.to_string(),
            target: e.target.to_string(),
        })
        .collect();

    Ok(serde_json::to_string_pretty(&PersistedGraph { nodes, edges })?)
}

fn structure_of(compiled: &CompiledGraph, unique_name: &str) -> Vec<LogicalAttribute> {
    compiled
        .structures
        .get(unique_name)
        .map(<[LogicalAttribute]>::to_vec)
        .unwrap_or_default()
}

/// Rebuild a compiled graph, annotations included, from its JSON form.
pub fn from_json(json: &str) -> PersistResult<CompiledGraph> {
    let persisted: PersistedGraph = serde_json::from_str(json)?;

    let mut graph = ErGraph::new();
    let mut layout = Layout::new();
    let mut ownership = TableOwnership::new();
    let mut structures = Structures::new();

    for node in persisted.nodes {
        let node = match node {
            PersistedNode::Entity(e) => {
                if let Some(decision) = e.layout {
                    layout.insert(e.unique_name.clone(), decision);
                }
                ownership.insert(e.unique_name.clone(), e.tables);
                structures.insert(e.unique_name.clone(), e.structure);
                GraphNode::Entity(EntityNode {
                    name: e.name,
                    unique_name: e.unique_name,
                    kind: e.entity_type,
                    parent: e.parent_entity,
                    attributes: e.attributes,
                })
            }
            PersistedNode::Relationship(r) => {
                ownership.insert(r.unique_name.clone(), r.tables);
                structures.insert(r.unique_name.clone(), r.structure);
                GraphNode::Relationship(RelationshipNode {
                    name: r.name,
                    unique_name: r.unique_name,
                    entity1: r.entity1,
                    entity2: r.entity2,
                    roles: r.roles,
                    attributes: r.attributes,
                })
            }
            PersistedNode::Attribute(a) => GraphNode::Attribute(AttributeNode {
                name: a.name,
                unique_name: a.unique_name,
                attr_type: a.attr_type,
                is_multivalued: a.is_multivalued,
                is_primary_key: a.is_primary_key,
                is_discriminator: a.is_discriminator,
                owner: a.entity,
                parent: a.parent_attribute,
                children: a.sub_attributes,
            }),
        };
        graph.insert_node(node)?;
    }

    check_references(&graph)?;

    for edge in &persisted.edges {
        for end in [&edge.source, &edge.target] {
            if !graph.contains(end) {
                return Err(PersistError::DanglingReference {
                    node: edge.source.clone(),
                    reference: end.clone(),
                });
            }
        }
        graph.link(edge.kind, &edge.source, &edge.target)?;
    }

    tracing::info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "loaded compiled graph"
    );
    Ok(CompiledGraph {
        graph,
        layout,
        ownership,
        structures,
    })
}

/// Every name-based back-reference must resolve within the graph.
fn check_references(graph: &ErGraph) -> PersistResult<()> {
    for node in graph.nodes() {
        let references: Vec<&String> = match node {
            GraphNode::Entity(e) => e.parent.iter().chain(&e.attributes).collect(),
            GraphNode::Relationship(r) => [&r.entity1, &r.entity2]
                .into_iter()
                .chain(&r.attributes)
                .collect(),
            GraphNode::Attribute(a) => std::iter::once(&a.owner)
                .chain(a.parent.iter())
                .chain(&a.children)
                .collect(),
        };

        if let Some(missing) = references.into_iter().find(|r| !graph.contains(r)) {
            return Err(PersistError::DanglingReference {
                node: node.unique_name().to_string(),
                reference: missing.clone(),
            });
        }
    }
    Ok(())
}
