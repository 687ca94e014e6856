//! Logical attribute structures.
//!
//! The structure of an entity or relationship is the ordered attribute tree a
//! reconstruction query must produce:
//!
//! ```text
//! regular entity   own attributes (a leading key attribute is named after
//!                  the synthesized key column)
//! weak entity      owner key, own attributes
//! subclass         parent structure, own attributes
//!                  (first renamed to <subclass>_id when all-by-itself)
//! relationship     endpoint 1 key (+ second attribute if weak)
//!                  endpoint 2 key (+ second attribute if weak)
//!                  own attributes
//! ```
//!
//! When both endpoint keys carry the same name they are renamed from the
//! declared roles, or from the endpoint entity names when there are none.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::NamingSettings;
use crate::graph::{AttributeNode, EntityNode, ErGraph, GraphError, GraphNode, RelationshipNode};
use crate::layout::Layout;
use crate::records::AttrType;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructureError {
    #[error("Unsupported structure for {node}: {reason}")]
    Unsupported { node: String, reason: String },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type StructureResult<T> = Result<T, StructureError>;

/// One attribute of a logical structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalAttribute {
    pub attr_name: String,
    pub attr_type: AttrType,
    #[serde(default)]
    pub is_multivalued: bool,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub is_discriminator: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_attributes: Vec<LogicalAttribute>,
}

impl LogicalAttribute {
    fn from_node(graph: &ErGraph, attr: &AttributeNode) -> StructureResult<Self> {
        let sub_attributes = attr
            .children
            .iter()
            .map(|child| Self::from_node(graph, graph.attribute(child)?))
            .collect::<StructureResult<Vec<_>>>()?;

        Ok(Self {
            attr_name: attr.name.to_lowercase(),
            attr_type: attr.attr_type.clone(),
            is_multivalued: attr.is_multivalued,
            is_primary_key: attr.is_primary_key,
            is_discriminator: attr.is_discriminator,
            sub_attributes,
        })
    }

    pub fn is_composite(&self) -> bool {
        self.attr_type.is_composite()
    }

    fn renamed(mut self, name: String) -> Self {
        self.attr_name = name;
        self
    }
}

/// Logical structure per entity/relationship, in graph order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Structures {
    structures: IndexMap<String, Vec<LogicalAttribute>>,
}

impl Structures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, unique_name: &str) -> Option<&[LogicalAttribute]> {
        self.structures.get(unique_name).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[LogicalAttribute])> {
        self.structures
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    pub(crate) fn insert(&mut self, unique_name: String, structure: Vec<LogicalAttribute>) {
        self.structures.insert(unique_name, structure);
    }

    fn require(&self, unique_name: &str) -> StructureResult<&[LogicalAttribute]> {
        self.get(unique_name)
            .ok_or_else(|| GraphError::NotFound(unique_name.to_string()).into())
    }
}

/// Derive the structure of every entity and relationship.
pub fn derive_structures(
    graph: &ErGraph,
    layout: &Layout,
    naming: &NamingSettings,
) -> StructureResult<Structures> {
    let mut structures = Structures::new();

    for node in graph.nodes() {
        let structure = match node {
            GraphNode::Entity(entity) => {
                entity_structure(graph, layout, naming, entity, &structures)?
            }
            GraphNode::Relationship(rel) => {
                relationship_structure(graph, naming, rel, &structures)?
            }
            GraphNode::Attribute(_) => continue,
        };
        structures.insert(node.unique_name().to_string(), structure);
    }

    tracing::info!(nodes = structures.len(), "derived logical structures");
    Ok(structures)
}

fn own_attributes(graph: &ErGraph, owner: &str) -> StructureResult<Vec<LogicalAttribute>> {
    graph
        .top_level_attributes(owner)?
        .into_iter()
        .map(|attr| LogicalAttribute::from_node(graph, attr))
        .collect()
}

/// The first `n` attributes of an already derived structure.
fn leading(
    structures: &Structures,
    owner: &str,
    n: usize,
) -> StructureResult<Vec<LogicalAttribute>> {
    let structure = structures.require(owner)?;
    if structure.len() < n {
        return Err(GraphError::invalid(
            owner,
            format!("expected at least {} attributes, found {}", n, structure.len()),
        )
        .into());
    }
    Ok(structure[..n].to_vec())
}

fn entity_structure(
    graph: &ErGraph,
    layout: &Layout,
    naming: &NamingSettings,
    entity: &EntityNode,
    structures: &Structures,
) -> StructureResult<Vec<LogicalAttribute>> {
    let mut own = own_attributes(graph, &entity.unique_name)?;

    let Some(parent) = entity.parent.as_deref() else {
        // The declared key is stored under the synthesized key column.
        if let Some(first) = own.first_mut() {
            if naming.is_key_attribute(&first.attr_name) {
                first.attr_name = naming.key_column(&entity.unique_name);
            }
        }
        return Ok(own);
    };

    if entity.is_weak() {
        let mut structure = leading(structures, parent, 1)?;
        structure.extend(own);
        return Ok(structure);
    }

    let mut structure = structures.require(parent)?.to_vec();
    structure.extend(own);

    let all_by_itself = layout
        .get(&entity.unique_name)
        .is_some_and(|d| d.all_by_itself());
    if all_by_itself {
        if let Some(first) = structure.first_mut() {
            first.attr_name = naming.key_column(&entity.unique_name);
        }
    }
    Ok(structure)
}

fn relationship_structure(
    graph: &ErGraph,
    naming: &NamingSettings,
    rel: &RelationshipNode,
    structures: &Structures,
) -> StructureResult<Vec<LogicalAttribute>> {
    let (e1, e2) = graph.relationship_endpoints(&rel.unique_name)?;

    let mut left = leading(structures, &e1.unique_name, if e1.is_weak() { 2 } else { 1 })?;
    let mut right = leading(structures, &e2.unique_name, if e2.is_weak() { 2 } else { 1 })?;

    if left[0].attr_name == right[0].attr_name {
        if e1.is_weak() || e2.is_weak() {
            return Err(StructureError::Unsupported {
                node: rel.unique_name.clone(),
                reason: "endpoint keys collide and an endpoint is a weak entity".into(),
            });
        }

        let (first, second) = match &rel.roles {
            Some((role1, role2)) => (naming.role_key_column(role1), naming.role_key_column(role2)),
            None => (
                naming.key_column(&e1.unique_name),
                naming.key_column(&e2.unique_name),
            ),
        };
        if first == second {
            return Err(StructureError::Unsupported {
                node: rel.unique_name.clone(),
                reason: format!("both endpoint keys would be named {}", first),
            });
        }

        left[0] = left[0].clone().renamed(first);
        right[0] = right[0].clone().renamed(second);
    }

    let mut structure = left;
    structure.extend(right);
    structure.extend(own_attributes(graph, &rel.unique_name)?);
    Ok(structure)
}
