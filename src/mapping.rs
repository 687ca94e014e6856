//! Mapping resolution - which tables hold each entity and relationship.
//!
//! - An entity owns a table when the table's grouping names the entity and at
//!   least one column is sourced from one of the entity's attributes.
//! - A subclass that is not all-by-itself also owns every table of its parent.
//! - A relationship owns the single table whose grouping names it.
//!
//! Owning tables are always listed in table (grouping) order, so the first
//! one is a stable anchor for reconstruction.

use indexmap::IndexMap;

use crate::graph::{EntityNode, ErGraph, GraphError, GraphNode};
use crate::layout::Layout;
use crate::records::Grouping;
use crate::synth::PhysicalSchema;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    #[error("Relationship {0} appears in no grouping")]
    MissingGrouping(String),

    #[error("Relationship {relationship} appears in several groupings: {tables:?}")]
    MultipleGroupings {
        relationship: String,
        tables: Vec<String>,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type MappingResult<T> = Result<T, MappingError>;

/// Resolver output: owning table names per entity/relationship, in graph order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOwnership {
    tables: IndexMap<String, Vec<String>>,
}

impl TableOwnership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Owning tables of a node; empty when it owns none.
    pub fn tables_of(&self, unique_name: &str) -> &[String] {
        self.tables
            .get(unique_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub(crate) fn insert(&mut self, unique_name: String, tables: Vec<String>) {
        self.tables.insert(unique_name, tables);
    }
}

/// Resolve table ownership for every entity and relationship.
///
/// Entities are visited in declaration order, so a parent's tables are
/// known before its subclasses are resolved.
pub fn resolve(
    graph: &ErGraph,
    layout: &Layout,
    groupings: &[Grouping],
    schema: &PhysicalSchema,
) -> MappingResult<TableOwnership> {
    let mut ownership = TableOwnership::new();

    for node in graph.nodes() {
        let tables = match node {
            GraphNode::Entity(entity) => {
                entity_tables(entity, layout, groupings, schema, &ownership)
            }
            GraphNode::Relationship(rel) => {
                relationship_table(&rel.unique_name, groupings, schema)?
            }
            GraphNode::Attribute(_) => continue,
        };

        tracing::debug!(node = %node.unique_name(), tables = ?tables, "resolved owning tables");
        ownership.insert(node.unique_name().to_string(), tables);
    }

    tracing::info!(nodes = ownership.len(), "mapping resolution done");
    Ok(ownership)
}

fn entity_tables(
    entity: &EntityNode,
    layout: &Layout,
    groupings: &[Grouping],
    schema: &PhysicalSchema,
    resolved: &TableOwnership,
) -> Vec<String> {
    let inherits = entity.is_subclass()
        && layout
            .get(&entity.unique_name)
            .is_some_and(|d| !d.all_by_itself());
    let parent_tables: &[String] = match (&entity.parent, inherits) {
        (Some(parent), true) => resolved.tables_of(parent),
        _ => &[],
    };

    schema
        .tables
        .iter()
        .filter(|table| {
            let in_grouping = groupings
                .get(table.grouping)
                .is_some_and(|g| g.contains(&entity.unique_name));
            let owns = in_grouping && entity.attributes.iter().any(|a| table.has_source(a));
            owns || parent_tables.contains(&table.name)
        })
        .map(|table| table.name.clone())
        .collect()
}

fn relationship_table(
    relationship: &str,
    groupings: &[Grouping],
    schema: &PhysicalSchema,
) -> MappingResult<Vec<String>> {
    let tables: Vec<String> = schema
        .tables
        .iter()
        .filter(|t| {
            groupings
                .get(t.grouping)
                .is_some_and(|g| g.contains(relationship))
        })
        .map(|t| t.name.clone())
        .collect();

    match tables.len() {
        0 => Err(MappingError::MissingGrouping(relationship.to_string())),
        1 => Ok(tables),
        _ => Err(MappingError::MultipleGroupings {
            relationship: relationship.to_string(),
            tables,
        }),
    }
}
