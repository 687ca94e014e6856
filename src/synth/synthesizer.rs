//! The synthesis pass.

use indexmap::IndexMap;

use crate::config::NamingSettings;
use crate::graph::{AttributeNode, ErGraph, GraphNode, RelationshipNode};
use crate::layout::{Layout, SubclassPlacement};
use crate::records::Grouping;
use crate::sql::SqlType;

use super::{
    ColumnForm, CompositeField, CompositeType, PhysicalColumn, PhysicalSchema, PhysicalTable,
    SynthError, SynthResult,
};

/// Build one table per grouping, in grouping order.
pub fn synthesize(
    graph: &ErGraph,
    layout: &Layout,
    groupings: &[Grouping],
    naming: &NamingSettings,
) -> SynthResult<PhysicalSchema> {
    let mut registry = TypeRegistry::new(naming);
    let mut tables = Vec::with_capacity(groupings.len());

    for (index, grouping) in groupings.iter().enumerate() {
        let table = TableBuilder {
            graph,
            layout,
            naming,
            index,
            grouping,
        }
        .build(&mut registry)?;

        tracing::debug!(
            table = %table.name,
            columns = table.columns.len(),
            "synthesized table"
        );
        tables.push(table);
    }

    let schema = PhysicalSchema {
        tables,
        types: registry.into_types(),
    };
    tracing::info!(
        tables = schema.tables.len(),
        types = schema.types.len(),
        "schema synthesis done"
    );
    Ok(schema)
}

// ============================================================================
// Composite types
// ============================================================================

/// Memoized composite type synthesis, keyed by type name.
///
/// Asking twice for the same attribute returns the same name and creates no
/// second definition. Nested composites are registered before their parents.
#[derive(Debug)]
pub struct TypeRegistry<'n> {
    naming: &'n NamingSettings,
    types: IndexMap<String, CompositeType>,
}

impl<'n> TypeRegistry<'n> {
    pub fn new(naming: &'n NamingSettings) -> Self {
        Self {
            naming,
            types: IndexMap::new(),
        }
    }

    /// Type name for `attr`, synthesizing it (and its nested types) on first use.
    pub fn ensure(&mut self, graph: &ErGraph, attr: &AttributeNode) -> SynthResult<String> {
        let name = self.naming.type_name(&attr.unique_name);
        if self.types.contains_key(&name) {
            return Ok(name);
        }

        let mut fields = Vec::with_capacity(attr.children.len());
        for child_name in &attr.children {
            let child = graph.attribute(child_name)?;
            let sql_type = if child.is_composite() {
                SqlType::Composite(self.ensure(graph, child)?)
            } else {
                SqlType::scalar(&child.attr_type)
            };
            fields.push(CompositeField {
                name: leaf_name(&child.unique_name).to_string(),
                sql_type,
            });
        }

        tracing::debug!(type_name = %name, fields = fields.len(), "synthesized composite type");
        self.types.insert(
            name.clone(),
            CompositeType {
                name: name.clone(),
                fields,
            },
        );
        Ok(name)
    }

    pub fn get(&self, name: &str) -> Option<&CompositeType> {
        self.types.get(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn into_types(self) -> IndexMap<String, CompositeType> {
        self.types
    }
}

fn leaf_name(unique_name: &str) -> &str {
    unique_name.rsplit('.').next().unwrap_or(unique_name)
}

// ============================================================================
// Tables
// ============================================================================

struct TableBuilder<'a> {
    graph: &'a ErGraph,
    layout: &'a Layout,
    naming: &'a NamingSettings,
    index: usize,
    grouping: &'a Grouping,
}

impl TableBuilder<'_> {
    fn build(&self, registry: &mut TypeRegistry<'_>) -> SynthResult<PhysicalTable> {
        let mut nodes = Vec::with_capacity(self.grouping.len());
        for name in self.grouping.names() {
            nodes.push(self.graph.get_node_by_name(name)?);
        }

        let attribute_count = nodes.iter().filter(|n| n.is_attribute()).count();
        let repeated = self.check_repeats()?;

        let mut columns = match repeated {
            Some(entity) => self.repeated_key_columns(entity, &nodes)?,
            None => Vec::new(),
        };

        for node in nodes {
            match node {
                GraphNode::Entity(entity) => {
                    if repeated.is_some() {
                        continue;
                    }
                    let needs_key = if entity.is_subclass() {
                        let placement = self
                            .layout
                            .subclass_placement(&entity.unique_name)
                            .ok_or_else(|| SynthError::MissingLayout(entity.unique_name.clone()))?;
                        placement == SubclassPlacement::AllByItself
                    } else {
                        true
                    };
                    if needs_key {
                        columns.insert(
                            0,
                            PhysicalColumn::key(
                                self.naming.key_column(&entity.unique_name),
                                &entity.unique_name,
                            ),
                        );
                    }
                }
                GraphNode::Relationship(_) => {}
                GraphNode::Attribute(attr) => {
                    if let Some(column) = self.attribute_column(attr, attribute_count, registry)? {
                        columns.push(column);
                    }
                }
            }
        }

        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(self.invalid(format!("duplicate column {}", column.name)));
            }
        }

        Ok(PhysicalTable {
            name: self.naming.table_name(self.index),
            grouping: self.index,
            columns,
        })
    }

    /// At most one name may repeat, and only once.
    fn check_repeats(&self) -> SynthResult<Option<&str>> {
        let repeated = self.grouping.repeated();
        match repeated.as_slice() {
            [] => Ok(None),
            [name] => {
                let name = *name;
                let count = self
                    .grouping
                    .names()
                    .iter()
                    .filter(|n| n.as_str() == name)
                    .count();
                if count > 2 {
                    return Err(self.invalid(format!("{} appears {} times", name, count)));
                }
                Ok(Some(name))
            }
            _ => Err(self.invalid(format!(
                "more than one repeated name: {}",
                repeated.join(", ")
            ))),
        }
    }

    /// The two foreign-key columns of a grouping that repeats an entity.
    fn repeated_key_columns(
        &self,
        entity: &str,
        nodes: &[&GraphNode],
    ) -> SynthResult<Vec<PhysicalColumn>> {
        if !self.graph.get_node_by_name(entity)?.is_entity() {
            return Err(self.invalid(format!("repeated name {} is not an entity", entity)));
        }

        let rel: &RelationshipNode = nodes
            .iter()
            .find_map(|n| match n {
                GraphNode::Relationship(r) => Some(r),
                _ => None,
            })
            .ok_or_else(|| {
                self.invalid(format!("{} is repeated but no relationship is present", entity))
            })?;

        let (e1, e2) = self.graph.relationship_endpoints(&rel.unique_name)?;
        if e1.is_weak() || e2.is_weak() {
            return Err(SynthError::Unsupported {
                grouping: self.index,
                reason: format!(
                    "self-relationship {} involves a weak entity",
                    rel.unique_name
                ),
            });
        }

        let (first, second) = match &rel.roles {
            Some((role1, role2)) => (
                self.naming.role_key_column(role1),
                self.naming.role_key_column(role2),
            ),
            None => {
                if e1.unique_name == e2.unique_name {
                    return Err(self.invalid(format!(
                        "self-relationship {} declares no roles",
                        rel.unique_name
                    )));
                }
                (
                    self.naming.key_column(&e1.unique_name),
                    self.naming.key_column(&e2.unique_name),
                )
            }
        };

        Ok(vec![
            PhysicalColumn::key(first, &e1.unique_name),
            PhysicalColumn::key(second, &e2.unique_name),
        ])
    }

    fn attribute_column(
        &self,
        attr: &AttributeNode,
        attribute_count: usize,
        registry: &mut TypeRegistry<'_>,
    ) -> SynthResult<Option<PhysicalColumn>> {
        if self.naming.is_key_attribute(&attr.unique_name) {
            return Ok(None);
        }

        let (sql_type, form) = if attr.is_composite() {
            (
                SqlType::Composite(registry.ensure(self.graph, attr)?),
                ColumnForm::Composite,
            )
        } else if attr.is_multivalued && attribute_count == 1 {
            (SqlType::scalar(&attr.attr_type), ColumnForm::Normalized)
        } else if attr.is_multivalued {
            (
                SqlType::array_of(SqlType::scalar(&attr.attr_type)),
                ColumnForm::Array,
            )
        } else {
            (SqlType::scalar(&attr.attr_type), ColumnForm::Value)
        };

        Ok(Some(PhysicalColumn {
            name: self.naming.column_name(attr.local_path()),
            sql_type,
            source: attr.unique_name.clone(),
            form,
            flattened_from: attr.parent.as_ref().map(|_| attr.root_name().to_string()),
        }))
    }

    fn invalid(&self, reason: String) -> SynthError {
        SynthError::InvalidState {
            grouping: self.index,
            reason,
        }
    }
}
