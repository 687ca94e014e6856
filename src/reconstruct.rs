//! Query reconstruction - one SELECT per entity/relationship.
//!
//! The first owning table is the anchor; every other owning table is joined on
//! first column = first column. Each logical attribute is then located in the
//! owning tables:
//!
//! ```text
//! column with the attribute's name       form Normalized  -> ARRAY_AGG(col) AS attr
//!                                         anything else   -> col AS attr
//! composite with no such column          columns flattened_from attr, each AS itself
//! ```
//!
//! When any aggregate is selected, every other selected column goes into
//! GROUP BY, in selection order.

use indexmap::IndexMap;

use crate::compile::CompiledGraph;
use crate::sql::{
    array_agg, table_col, validate_sql, Dialect, Expr, ExprExt, Query, SelectExpr, TableRef,
};
use crate::structure::LogicalAttribute;
use crate::synth::{ColumnForm, PhysicalSchema, PhysicalTable};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconstructError {
    #[error("No logical structure recorded for {0}")]
    UnknownNode(String),

    #[error("{0} owns no tables")]
    NoOwningTables(String),

    #[error("Table {table} owned by {node} is not in the physical schema")]
    UnknownTable { node: String, table: String },

    #[error("Cannot join {table} for {node}: its first column is not a key")]
    AmbiguousJoinKey { node: String, table: String },

    #[error("No column for {node}.{attribute} in its owning tables")]
    ColumnNotFound { node: String, attribute: String },

    #[error("{0}")]
    InvalidSql(String),
}

pub type ReconstructResult<T> = Result<T, ReconstructError>;

/// Build the SELECT reproducing `structure` from `tables`.
///
/// `tables` must be in table order; the first one anchors the FROM clause.
pub fn reconstruct(
    node: &str,
    structure: &[LogicalAttribute],
    tables: &[&PhysicalTable],
) -> ReconstructResult<Query> {
    let (anchor, joined) = tables
        .split_first()
        .ok_or_else(|| ReconstructError::NoOwningTables(node.to_string()))?;

    let mut query = Query::new().from(TableRef::new(&anchor.name));
    if !joined.is_empty() {
        let anchor_key = join_key(node, anchor)?;
        for table in joined {
            let key = join_key(node, table)?;
            query = query.inner_join(
                TableRef::new(&table.name),
                table_col(&anchor.name, anchor_key).eq(table_col(&table.name, key)),
            );
        }
    }

    let mut select: Vec<SelectExpr> = Vec::with_capacity(structure.len());
    for attr in structure {
        select.extend(select_attribute(node, attr, tables)?);
    }

    let group_by: Vec<Expr> = if select.iter().any(|s| s.expr.is_aggregate()) {
        select
            .iter()
            .filter(|s| !s.expr.is_aggregate())
            .map(|s| s.expr.clone())
            .collect()
    } else {
        Vec::new()
    };

    tracing::debug!(
        node = %node,
        tables = tables.len(),
        columns = select.len(),
        grouped = !group_by.is_empty(),
        "reconstructed query"
    );
    Ok(query.select(select).group_by(group_by))
}

/// Reconstruct a single node of a compiled graph.
pub fn reconstruct_node(
    compiled: &CompiledGraph,
    schema: &PhysicalSchema,
    node: &str,
) -> ReconstructResult<Query> {
    let node = node.to_lowercase();
    let structure = compiled
        .structures
        .get(&node)
        .ok_or_else(|| ReconstructError::UnknownNode(node.clone()))?;

    let tables = compiled
        .ownership
        .tables_of(&node)
        .iter()
        .map(|name| {
            schema.table(name).ok_or_else(|| ReconstructError::UnknownTable {
                node: node.clone(),
                table: name.clone(),
            })
        })
        .collect::<ReconstructResult<Vec<_>>>()?;

    reconstruct(&node, structure, &tables)
}

/// Render a query for `dialect`, parsing it back first when `validate` is set.
pub fn render(query: &Query, dialect: Dialect, validate: bool) -> ReconstructResult<String> {
    let sql = query.to_sql(dialect);
    if validate {
        validate_sql(&sql, dialect).map_err(ReconstructError::InvalidSql)?;
    }
    Ok(sql)
}

/// SQL for every entity and relationship, in graph order.
pub fn reconstruct_all(
    compiled: &CompiledGraph,
    schema: &PhysicalSchema,
    dialect: Dialect,
    validate: bool,
) -> ReconstructResult<IndexMap<String, String>> {
    let mut queries = IndexMap::with_capacity(compiled.structures.len());
    for (node, _) in compiled.structures.iter() {
        let query = reconstruct_node(compiled, schema, node)?;
        queries.insert(node.to_string(), render(&query, dialect, validate)?);
    }
    tracing::info!(queries = queries.len(), dialect = %dialect, "reconstruction done");
    Ok(queries)
}

fn join_key<'t>(node: &str, table: &'t PhysicalTable) -> ReconstructResult<&'t str> {
    table
        .first_column()
        .filter(|c| c.form.is_key())
        .map(|c| c.name.as_str())
        .ok_or_else(|| ReconstructError::AmbiguousJoinKey {
            node: node.to_string(),
            table: table.name.clone(),
        })
}

fn select_attribute(
    node: &str,
    attr: &LogicalAttribute,
    tables: &[&PhysicalTable],
) -> ReconstructResult<Vec<SelectExpr>> {
    let direct = tables
        .iter()
        .find_map(|t| t.column(&attr.attr_name).map(|c| (t, c)));

    if let Some((table, column)) = direct {
        let expr = table_col(&table.name, &column.name);
        let expr = match column.form {
            ColumnForm::Normalized => array_agg(expr),
            _ => expr,
        };
        return Ok(vec![expr.alias(&attr.attr_name)]);
    }

    let flattened: Vec<SelectExpr> = if attr.is_composite() {
        tables
            .iter()
            .flat_map(|t| {
                t.columns
                    .iter()
                    .filter(|c| c.flattened_from.as_deref() == Some(attr.attr_name.as_str()))
                    .map(move |c| table_col(&t.name, &c.name).alias(&c.name))
            })
            .collect()
    } else {
        Vec::new()
    };

    if flattened.is_empty() {
        return Err(ReconstructError::ColumnNotFound {
            node: node.to_string(),
            attribute: attr.attr_name.clone(),
        });
    }
    Ok(flattened)
}
