//! SQL generation module.
//!
//! A small, type-safe SQL builder covering what mapping output needs:
//!
//! - [`query`] - SELECT builder for reconstruction queries
//! - [`expr`] - Expression AST (columns, key equality, ARRAY_AGG)
//! - [`ddl`] - CREATE TABLE / CREATE TYPE
//! - [`types`] - Column types
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - PostgreSQL and DuckDB
//! - [`validate`] - sqlparser round-trip validation

pub mod ddl;
pub mod dialect;
pub mod expr;
pub mod query;
pub mod token;
pub mod types;
pub mod validate;

pub use ddl::{to_script, ColumnDef, CreateTable, CreateType, DdlStatement};
pub use dialect::{Dialect, SqlDialect};
pub use expr::{array_agg, col, func, table_col, BinaryOperator, Expr, ExprExt};
pub use query::{Join, Query, SelectExpr, TableRef};
pub use token::{Token, TokenStream};
pub use types::{SqlType, VARCHAR_WIDTH};
pub use validate::validate_sql;
