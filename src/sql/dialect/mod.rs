//! SQL Dialect definitions and formatting rules.
//!
//! Each dialect implements `SqlDialect` to handle the syntax differences
//! that matter for mapping output:
//!
//! - Identifier quoting (both supported dialects use `"`)
//! - Column type spelling
//! - Composite type bodies: `AS (...)` (PostgreSQL) vs `AS STRUCT(...)` (DuckDB)
//! - Aggregate naming: `ARRAY_AGG` vs `LIST`
//!
//! # Usage
//!
//! ```ignore
//! use ermap::sql::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::Postgres;
//! let quoted = dialect.quote_identifier("rel0");  // "rel0"
//! ```

mod duckdb;
pub mod helpers;
mod postgres;

pub use duckdb::DuckDb;
pub use postgres::Postgres;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::types::SqlType;

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// The default implementations follow PostgreSQL.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    /// Quote an identifier (table, column, alias, type name).
    fn quote_identifier(&self, ident: &str) -> String;

    /// Spell a column type.
    ///
    /// Composite type names are identifiers and are quoted like one.
    fn emit_sql_type(&self, ty: &SqlType) -> String {
        match ty {
            SqlType::Integer => "INTEGER".into(),
            SqlType::Varchar(n) => format!("VARCHAR({})", n),
            SqlType::Text => "TEXT".into(),
            SqlType::Composite(name) => self.quote_identifier(name),
            SqlType::Array(inner) => format!("{}[]", self.emit_sql_type(inner)),
        }
    }

    /// Whether `CREATE TYPE ... AS` wraps its field list in `STRUCT(...)`.
    ///
    /// - PostgreSQL: `CREATE TYPE t AS (a INTEGER)`
    /// - DuckDB: `CREATE TYPE t AS STRUCT(a INTEGER)`
    fn composite_type_is_struct(&self) -> bool {
        false
    }

    /// Remap a function name for this dialect.
    ///
    /// Returns `Some(new_name)` if the function should be remapped, `None` to
    /// keep the original. The input is matched case-insensitively.
    fn remap_function(&self, name: &str) -> Option<&'static str> {
        let _ = name;
        None
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    DuckDb,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Postgres => &Postgres,
            Dialect::DuckDb => &DuckDb,
        }
    }
}

impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn emit_sql_type(&self, ty: &SqlType) -> String {
        self.dialect().emit_sql_type(ty)
    }

    fn composite_type_is_struct(&self) -> bool {
        self.dialect().composite_type_is_struct()
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        self.dialect().remap_function(name)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "duckdb" => Ok(Dialect::DuckDb),
            other => Err(format!("unknown dialect: {}", other)),
        }
    }
}
