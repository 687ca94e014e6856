//! PostgreSQL SQL dialect.
//!
//! PostgreSQL features used by mapping output:
//! - ANSI identifier quoting (`"`)
//! - Composite types (`CREATE TYPE t AS (...)`)
//! - Array columns (`T[]`) and `ARRAY_AGG`

use super::helpers;
use super::SqlDialect;

/// PostgreSQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }
}
