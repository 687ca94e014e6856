//! DDL (Data Definition Language) support.
//!
//! Builders for the two statements a physical schema needs: `CREATE TYPE`
//! for composite attributes and `CREATE TABLE` for groupings.
//!
//! # Examples
//!
//! ```ignore
//! use ermap::sql::{ColumnDef, CreateTable, Dialect, SqlType};
//!
//! let table = CreateTable::new("rel0")
//!     .column(ColumnDef::new("person_id", SqlType::Integer))
//!     .column(ColumnDef::new("name", SqlType::Varchar(255)));
//!
//! println!("{}", table.to_sql(Dialect::Postgres));
//! ```

use super::dialect::{Dialect, SqlDialect};
use super::token::{Token, TokenStream};
use super::types::SqlType;

/// DDL statement types.
#[derive(Debug, Clone, PartialEq)]
pub enum DdlStatement {
    CreateType(CreateType),
    CreateTable(CreateTable),
}

impl DdlStatement {
    /// Convert to SQL for the given dialect, without a terminator.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens(dialect).serialize(dialect)
    }

    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        match self {
            DdlStatement::CreateType(ct) => ct.to_tokens(dialect),
            DdlStatement::CreateTable(ct) => ct.to_tokens(),
        }
    }
}

/// Render a list of statements as one `;`-terminated script.
pub fn to_script(statements: &[DdlStatement], dialect: Dialect) -> String {
    let mut ts = TokenStream::new();
    for (i, stmt) in statements.iter().enumerate() {
        if i > 0 {
            ts.newline().newline();
        }
        ts.append(&stmt.to_tokens(dialect)).push(Token::Semicolon);
    }
    if !statements.is_empty() {
        ts.newline();
    }
    ts.serialize(dialect)
}

// ============================================================================
// Column Definition
// ============================================================================

/// Column (or composite field) definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: SqlType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: SqlType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Ident(self.name.clone()))
            .space()
            .push(Token::DataType(self.data_type.clone()));
        ts
    }
}

/// `(\n  a T,\n  b U\n)`
fn column_list(columns: &[ColumnDef]) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.lparen();
    for (i, col) in columns.iter().enumerate() {
        if i > 0 {
            ts.comma();
        }
        ts.newline().indent(1).append(&col.to_tokens());
    }
    ts.newline().rparen();
    ts
}

// ============================================================================
// CREATE TABLE
// ============================================================================

/// CREATE TABLE statement.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "DDL statements have no effect until converted to SQL with to_sql()"]
pub struct CreateTable {
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

impl CreateTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Add a column definition.
    pub fn column(mut self, col: ColumnDef) -> Self {
        self.columns.push(col);
        self
    }

    /// Add multiple column definitions.
    pub fn columns(mut self, cols: impl IntoIterator<Item = ColumnDef>) -> Self {
        self.columns.extend(cols);
        self
    }

    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens().serialize(dialect)
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Create)
            .space()
            .push(Token::Table)
            .space()
            .push(Token::Ident(self.name.clone()))
            .space()
            .append(&column_list(&self.columns));
        ts
    }
}

// ============================================================================
// CREATE TYPE
// ============================================================================

/// CREATE TYPE statement for a composite attribute.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "DDL statements have no effect until converted to SQL with to_sql()"]
pub struct CreateType {
    pub name: String,
    pub fields: Vec<ColumnDef>,
}

impl CreateType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: ColumnDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens(dialect).serialize(dialect)
    }

    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Create)
            .space()
            .push(Token::Type)
            .space()
            .push(Token::Ident(self.name.clone()))
            .space()
            .push(Token::As)
            .space();
        if dialect.composite_type_is_struct() {
            ts.push(Token::Struct);
        }
        ts.append(&column_list(&self.fields));
        ts
    }
}
