//! DDL emission for a physical schema.

use crate::sql::{to_script, ColumnDef, CreateTable, CreateType, DdlStatement, Dialect};

use super::PhysicalSchema;

impl PhysicalSchema {
    /// `CREATE TYPE` statements in creation order, then one `CREATE TABLE`
    /// per table.
    pub fn ddl_statements(&self) -> Vec<DdlStatement> {
        let types = self.types.values().map(|ty| {
            DdlStatement::CreateType(CreateType {
                name: ty.name.clone(),
                fields: ty
                    .fields
                    .iter()
                    .map(|f| ColumnDef::new(f.name.clone(), f.sql_type.clone()))
                    .collect(),
            })
        });

        let tables = self.tables.iter().map(|table| {
            DdlStatement::CreateTable(
                CreateTable::new(table.name.clone()).columns(
                    table
                        .columns
                        .iter()
                        .map(|c| ColumnDef::new(c.name.clone(), c.sql_type.clone())),
                ),
            )
        });

        types.chain(tables).collect()
    }

    /// The whole schema as a `;`-terminated script.
    pub fn to_ddl(&self, dialect: Dialect) -> String {
        to_script(&self.ddl_statements(), dialect)
    }
}
