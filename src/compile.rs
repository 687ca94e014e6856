//! End-to-end compilation from front-end records to tables and queries.
//!
//! ```text
//! SchemaRecords ─► ErGraph ─► classify ─► synthesize ─► resolve ─► structures
//!                                              │                       │
//!                                              ▼                       ▼
//!                                       PhysicalSchema          CompiledGraph
//!                                              └───────► reconstruct ◄─┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use ermap::compile::{compile, CompileOptions};
//! use ermap::records::{Grouping, SchemaRecords};
//!
//! let records = SchemaRecords::from_json(schema_json)?;
//! let groupings = Grouping::list_from_json(r#"[["person", "person.name"]]"#)?;
//!
//! let output = compile(&records, &groupings, &CompileOptions::default())?;
//! println!("{}", output.ddl());
//! for (node, sql) in output.queries()? {
//!     println!("-- {}\n{};", node, sql);
//! }
//! ```

use indexmap::IndexMap;

use crate::config::{NamingSettings, Settings, SettingsError};
use crate::graph::{ErGraph, GraphError};
use crate::layout::{classify, Layout, LayoutError};
use crate::mapping::{resolve, MappingError, TableOwnership};
use crate::persist::{self, PersistError};
use crate::reconstruct::{reconstruct_all, ReconstructError};
use crate::records::{Grouping, SchemaRecords};
use crate::sql::Dialect;
use crate::structure::{derive_structures, StructureError, Structures};
use crate::synth::{synthesize, PhysicalSchema, SynthError};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during compilation.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Invalid input: {0}")]
    Input(#[from] serde_json::Error),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Synthesis error: {0}")]
    Synth(#[from] SynthError),

    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    #[error("Structure error: {0}")]
    Structure(#[from] StructureError),

    #[error("Reconstruction error: {0}")]
    Reconstruct(#[from] ReconstructError),

    #[error("Persisted graph error: {0}")]
    Persist(#[from] PersistError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CompileResult<T> = Result<T, CompileError>;

// ============================================================================
// Options
// ============================================================================

/// Options for compilation.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub naming: NamingSettings,

    /// SQL dialect for DDL and reconstruction queries.
    pub dialect: Dialect,

    /// Parse emitted queries back before returning them.
    pub validate_sql: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl CompileOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            naming: settings.naming.clone(),
            dialect: settings.output.dialect,
            validate_sql: settings.output.validate_sql,
        }
    }

    /// Set the SQL dialect.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_validation(mut self, validate_sql: bool) -> Self {
        self.validate_sql = validate_sql;
        self
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// The graph together with every annotation the passes derived for it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledGraph {
    pub graph: ErGraph,
    pub layout: Layout,
    pub ownership: TableOwnership,
    pub structures: Structures,
}

impl CompiledGraph {
    pub fn to_json(&self) -> Result<String, PersistError> {
        persist::to_json(self)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        persist::from_json(json)
    }
}

/// Result of compiling a schema against a set of groupings.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub compiled: CompiledGraph,
    pub schema: PhysicalSchema,
    pub dialect: Dialect,
    pub validate_sql: bool,
}

impl CompileOutput {
    /// `CREATE TYPE` / `CREATE TABLE` script for the chosen dialect.
    pub fn ddl(&self) -> String {
        self.schema.to_ddl(self.dialect)
    }

    /// One reconstruction query per entity/relationship, in graph order.
    pub fn queries(&self) -> CompileResult<IndexMap<String, String>> {
        Ok(reconstruct_all(
            &self.compiled,
            &self.schema,
            self.dialect,
            self.validate_sql,
        )?)
    }
}

// ============================================================================
// Compilation Functions
// ============================================================================

/// Run every pass up to (not including) reconstruction.
pub fn compile(
    records: &SchemaRecords,
    groupings: &[Grouping],
    options: &CompileOptions,
) -> CompileResult<CompileOutput> {
    let graph = ErGraph::from_records(records)?;
    let layout = classify(&graph, groupings)?;
    let schema = synthesize(&graph, &layout, groupings, &options.naming)?;
    let ownership = resolve(&graph, &layout, groupings, &schema)?;
    let structures = derive_structures(&graph, &layout, &options.naming)?;

    Ok(CompileOutput {
        compiled: CompiledGraph {
            graph,
            layout,
            ownership,
            structures,
        },
        schema,
        dialect: options.dialect,
        validate_sql: options.validate_sql,
    })
}

/// [`compile`] from the JSON forms of the records and groupings.
pub fn compile_json(
    schema_json: &str,
    groupings_json: &str,
    options: &CompileOptions,
) -> CompileResult<CompileOutput> {
    let records = SchemaRecords::from_json(schema_json)?;
    let groupings = Grouping::list_from_json(groupings_json)?;
    compile(&records, &groupings, options)
}

/// Reload persisted outputs of an earlier [`compile`] run.
pub fn load(
    graph_json: &str,
    tables_json: &str,
    options: &CompileOptions,
) -> CompileResult<CompileOutput> {
    Ok(CompileOutput {
        compiled: CompiledGraph::from_json(graph_json)?,
        schema: PhysicalSchema::from_json(tables_json)?,
        dialect: options.dialect,
        validate_sql: options.validate_sql,
    })
}
