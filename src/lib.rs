//! # ermap
//!
//! Compiles a logical Entity-Relationship schema into one of several physical
//! relational layouts, then derives the SQL that reconstructs each entity and
//! relationship from whichever layout was chosen.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        SchemaRecords (entities, relationships)           │
//! │        + ordered groupings (connected subgraphs)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [graph]
//! ┌─────────────────────────────────────────────────────────┐
//! │   ErGraph (Entity / Relationship / Attribute nodes)      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [layout]       Layout side-table
//!                          ▼ [synth]        PhysicalSchema (rel0.., types)
//!                          ▼ [mapping]      TableOwnership side-table
//!                          ▼ [structure]    Structures side-table
//! ┌─────────────────────────────────────────────────────────┐
//! │        CompiledGraph  ──[persist]──►  graph.json         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [reconstruct]
//! ┌─────────────────────────────────────────────────────────┐
//! │          SELECT per entity/relationship                  │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod compile;
pub mod config;
pub mod graph;
pub mod layout;
pub mod mapping;
pub mod persist;
pub mod reconstruct;
pub mod records;
pub mod sql;
pub mod structure;
pub mod synth;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{
        compile, compile_json, CompileError, CompileOptions, CompileOutput, CompiledGraph,
    };
    pub use crate::config::Settings;
    pub use crate::graph::{ErGraph, GraphError, GraphNode};
    pub use crate::layout::{classify, Layout, LayoutDecision, SubclassPlacement};
    pub use crate::mapping::{resolve, TableOwnership};
    pub use crate::reconstruct::{reconstruct, reconstruct_node, render};
    pub use crate::records::{
        AttrType, AttributeRecord, EndpointRecord, EntityKind, EntityRecord, Grouping,
        RelationshipRecord, SchemaRecords,
    };
    pub use crate::sql::Dialect;
    pub use crate::structure::{derive_structures, LogicalAttribute, Structures};
    pub use crate::synth::{
        synthesize, ColumnForm, PhysicalColumn, PhysicalSchema, PhysicalTable,
    };
}
