//! Schema synthesis - one physical table per grouping.
//!
//! Turns the classified graph and the ordered groupings into a
//! [`PhysicalSchema`]: positional tables (`rel0`, `rel1`, ...) plus the
//! composite types their columns refer to.
//!
//! Every column records where it came from:
//!
//! ```text
//! PhysicalColumn
//!   name            column name
//!   sql_type        INTEGER | VARCHAR(255) | TEXT | composite | T[]
//!   source          attribute unique name, or the key column name for keys
//!   form            Key{entity} | Value | Composite | Array | Normalized
//!   flattened_from  top-level composite a split sub-attribute belongs to
//! ```
//!
//! Downstream passes (ownership, reconstruction) match on `form` and
//! `flattened_from`; they never inspect column names.

mod ddl;
mod synthesizer;
mod types;

pub use synthesizer::{synthesize, TypeRegistry};
pub use types::{
    ColumnForm, CompositeField, CompositeType, PhysicalColumn, PhysicalSchema, PhysicalTable,
};

use crate::graph::GraphError;

/// Errors raised while synthesizing tables.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthError {
    #[error("Invalid grouping {grouping}: {reason}")]
    InvalidState { grouping: usize, reason: String },

    #[error("Unsupported grouping {grouping}: {reason}")]
    Unsupported { grouping: usize, reason: String },

    #[error("No layout decision recorded for subclass {0}")]
    MissingLayout(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type SynthResult<T> = Result<T, SynthError>;
