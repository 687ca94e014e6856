//! Layout classification for subclasses and weak entities.
//!
//! Decides, per subclass, which of the three inheritance mappings the chosen
//! groupings imply:
//!
//! ```text
//! AllByItself        no grouping holds {subclass, parent, subclass attr}
//!                    → table-per-concrete-class, own key column
//! ContainedInParent  grouping found, no relationship, a parent attr present
//!                    → single table, subclass columns nullable in parent row
//! PartiallyByItself  grouping found, no relationship, no parent attr
//!                    → joined table keyed by the parent's key
//! ```
//!
//! Weak entities must always share a grouping with their owner; for them only
//! `all_by_itself` (no owner attribute alongside) is recorded.
//!
//! The result is a [`Layout`] side-table keyed by unique name; the graph
//! itself is not modified.

mod classify;

pub use classify::{classify, decide_subclass, GroupingEvidence};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::graph::GraphError;

/// Errors raised by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("Classification conflict for subclass {entity}: {reason}")]
    ClassificationConflict { entity: String, reason: String },

    #[error("Weak entity {0} has no grouping containing it, its owner and one of its attributes")]
    MissingGrouping(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type LayoutResult<T> = Result<T, LayoutError>;

/// How a subclass is physically represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubclassPlacement {
    AllByItself,
    ContainedInParent,
    PartiallyByItself,
}

/// Classification recorded for one subclass or weak entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutDecision {
    Subclass {
        placement: SubclassPlacement,
        /// Index of the qualifying grouping, if any
        grouping: Option<usize>,
    },
    Weak {
        /// No owner attribute shares the weak entity's grouping
        all_by_itself: bool,
        grouping: usize,
    },
}

impl LayoutDecision {
    pub fn all_by_itself(&self) -> bool {
        match self {
            LayoutDecision::Subclass { placement, .. } => {
                *placement == SubclassPlacement::AllByItself
            }
            LayoutDecision::Weak { all_by_itself, .. } => *all_by_itself,
        }
    }

    pub fn contained_in_parent(&self) -> bool {
        matches!(
            self,
            LayoutDecision::Subclass {
                placement: SubclassPlacement::ContainedInParent,
                ..
            }
        )
    }

    pub fn partially_by_itself(&self) -> bool {
        matches!(
            self,
            LayoutDecision::Subclass {
                placement: SubclassPlacement::PartiallyByItself,
                ..
            }
        )
    }

    pub fn grouping(&self) -> Option<usize> {
        match self {
            LayoutDecision::Subclass { grouping, .. } => *grouping,
            LayoutDecision::Weak { grouping, .. } => Some(*grouping),
        }
    }
}

/// Classifier output: one decision per subclass/weak entity, in graph order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    decisions: IndexMap<String, LayoutDecision>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, unique_name: &str) -> Option<&LayoutDecision> {
        self.decisions.get(unique_name)
    }

    /// Placement of a subclass; `None` for anything that is not a classified subclass.
    pub fn subclass_placement(&self, unique_name: &str) -> Option<SubclassPlacement> {
        match self.decisions.get(unique_name) {
            Some(LayoutDecision::Subclass { placement, .. }) => Some(*placement),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LayoutDecision)> {
        self.decisions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    pub(crate) fn insert(&mut self, unique_name: String, decision: LayoutDecision) {
        self.decisions.insert(unique_name, decision);
    }
}
