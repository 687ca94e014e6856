//! The classification pass.

use crate::graph::{EntityNode, ErGraph, GraphResult};
use crate::records::Grouping;

use super::{Layout, LayoutDecision, LayoutError, LayoutResult, SubclassPlacement};

/// What a qualifying grouping reveals about a subclass or weak entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupingEvidence {
    /// Position of the grouping in the input list
    pub index: usize,
    /// Any relationship node in the grouping
    pub has_relationship: bool,
    /// Any attribute of the parent entity in the grouping
    pub parent_attribute_present: bool,
}

/// Classify every subclass and weak entity of `graph` against `groupings`.
pub fn classify(graph: &ErGraph, groupings: &[Grouping]) -> LayoutResult<Layout> {
    let mut layout = Layout::new();

    for entity in graph.entities() {
        if !(entity.is_subclass() || entity.is_weak()) {
            continue;
        }

        let evidence = find_evidence(graph, entity, groupings)?;

        let decision = if entity.is_subclass() {
            let placement = decide_subclass(&entity.unique_name, evidence)?;
            LayoutDecision::Subclass {
                placement,
                grouping: evidence.map(|e| e.index),
            }
        } else {
            let evidence =
                evidence.ok_or_else(|| LayoutError::MissingGrouping(entity.unique_name.clone()))?;
            LayoutDecision::Weak {
                all_by_itself: !evidence.parent_attribute_present,
                grouping: evidence.index,
            }
        };

        tracing::debug!(
            entity = %entity.unique_name,
            decision = ?decision,
            "classified"
        );
        layout.insert(entity.unique_name.clone(), decision);
    }

    tracing::info!(classified = layout.len(), "layout classification done");
    Ok(layout)
}

/// Pick the subclass placement implied by the evidence.
///
/// Exactly one of the three cases must hold; a grouping that also carries a
/// relationship satisfies none of them and is rejected.
pub fn decide_subclass(
    entity: &str,
    evidence: Option<GroupingEvidence>,
) -> LayoutResult<SubclassPlacement> {
    let all_by_itself = evidence.is_none();
    let contained_in_parent =
        evidence.is_some_and(|e| !e.has_relationship && e.parent_attribute_present);
    let partially_by_itself =
        evidence.is_some_and(|e| !e.has_relationship && !e.parent_attribute_present);

    match (all_by_itself, contained_in_parent, partially_by_itself) {
        (true, false, false) => Ok(SubclassPlacement::AllByItself),
        (false, true, false) => Ok(SubclassPlacement::ContainedInParent),
        (false, false, true) => Ok(SubclassPlacement::PartiallyByItself),
        _ => Err(LayoutError::ClassificationConflict {
            entity: entity.to_string(),
            reason: match evidence {
                Some(e) if e.has_relationship => {
                    format!("grouping {} also holds a relationship", e.index)
                }
                _ => "grouping evidence matches no placement".to_string(),
            },
        }),
    }
}

/// Find the first grouping holding the entity, its parent and one of its own
/// attributes, and inspect it.
fn find_evidence(
    graph: &ErGraph,
    entity: &EntityNode,
    groupings: &[Grouping],
) -> LayoutResult<Option<GroupingEvidence>> {
    let Some(parent) = entity.parent.as_deref() else {
        return Ok(None);
    };
    let own_attributes = graph.get_attributes(&entity.unique_name)?;
    let parent_attributes = graph.get_attributes(parent)?;

    let found = groupings.iter().enumerate().find(|(_, g)| {
        g.contains(&entity.unique_name)
            && g.contains(parent)
            && own_attributes.iter().any(|a| g.contains(&a.unique_name))
    });

    let Some((index, grouping)) = found else {
        return Ok(None);
    };

    let has_relationship = grouping_has_relationship(graph, grouping)?;
    let parent_attribute_present = parent_attributes
        .iter()
        .any(|a| grouping.contains(&a.unique_name));

    Ok(Some(GroupingEvidence {
        index,
        has_relationship,
        parent_attribute_present,
    }))
}

fn grouping_has_relationship(graph: &ErGraph, grouping: &Grouping) -> GraphResult<bool> {
    for name in grouping.names() {
        if graph.get_node_by_name(name)?.is_relationship() {
            return Ok(true);
        }
    }
    Ok(false)
}
