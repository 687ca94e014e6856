//! Tests for subclass and weak-entity layout classification.

use ermap::graph::ErGraph;
use ermap::layout::{classify, LayoutDecision, LayoutError, SubclassPlacement};
use ermap::records::{
    AttrType, AttributeRecord, EndpointRecord, EntityKind, EntityRecord, Grouping,
    RelationshipRecord,
};

fn entity(name: &str, kind: EntityKind, parent: Option<&str>, attrs: &[&str]) -> EntityRecord {
    EntityRecord {
        table_name: name.into(),
        entity_type: kind,
        parent_entity: parent.map(str::to_string),
        attributes: attrs
            .iter()
            .map(|a| AttributeRecord::new(*a, AttrType::Varchar))
            .collect(),
    }
}

/// Person with two subclasses, a weak Dependent, and Advises between the subclasses.
fn university() -> ErGraph {
    let mut graph = ErGraph::new();
    graph
        .add_entity(&entity("Person", EntityKind::Regular, None, &["person_id", "name"]))
        .unwrap();
    graph
        .add_entity(&entity("Instructor", EntityKind::Subclass, Some("Person"), &["rank"]))
        .unwrap();
    graph
        .add_entity(&entity("Student", EntityKind::Subclass, Some("Person"), &["tot_cred"]))
        .unwrap();
    graph
        .add_entity(&entity("Dependent", EntityKind::Weak, Some("Person"), &["dep_name"]))
        .unwrap();
    graph
        .add_relationship(&RelationshipRecord {
            table_name: "Advises".into(),
            entity1: EndpointRecord::new("Instructor"),
            entity2: EndpointRecord::new("Student"),
            attributes: vec![],
        })
        .unwrap();
    graph
}

fn groupings(raw: &[&[&str]]) -> Vec<Grouping> {
    raw.iter().map(|g| Grouping::new(g.iter())).collect()
}

#[test]
fn test_parent_attribute_in_grouping_means_contained_in_parent() {
    let graph = university();
    let layout = classify(
        &graph,
        &groupings(&[
            &["person", "person.name", "instructor", "instructor.rank"],
            &["student", "student.tot_cred"],
            &["dependent", "person", "dependent.dep_name"],
        ]),
    )
    .unwrap();

    let instructor = layout.get("instructor").unwrap();
    assert!(instructor.contained_in_parent());
    assert!(!instructor.all_by_itself());
    assert!(!instructor.partially_by_itself());
    assert_eq!(instructor.grouping(), Some(0));
}

#[test]
fn test_no_qualifying_grouping_means_all_by_itself() {
    let graph = university();
    let layout = classify(
        &graph,
        &groupings(&[
            &["person", "person.name"],
            &["student", "student.tot_cred", "person.name"],
            &["instructor", "instructor.rank", "person.name"],
            &["dependent", "person", "dependent.dep_name"],
        ]),
    )
    .unwrap();

    assert_eq!(
        layout.subclass_placement("student"),
        Some(SubclassPlacement::AllByItself)
    );
    assert_eq!(layout.get("student").unwrap().grouping(), None);
}

#[test]
fn test_parent_without_its_attributes_means_partially_by_itself() {
    let graph = university();
    let layout = classify(
        &graph,
        &groupings(&[
            &["person", "person.name"],
            &["student", "person", "student.tot_cred"],
            &["instructor", "person", "instructor.rank"],
            &["dependent", "person", "dependent.dep_name"],
        ]),
    )
    .unwrap();

    assert_eq!(
        layout.get("student"),
        Some(&LayoutDecision::Subclass {
            placement: SubclassPlacement::PartiallyByItself,
            grouping: Some(1),
        })
    );
    assert_eq!(
        layout.subclass_placement("instructor"),
        Some(SubclassPlacement::PartiallyByItself)
    );
}

#[test]
fn test_relationship_in_subclass_grouping_is_a_conflict() {
    let graph = university();
    let err = classify(
        &graph,
        &groupings(&[&["advises", "instructor", "person", "instructor.rank"]]),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        LayoutError::ClassificationConflict { ref entity, .. } if entity == "instructor"
    ));
}

#[test]
fn test_weak_entity_requires_grouping_with_owner() {
    let graph = university();
    let err = classify(
        &graph,
        &groupings(&[
            &["person", "person.name"],
            &["dependent", "dependent.dep_name"],
        ]),
    )
    .unwrap_err();

    assert_eq!(err, LayoutError::MissingGrouping("dependent".into()));
}

#[test]
fn test_weak_entity_all_by_itself_tracks_owner_attributes() {
    let graph = university();

    let separate = classify(
        &graph,
        &groupings(&[
            &["person", "person.name"],
            &["dependent", "person", "dependent.dep_name"],
        ]),
    )
    .unwrap();
    assert_eq!(
        separate.get("dependent"),
        Some(&LayoutDecision::Weak {
            all_by_itself: true,
            grouping: 1,
        })
    );

    let merged = classify(
        &graph,
        &groupings(&[&["dependent", "person", "person.name", "dependent.dep_name"]]),
    )
    .unwrap();
    assert!(!merged.get("dependent").unwrap().all_by_itself());
}

#[test]
fn test_only_subclasses_and_weak_entities_are_classified() {
    let graph = university();
    let layout = classify(
        &graph,
        &groupings(&[
            &["person", "person.name"],
            &["dependent", "person", "dependent.dep_name"],
        ]),
    )
    .unwrap();

    let classified: Vec<&str> = layout.iter().map(|(name, _)| name).collect();
    assert_eq!(classified, vec!["instructor", "student", "dependent"]);
    assert!(layout.get("person").is_none());
}
