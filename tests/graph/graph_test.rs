//! Tests for ER graph population and traversal.

use ermap::graph::{EdgeKind, ErGraph, GraphError, GraphNode, NodeType};
use ermap::records::{
    AttrType, AttributeRecord, EndpointRecord, EntityKind, EntityRecord, RelationshipRecord,
    SchemaRecords,
};

fn course() -> EntityRecord {
    EntityRecord {
        table_name: "Course".into(),
        entity_type: EntityKind::Regular,
        parent_entity: None,
        attributes: vec![
            AttributeRecord::new("course_id", AttrType::Integer).primary_key(),
            AttributeRecord::new("title", AttrType::Varchar),
        ],
    }
}

fn prereq() -> RelationshipRecord {
    RelationshipRecord {
        table_name: "Prereq".into(),
        entity1: EndpointRecord::new("Course").with_role("course"),
        entity2: EndpointRecord::new("Course").with_role("prereq_course"),
        attributes: vec![],
    }
}

// ============================================================================
// Population
// ============================================================================

#[test]
fn test_from_records_json() {
    let json = r#"{
        "entities": [
            { "table_name": "Person", "entity_type": "REGULAR",
              "attributes": [
                { "attr_name": "person_id", "attr_type": "INT", "is_primary_key": true },
                { "attr_name": "name", "attr_type": "COMPOSITE", "sub_attributes": [
                    { "attr_name": "first", "attr_type": "VARCHAR" },
                    { "attr_name": "last", "attr_type": "VARCHAR" }
                ] }
              ] },
            { "table_name": "Instructor", "entity_type": "SUBCLASS", "parent_entity": "Person",
              "attributes": [ { "attr_name": "rank", "attr_type": "VARCHAR" } ] }
        ]
    }"#;

    let graph = ErGraph::from_records(&SchemaRecords::from_json(json).unwrap()).unwrap();

    // 2 entities, 5 attributes
    assert_eq!(graph.node_count(), 7);
    let instructor = graph.entity("Instructor").unwrap();
    assert!(instructor.is_subclass());
    assert_eq!(instructor.parent.as_deref(), Some("person"));

    let edges = graph.edges();
    assert!(edges.iter().any(|e| e.kind == EdgeKind::EntityEntity
        && e.source == "instructor"
        && e.target == "person"));
    assert!(edges.iter().any(|e| e.kind == EdgeKind::AttributeAttribute
        && e.source == "person.name"
        && e.target == "person.name.last"));
}

#[test]
fn test_lookup_is_case_insensitive() {
    let mut graph = ErGraph::new();
    graph.add_entity(&course()).unwrap();

    let node = graph.get_node_by_name("COURSE.Title").unwrap();
    assert_eq!(node.node_type(), NodeType::Attribute);
    assert_eq!(node.name(), "title");
    assert!(graph.contains("Course"));
}

#[test]
fn test_duplicate_entity_rejected() {
    let mut graph = ErGraph::new();
    graph.add_entity(&course()).unwrap();

    let err = graph.add_entity(&course()).unwrap_err();
    assert_eq!(err, GraphError::DuplicateNode("course".into()));
}

#[test]
fn test_parent_must_exist() {
    let mut graph = ErGraph::new();
    let section = EntityRecord {
        table_name: "Section".into(),
        entity_type: EntityKind::Weak,
        parent_entity: Some("Course".into()),
        attributes: vec![AttributeRecord::new("semester", AttrType::Varchar)],
    };

    assert_eq!(
        graph.add_entity(&section),
        Err(GraphError::NotFound("course".into()))
    );
}

#[test]
fn test_weak_entity_without_parent_rejected() {
    let mut graph = ErGraph::new();
    let orphan = EntityRecord {
        table_name: "Section".into(),
        entity_type: EntityKind::Weak,
        parent_entity: None,
        attributes: vec![AttributeRecord::new("semester", AttrType::Varchar)],
    };

    assert!(matches!(
        graph.add_entity(&orphan),
        Err(GraphError::InvalidState { ref node, .. }) if node == "section"
    ));
}

// ============================================================================
// Relationships
// ============================================================================

#[test]
fn test_recursive_relationship_keeps_roles() {
    let mut graph = ErGraph::new();
    graph.add_entity(&course()).unwrap();
    graph.add_relationship(&prereq()).unwrap();

    let rel = graph.relationship("prereq").unwrap();
    assert!(rel.is_recursive());
    assert_eq!(
        rel.roles,
        Some(("course".to_string(), "prereq_course".to_string()))
    );

    let (e1, e2) = graph.relationship_endpoints("prereq").unwrap();
    assert_eq!(e1.unique_name, "course");
    assert_eq!(e2.unique_name, "course");
}

#[test]
fn test_single_role_rejected() {
    let mut graph = ErGraph::new();
    graph.add_entity(&course()).unwrap();

    let mut rel = prereq();
    rel.entity2.role = None;
    assert!(matches!(
        graph.add_relationship(&rel),
        Err(GraphError::InvalidState { ref node, .. }) if node == "prereq"
    ));
}

#[test]
fn test_neighbors_include_both_directions() {
    let mut graph = ErGraph::new();
    graph.add_entity(&course()).unwrap();
    graph.add_relationship(&prereq()).unwrap();

    let names: Vec<&str> = graph
        .get_neighbors("course")
        .unwrap()
        .into_iter()
        .map(GraphNode::unique_name)
        .collect();

    // Own attributes first, then the relationship once per endpoint edge.
    assert_eq!(
        names,
        vec!["course.course_id", "course.title", "prereq", "prereq"]
    );
}

#[test]
fn test_relationship_attributes_belong_to_relationship() {
    let mut graph = ErGraph::new();
    graph.add_entity(&course()).unwrap();
    let mut rel = prereq();
    rel.attributes
        .push(AttributeRecord::new("since", AttrType::Other("DATE".into())));
    graph.add_relationship(&rel).unwrap();

    let since = graph.attribute("prereq.since").unwrap();
    assert_eq!(since.owner, "prereq");
    assert!(graph.entity("course").unwrap().attributes.len() == 2);
    assert_eq!(graph.top_level_attributes("prereq").unwrap().len(), 1);
}
