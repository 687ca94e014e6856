//! Tests for physical table and composite type synthesis.

use ermap::config::NamingSettings;
use ermap::graph::ErGraph;
use ermap::layout::classify;
use ermap::records::{
    AttrType, AttributeRecord, EndpointRecord, EntityKind, EntityRecord, Grouping,
    RelationshipRecord,
};
use ermap::sql::{validate_sql, Dialect, SqlType};
use ermap::synth::{synthesize, ColumnForm, PhysicalSchema, SynthError};

fn person() -> EntityRecord {
    EntityRecord {
        table_name: "Person".into(),
        entity_type: EntityKind::Regular,
        parent_entity: None,
        attributes: vec![
            AttributeRecord::new("person_id", AttrType::Integer).primary_key(),
            AttributeRecord::new("name", AttrType::Varchar),
            AttributeRecord::new("phone_numbers", AttrType::Varchar).multivalued(),
        ],
    }
}

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

fn run(graph: &ErGraph, raw: &[&[&str]]) -> Result<PhysicalSchema, SynthError> {
    let groupings: Vec<Grouping> = raw.iter().map(|g| Grouping::new(g.iter())).collect();
    let layout = classify(graph, &groupings).unwrap();
    synthesize(graph, &layout, &groupings, &NamingSettings::default())
}

fn column_names(schema: &PhysicalSchema, table: usize) -> Vec<&str> {
    schema.tables[table]
        .columns
        .iter()
        .map(|c| c.name.as_str())
        .collect()
}

// ============================================================================
// Entity tables
// ============================================================================

#[test]
fn test_entity_alone_in_one_grouping() {
    let mut graph = ErGraph::new();
    graph.add_entity(&person()).unwrap();

    let schema = run(
        &graph,
        &[&["person", "person.person_id", "person.name", "person.phone_numbers"]],
    )
    .unwrap();

    assert_eq!(schema.tables.len(), 1);
    assert_eq!(schema.tables[0].name, "rel0");
    assert!(schema.tables[0].columns[0].form.is_key());
    assert_eq!(schema.tables[0].columns[2].form, ColumnForm::Array);

    let ddl = schema.to_ddl(Dialect::Postgres);
    insta::assert_snapshot!(ddl, @r#"
    CREATE TABLE "rel0" (
      "person_id" INTEGER,
      "name" VARCHAR(255),
      "phone_numbers" VARCHAR(255)[]
    );
    "#);
    validate_sql(&ddl, Dialect::Postgres).unwrap();
}

#[test]
fn test_multivalued_attribute_alone_is_normalized() {
    let mut graph = ErGraph::new();
    graph.add_entity(&person()).unwrap();

    let schema = run(
        &graph,
        &[
            &["person", "person.person_id", "person.name"],
            &["person", "person.phone_numbers"],
        ],
    )
    .unwrap();

    assert_eq!(column_names(&schema, 0), vec!["person_id", "name"]);
    assert_eq!(column_names(&schema, 1), vec!["person_id", "phone_numbers"]);

    let phone = &schema.tables[1].columns[1];
    assert_eq!(phone.form, ColumnForm::Normalized);
    assert_eq!(phone.sql_type, SqlType::Varchar(255));
    assert_eq!(phone.source, "person.phone_numbers");
}

#[test]
fn test_other_attribute_types_become_text() {
    let mut graph = ErGraph::new();
    let mut record = person();
    record
        .attributes
        .push(AttributeRecord::new("born", AttrType::Other("DATE".into())));
    graph.add_entity(&record).unwrap();

    let schema = run(&graph, &[&["person", "person.born"]]).unwrap();
    assert_eq!(schema.tables[0].columns[1].sql_type, SqlType::Text);
}

// ============================================================================
// Subclasses
// ============================================================================

#[test]
fn test_contained_in_parent_subclass_gets_no_key() {
    let mut graph = ErGraph::new();
    graph.add_entity(&person()).unwrap();
    graph
        .add_entity(&EntityRecord {
            table_name: "Instructor".into(),
            entity_type: EntityKind::Subclass,
            parent_entity: Some("Person".into()),
            attributes: vec![AttributeRecord::new("rank", AttrType::Varchar)],
        })
        .unwrap();

    let schema = run(
        &graph,
        &[&["person", "person.person_id", "person.name", "instructor", "instructor.rank"]],
    )
    .unwrap();

    let names = column_names(&schema, 0);
    assert_eq!(names, vec!["person_id", "name", "rank"]);
    assert!(!names.contains(&"instructor_id"));
}

#[test]
fn test_all_by_itself_subclass_gets_own_key() {
    let mut graph = ErGraph::new();
    graph.add_entity(&person()).unwrap();
    graph
        .add_entity(&EntityRecord {
            table_name: "Instructor".into(),
            entity_type: EntityKind::Subclass,
            parent_entity: Some("Person".into()),
            attributes: vec![AttributeRecord::new("rank", AttrType::Varchar)],
        })
        .unwrap();

    let schema = run(
        &graph,
        &[
            &["person", "person.person_id", "person.name"],
            &["instructor", "instructor.rank", "person.name"],
        ],
    )
    .unwrap();

    assert_eq!(column_names(&schema, 1), vec!["instructor_id", "rank", "name"]);
}

// ============================================================================
// Self-relationships
// ============================================================================

#[test]
fn test_recursive_relationship_gets_two_role_keys() {
    let mut graph = ErGraph::new();
    graph.add_entity(&course()).unwrap();
    graph
        .add_relationship(&RelationshipRecord {
            table_name: "Prereq".into(),
            entity1: EndpointRecord::new("Course").with_role("course"),
            entity2: EndpointRecord::new("Course").with_role("prereq_course"),
            attributes: vec![],
        })
        .unwrap();

    let schema = run(
        &graph,
        &[&["course", "course.title"], &["prereq", "course", "course"]],
    )
    .unwrap();

    assert_eq!(column_names(&schema, 1), vec!["course_id", "prereq_course_id"]);
    assert!(schema.tables[1].columns.iter().all(|c| c.form.is_key()));
}

#[test]
fn test_recursive_relationship_without_roles_rejected() {
    let mut graph = ErGraph::new();
    graph.add_entity(&course()).unwrap();
    graph
        .add_relationship(&RelationshipRecord {
            table_name: "Prereq".into(),
            entity1: EndpointRecord::new("Course"),
            entity2: EndpointRecord::new("Course"),
            attributes: vec![],
        })
        .unwrap();

    let err = run(&graph, &[&["prereq", "course", "course"]]).unwrap_err();
    assert!(matches!(err, SynthError::InvalidState { grouping: 0, .. }));
}

#[test]
fn test_recursive_relationship_with_weak_endpoint_unsupported() {
    let mut graph = ErGraph::new();
    graph.add_entity(&course()).unwrap();
    graph
        .add_entity(&EntityRecord {
            table_name: "Section".into(),
            entity_type: EntityKind::Weak,
            parent_entity: Some("Course".into()),
            attributes: vec![AttributeRecord::new("semester", AttrType::Varchar)],
        })
        .unwrap();
    graph
        .add_relationship(&RelationshipRecord {
            table_name: "Follows".into(),
            entity1: EndpointRecord::new("Section").with_role("section"),
            entity2: EndpointRecord::new("Section").with_role("next_section"),
            attributes: vec![],
        })
        .unwrap();

    let err = run(
        &graph,
        &[
            &["section", "course", "section.semester"],
            &["follows", "section", "section"],
        ],
    )
    .unwrap_err();
    assert!(matches!(err, SynthError::Unsupported { grouping: 1, .. }));
}

// ============================================================================
// Composite types
// ============================================================================

#[test]
fn test_composite_column_and_type_ddl() {
    let mut graph = ErGraph::new();
    graph
        .add_entity(&EntityRecord {
            table_name: "Person".into(),
            entity_type: EntityKind::Regular,
            parent_entity: None,
            attributes: vec![
                AttributeRecord::new("person_id", AttrType::Integer).primary_key(),
                AttributeRecord::composite(
                    "name",
                    vec![
                        AttributeRecord::new("first", AttrType::Varchar),
                        AttributeRecord::new("last", AttrType::Varchar),
                    ],
                ),
            ],
        })
        .unwrap();

    let schema = run(&graph, &[&["person", "person.name"]]).unwrap();
    assert_eq!(schema.types.len(), 1);

    insta::assert_snapshot!(schema.to_ddl(Dialect::Postgres), @r#"
    CREATE TYPE "person_name_type" AS (
      "first" VARCHAR(255),
      "last" VARCHAR(255)
    );

    CREATE TABLE "rel0" (
      "person_id" INTEGER,
      "name" "person_name_type"
    );
    "#);

    let duckdb = schema.to_ddl(Dialect::DuckDb);
    assert!(duckdb.contains("AS STRUCT("));
}

#[test]
fn test_unknown_name_in_grouping_fails() {
    let mut graph = ErGraph::new();
    graph.add_entity(&person()).unwrap();

    let err = run(&graph, &[&["person", "person.age"]]).unwrap_err();
    assert!(matches!(err, SynthError::Graph(_)));
}
