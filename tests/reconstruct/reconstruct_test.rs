//! Tests for reconstruction query generation.
//!
//! Every query is built through the full pipeline and parsed back with
//! sqlparser before it is compared.

use ermap::compile::{compile, CompileOptions, CompileOutput};
use ermap::reconstruct::{reconstruct_node, ReconstructError};
use ermap::records::{
    AttrType, AttributeRecord, EndpointRecord, EntityKind, EntityRecord, Grouping,
    RelationshipRecord, SchemaRecords,
};
use ermap::sql::Dialect;

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

fn instructor() -> EntityRecord {
    EntityRecord {
        table_name: "Instructor".into(),
        entity_type: EntityKind::Subclass,
        parent_entity: Some("Person".into()),
        attributes: vec![AttributeRecord::new("rank", AttrType::Varchar)],
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

fn build(records: SchemaRecords, raw: &[&[&str]], dialect: Dialect) -> CompileOutput {
    let groupings: Vec<Grouping> = raw.iter().map(|g| Grouping::new(g.iter())).collect();
    compile(
        &records,
        &groupings,
        &CompileOptions::default().with_dialect(dialect),
    )
    .unwrap()
}

fn query(output: &CompileOutput, node: &str) -> String {
    output.queries().unwrap()[node].clone()
}

// ============================================================================
// Multivalued attributes
// ============================================================================

#[test]
fn test_inline_array_selected_directly() {
    let output = build(
        SchemaRecords {
            entities: vec![person()],
            relationships: vec![],
        },
        &[&["person", "person.person_id", "person.name", "person.phone_numbers"]],
        Dialect::Postgres,
    );

    insta::assert_snapshot!(query(&output, "person"), @r#"
    SELECT
      "rel0"."person_id" AS "person_id",
      "rel0"."name" AS "name",
      "rel0"."phone_numbers" AS "phone_numbers"
    FROM "rel0"
    "#);
}

#[test]
fn test_normalized_multivalued_is_aggregated() {
    let output = build(
        SchemaRecords {
            entities: vec![person()],
            relationships: vec![],
        },
        &[
            &["person", "person.person_id", "person.name"],
            &["person", "person.phone_numbers"],
        ],
        Dialect::Postgres,
    );

    assert_eq!(output.schema.tables[1].columns.len(), 2);
    insta::assert_snapshot!(query(&output, "person"), @r#"
    SELECT
      "rel0"."person_id" AS "person_id",
      "rel0"."name" AS "name",
      ARRAY_AGG("rel1"."phone_numbers") AS "phone_numbers"
    FROM "rel0"
    INNER JOIN "rel1" ON "rel0"."person_id" = "rel1"."person_id"
    GROUP BY "rel0"."person_id", "rel0"."name"
    "#);
}

#[test]
fn test_duckdb_aggregates_with_list() {
    let output = build(
        SchemaRecords {
            entities: vec![person()],
            relationships: vec![],
        },
        &[
            &["person", "person.person_id", "person.name"],
            &["person", "person.phone_numbers"],
        ],
        Dialect::DuckDb,
    );

    let sql = query(&output, "person");
    assert!(sql.contains("LIST(\"rel1\".\"phone_numbers\") AS \"phone_numbers\""));
    assert!(sql.contains("GROUP BY"));
}

// ============================================================================
// Subclasses
// ============================================================================

#[test]
fn test_partially_by_itself_subclass_joins_parent_table() {
    let output = build(
        SchemaRecords {
            entities: vec![person(), instructor()],
            relationships: vec![],
        },
        &[
            &["person", "person.name", "person.phone_numbers"],
            &["instructor", "person", "instructor.rank"],
        ],
        Dialect::Postgres,
    );

    insta::assert_snapshot!(query(&output, "instructor"), @r#"
    SELECT
      "rel0"."person_id" AS "person_id",
      "rel0"."name" AS "name",
      "rel0"."phone_numbers" AS "phone_numbers",
      "rel1"."rank" AS "rank"
    FROM "rel0"
    INNER JOIN "rel1" ON "rel0"."person_id" = "rel1"."person_id"
    "#);
}

#[test]
fn test_contained_in_parent_subclass_reads_one_table() {
    let output = build(
        SchemaRecords {
            entities: vec![person(), instructor()],
            relationships: vec![],
        },
        &[&[
            "person",
            "person.name",
            "person.phone_numbers",
            "instructor",
            "instructor.rank",
        ]],
        Dialect::Postgres,
    );

    insta::assert_snapshot!(query(&output, "instructor"), @r#"
    SELECT
      "rel0"."person_id" AS "person_id",
      "rel0"."name" AS "name",
      "rel0"."phone_numbers" AS "phone_numbers",
      "rel0"."rank" AS "rank"
    FROM "rel0"
    "#);
}

#[test]
fn test_all_by_itself_subclass_uses_own_key() {
    let output = build(
        SchemaRecords {
            entities: vec![person(), instructor()],
            relationships: vec![],
        },
        &[
            &["person", "person.name", "person.phone_numbers"],
            &[
                "instructor",
                "person.name",
                "person.phone_numbers",
                "instructor.rank",
            ],
        ],
        Dialect::Postgres,
    );

    insta::assert_snapshot!(query(&output, "instructor"), @r#"
    SELECT
      "rel1"."instructor_id" AS "instructor_id",
      "rel1"."name" AS "name",
      "rel1"."phone_numbers" AS "phone_numbers",
      "rel1"."rank" AS "rank"
    FROM "rel1"
    "#);
}

// ============================================================================
// Relationships
// ============================================================================

#[test]
fn test_recursive_relationship_selects_both_role_keys() {
    let output = build(
        SchemaRecords {
            entities: vec![course()],
            relationships: vec![RelationshipRecord {
                table_name: "Prereq".into(),
                entity1: EndpointRecord::new("Course").with_role("course"),
                entity2: EndpointRecord::new("Course").with_role("prereq_course"),
                attributes: vec![],
            }],
        },
        &[&["course", "course.title"], &["prereq", "course", "course"]],
        Dialect::Postgres,
    );

    insta::assert_snapshot!(query(&output, "prereq"), @r#"
    SELECT
      "rel1"."course_id" AS "course_id",
      "rel1"."prereq_course_id" AS "prereq_course_id"
    FROM "rel1"
    "#);
}

#[test]
fn test_relationship_with_attributes() {
    let output = build(
        SchemaRecords {
            entities: vec![person(), course()],
            relationships: vec![RelationshipRecord {
                table_name: "Teaches".into(),
                entity1: EndpointRecord::new("Person"),
                entity2: EndpointRecord::new("Course"),
                attributes: vec![AttributeRecord::new("semester", AttrType::Varchar)],
            }],
        },
        &[
            &["person", "person.name", "person.phone_numbers"],
            &["course", "course.title"],
            &["teaches", "person", "course", "teaches.semester"],
        ],
        Dialect::Postgres,
    );

    insta::assert_snapshot!(query(&output, "teaches"), @r#"
    SELECT
      "rel2"."person_id" AS "person_id",
      "rel2"."course_id" AS "course_id",
      "rel2"."semester" AS "semester"
    FROM "rel2"
    "#);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_unknown_node() {
    let output = build(
        SchemaRecords {
            entities: vec![course()],
            relationships: vec![],
        },
        &[&["course", "course.title"]],
        Dialect::Postgres,
    );

    let err = reconstruct_node(&output.compiled, &output.schema, "ghost").unwrap_err();
    assert_eq!(err, ReconstructError::UnknownNode("ghost".into()));
}

#[test]
fn test_entity_owning_no_tables() {
    // Only the key column is materialized, which confers no ownership.
    let output = build(
        SchemaRecords {
            entities: vec![course()],
            relationships: vec![],
        },
        &[&["course", "course.course_id"]],
        Dialect::Postgres,
    );

    let err = reconstruct_node(&output.compiled, &output.schema, "course").unwrap_err();
    assert_eq!(err, ReconstructError::NoOwningTables("course".into()));
}
