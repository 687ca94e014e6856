//! Tests for writing a compiled graph out and reloading it.

use ermap::compile::{compile_json, load, CompileOptions, CompiledGraph};
use ermap::layout::SubclassPlacement;
use ermap::persist::PersistError;

const SCHEMA: &str = include_str!("../fixtures/university.json");
const GROUPINGS: &str = include_str!("../fixtures/university_groupings.json");

#[test]
fn test_compiled_graph_survives_reload() {
    let output = compile_json(SCHEMA, GROUPINGS, &CompileOptions::default()).unwrap();

    let json = output.compiled.to_json().unwrap();
    let reloaded = CompiledGraph::from_json(&json).unwrap();

    assert_eq!(reloaded, output.compiled);
    assert_eq!(
        reloaded.layout.subclass_placement("student"),
        Some(SubclassPlacement::PartiallyByItself)
    );
    assert_eq!(reloaded.ownership.tables_of("student"), ["rel0", "rel1", "rel2"]);
    assert_eq!(
        reloaded.graph.node_count(),
        output.compiled.graph.node_count()
    );
    assert_eq!(
        reloaded.graph.edge_count(),
        output.compiled.graph.edge_count()
    );
}

#[test]
fn test_reloaded_outputs_give_same_queries() {
    let options = CompileOptions::default();
    let output = compile_json(SCHEMA, GROUPINGS, &options).unwrap();

    let graph_json = output.compiled.to_json().unwrap();
    let tables_json = output.schema.to_json().unwrap();
    let reloaded = load(&graph_json, &tables_json, &options).unwrap();

    assert_eq!(reloaded.schema, output.schema);
    assert_eq!(reloaded.ddl(), output.ddl());
    assert_eq!(reloaded.queries().unwrap(), output.queries().unwrap());
}

#[test]
fn test_annotations_attached_to_nodes() {
    let output = compile_json(SCHEMA, GROUPINGS, &CompileOptions::default()).unwrap();
    let json = output.compiled.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let section = value["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["unique_name"] == "section")
        .unwrap();
    assert_eq!(section["node_type"], "ENTITY");
    assert_eq!(section["layout"]["kind"], "weak");
    assert_eq!(section["layout"]["all_by_itself"], true);
    assert_eq!(section["tables"], serde_json::json!(["rel4"]));
    assert_eq!(section["structure"][0]["attr_name"], "course_id");
}

#[test]
fn test_truncated_graph_rejected() {
    let result = CompiledGraph::from_json(r#"{ "nodes": ["#);
    assert!(matches!(result, Err(PersistError::Json(_))));
}
