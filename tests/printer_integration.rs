//! Integration tests for the public printing API: determinism, alias
//! permutation stability, and payload deserialization.

use relgen::{print_from_flow_types, ConnectionConfig, OperationType, PrintConfig};

const QUERY_CONTENT: &str = r#"
export type Status = "ACTIVE" | "INACTIVE" | "%future added value";
export type UpdateTodoInput = {| id: string, complete?: ?boolean |};
export type TodoAppQueryVariables = {|
  status?: ?Status,
  input: UpdateTodoInput,
|};
export type TodoAppQueryResponse = {|
  +viewer: ?{|
    +todos: ?{|
      +edges: ?$ReadOnlyArray<?{|
        +node: ?{| +id: string, +status: Status |}
      |}>
    |}
  |}
|};
export type TodoAppQuery = {|
  variables: TodoAppQueryVariables,
  response: TodoAppQueryResponse,
|};
"#;

fn query(name: &str) -> OperationType {
    OperationType::Query {
        name: name.to_string(),
    }
}

#[test]
fn test_output_is_deterministic() {
    let operation = query("TodoAppQuery");
    let config = PrintConfig::default();
    let first = print_from_flow_types(QUERY_CONTENT, &operation, &config);
    let second = print_from_flow_types(QUERY_CONTENT, &operation, &config);
    assert!(first.is_ok());
    assert_eq!(first.ok(), second.ok());
}

#[test]
fn test_alias_permutation_keeps_the_same_declarations() {
    // The same aliases in a different top-level order.
    let permuted = r#"
export type TodoAppQueryResponse = {|
  +viewer: ?{|
    +todos: ?{|
      +edges: ?$ReadOnlyArray<?{|
        +node: ?{| +id: string, +status: Status |}
      |}>
    |}
  |}
|};
export type TodoAppQuery = {|
  variables: TodoAppQueryVariables,
  response: TodoAppQueryResponse,
|};
export type UpdateTodoInput = {| id: string, complete?: ?boolean |};
export type TodoAppQueryVariables = {|
  status?: ?Status,
  input: UpdateTodoInput,
|};
export type Status = "ACTIVE" | "INACTIVE" | "%future added value";
"#;
    let operation = query("TodoAppQuery");
    let config = PrintConfig::default();
    let original = print_from_flow_types(QUERY_CONTENT, &operation, &config)
        .unwrap_or_default();
    let reordered = print_from_flow_types(permuted, &operation, &config).unwrap_or_default();

    // Declaration order may differ, the declared set may not.
    for declaration in [
        "type enum_Status = [",
        "type updateTodoInput = {",
        "type response_viewer = {",
        "type response_viewer_todos = {",
        "type response_viewer_todos_edges = {",
        "type response_viewer_todos_edges_node = {",
        "type variables = {",
        "type refetchVariables = {",
        "type response = {",
    ] {
        assert!(original.contains(declaration), "original missing {declaration}");
        assert!(reordered.contains(declaration), "reordered missing {declaration}");
    }
}

#[test]
fn test_connection_config_round_trips_through_payload_json() {
    let payload_config = r#"
{
  "connection": {
    "atObjectPath": ["edges", "todos", "viewer"],
    "fieldName": "todos"
  }
}
"#;
    let config: PrintConfig = match serde_json::from_str(payload_config) {
        Ok(config) => config,
        Err(err) => panic!("config failed to parse: {err}"),
    };
    let connection = config.connection.as_ref();
    assert_eq!(
        connection.map(|c| c.field_name.as_str()),
        Some("todos")
    );

    let output =
        print_from_flow_types(QUERY_CONTENT, &query("TodoAppQuery"), &config)
            .unwrap_or_default();
    assert!(
        output.contains("getConnectionNodes"),
        "connection helper missing:\n{output}"
    );
}

#[test]
fn test_operation_type_payload_forms() {
    let fragment: Result<OperationType, _> =
        serde_json::from_str(r#"{"operation": "fragment", "name": "Foo", "plural": true}"#);
    assert_eq!(
        fragment.ok(),
        Some(OperationType::Fragment {
            name: "Foo".to_string(),
            plural: true
        })
    );
    let mutation: Result<OperationType, _> =
        serde_json::from_str(r#"{"operation": "mutation", "name": "M"}"#);
    assert_eq!(
        mutation.ok(),
        Some(OperationType::Mutation {
            name: "M".to_string()
        })
    );
}

#[test]
fn test_unused_connection_config_changes_nothing_else() {
    let operation = query("TodoAppQuery");
    let without = print_from_flow_types(QUERY_CONTENT, &operation, &PrintConfig::default())
        .unwrap_or_default();
    let config = PrintConfig {
        connection: Some(ConnectionConfig {
            at_object_path: vec!["edges".to_string(), "missing".to_string()],
            field_name: "missing".to_string(),
        }),
    };
    let with_unmatched =
        print_from_flow_types(QUERY_CONTENT, &operation, &config).unwrap_or_default();
    assert_eq!(without, with_unmatched);
}
