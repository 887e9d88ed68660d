//! Finalization from the intermediate state to the full state.
//!
//! Seeds the full state with the named top-level objects, walks the
//! operation roots to hoist every inline object, union and enum reference,
//! assigns unique record names to anonymous objects from their paths, and
//! deduplicates enums and unions.

use std::collections::HashSet;

use crate::typegen::error::TypegenError;
use crate::typegen::ir::model::{
    FinalizedObject, FullState, IntermediateState, ObjectProp, ObjectShape, PropType,
    PropValue, Union,
};
use crate::typegen::ir::utils::{find_appropriate_obj_name, path_to_name, uncapitalize_first};

/// Transform the intermediate state into a finalized one.
pub fn intermediate_to_full(
    intermediate: IntermediateState,
) -> Result<FullState, TypegenError> {
    let mut state = FullState {
        enums: intermediate.enums,
        unions: Vec::new(),
        objects: intermediate
            .objects
            .into_iter()
            .map(|obj| FinalizedObject {
                record_name: obj
                    .original_type_name
                    .as_deref()
                    .map(uncapitalize_first),
                original_type_name: obj.original_type_name,
                at_path: vec!["root".to_string()],
                definition: obj.definition,
                found_in_union: obj.found_in_union,
            })
            .collect(),
        variables: intermediate.variables,
        response: intermediate.response,
        fragment: intermediate.fragment,
    };

    // Walk the roots in a fixed order so record insertion order (and with
    // it the emitted declaration order) is stable.
    let roots: Vec<ObjectShape> = [
        state.variables.clone(),
        state.response.clone(),
        state.fragment.as_ref().map(|fragment| fragment.definition.clone()),
    ]
    .into_iter()
    .flatten()
    .collect();
    for root in &roots {
        traverse_shape(&mut state, root, false);
    }

    assign_record_names(&mut state)?;
    dedupe_enums(&mut state);
    dedupe_unions(&mut state)?;

    Ok(state)
}

/// Record every enum, union and inline object reachable from `shape`.
/// Union members recurse with `found_in_union` set.
fn traverse_shape(state: &mut FullState, shape: &ObjectShape, found_in_union: bool) {
    for prop in &shape.values {
        if let ObjectProp::Prop { value, .. } = prop {
            visit_value(state, value, found_in_union);
        }
    }
}

fn visit_value(state: &mut FullState, value: &PropValue, found_in_union: bool) {
    match &value.prop_type {
        PropType::Enum(full_enum) => state.enums.push(full_enum.clone()),
        PropType::Array(element) => visit_value(state, element, found_in_union),
        PropType::Object(shape) => {
            state.objects.push(FinalizedObject {
                original_type_name: None,
                record_name: None,
                at_path: shape.at_path.clone(),
                definition: shape.clone(),
                found_in_union,
            });
            traverse_shape(state, shape, found_in_union);
        }
        PropType::Union(union) => {
            state.unions.push(union.clone());
            for member in &union.members {
                state.objects.push(FinalizedObject {
                    original_type_name: None,
                    record_name: None,
                    at_path: member.shape.at_path.clone(),
                    definition: member.shape.clone(),
                    found_in_union: true,
                });
                traverse_shape(state, &member.shape, true);
            }
        }
        PropType::Scalar(_)
        | PropType::TypeReference(_)
        | PropType::FragmentRefValue(_) => {}
    }
}

/// Synthesize a unique record name for every object that has none yet.
fn assign_record_names(state: &mut FullState) -> Result<(), TypegenError> {
    let mut used: HashSet<String> = state
        .objects
        .iter()
        .filter_map(|obj| obj.record_name.clone())
        .collect();
    for obj in &mut state.objects {
        if obj.record_name.is_none() {
            obj.record_name = Some(find_appropriate_obj_name(&mut used, &obj.at_path)?);
        }
    }
    Ok(())
}

/// Enum names are globally unique; the first occurrence wins.
fn dedupe_enums(state: &mut FullState) {
    let mut seen = HashSet::new();
    state.enums.retain(|full_enum| seen.insert(full_enum.name.clone()));
}

/// Union identity is the path-derived name; the first occurrence wins.
fn dedupe_unions(state: &mut FullState) -> Result<(), TypegenError> {
    let mut seen = HashSet::new();
    let mut deduped: Vec<Union> = Vec::new();
    for union in state.unions.drain(..) {
        if seen.insert(path_to_name(&union.at_path)?) {
            deduped.push(union);
        }
    }
    state.unions = deduped;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::flow::parse;
    use crate::typegen::ir::extract::extract_intermediate;
    use crate::typegen::ir::model::OperationType;

    fn finalize(content: &str, operation: &OperationType) -> FullState {
        let outcome = parse(content);
        assert!(outcome.errors.is_empty(), "errors: {:?}", outcome.errors);
        let intermediate = extract_intermediate(&outcome.program, operation)
            .unwrap_or_else(|err| panic!("extraction failed: {err}"));
        intermediate_to_full(intermediate)
            .unwrap_or_else(|err| panic!("finalization failed: {err}"))
    }

    fn query(name: &str) -> OperationType {
        OperationType::Query {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_nested_objects_get_path_names_in_insertion_order() {
        let content = r#"
export type AppQueryResponse = {|
  +viewer: ?{|
    +todos: ?{| +count: number |}
  |}
|};
"#;
        let state = finalize(content, &query("AppQuery"));
        let names: Vec<_> = state
            .objects
            .iter()
            .filter_map(|obj| obj.record_name.as_deref())
            .collect();
        // Parents are inserted before their children; the emitter reverses.
        assert_eq!(names, vec!["response_viewer", "response_viewer_todos"]);
        assert!(state.objects.iter().all(|obj| !obj.found_in_union));
    }

    #[test]
    fn test_named_objects_seed_record_names() {
        let content = r#"
export type UpdateTodoInput = {| id: string |};
export type MQueryVariables = {| input: UpdateTodoInput |};
"#;
        let state = finalize(content, &query("MQuery"));
        let seeded = state.object_by_original_name("UpdateTodoInput");
        assert_eq!(
            seeded.and_then(|obj| obj.record_name.as_deref()),
            Some("updateTodoInput")
        );
        assert_eq!(
            seeded.map(|obj| obj.at_path.clone()),
            Some(vec!["root".to_string()])
        );
    }

    #[test]
    fn test_union_members_marked_found_in_union() {
        let content = r#"
export type UQueryResponse = {|
  +node: ?({| +__typename: "A", +sub: ?{| +x: string |} |} | {| +__typename: "B", +b: number |})
|};
"#;
        let state = finalize(content, &query("UQuery"));
        assert_eq!(state.unions.len(), 1);
        let in_union: Vec<_> = state
            .objects
            .iter()
            .filter(|obj| obj.found_in_union)
            .filter_map(|obj| obj.record_name.as_deref())
            .collect();
        assert_eq!(
            in_union,
            vec!["response_node_a", "response_node_a_sub", "response_node_b"]
        );
    }

    #[test]
    fn test_enums_deduplicate_first_wins() {
        let content = r#"
export type Status = "ACTIVE" | "INACTIVE";
export type SQueryResponse = {| +a: Status, +b: Status |};
"#;
        let state = finalize(content, &query("SQuery"));
        assert_eq!(state.enums.len(), 1);
        assert_eq!(state.enums[0].values, vec!["ACTIVE", "INACTIVE"]);
    }

    #[test]
    fn test_colliding_paths_get_numeric_suffixes() {
        // Two anonymous objects whose paths derive the same base name can
        // only collide through a named sibling; force it with a top-level
        // alias that takes the path-derived name first.
        let content = r#"
export type Response_me = {| id: string |};
export type RQueryResponse = {| +me: ?{| +name: string |} |};
"#;
        let state = finalize(content, &query("RQuery"));
        let names: Vec<_> = state
            .objects
            .iter()
            .filter_map(|obj| obj.record_name.as_deref())
            .collect();
        assert!(names.contains(&"response_me"));
        assert!(names.contains(&"response_me_2"));
    }
}
