//! Extraction from the Flow AST to the intermediate state.
//!
//! This module handles all the input-dialect logic:
//! - Classification of top-level aliases into operation roots, named
//!   objects and enums
//! - The recursive property mapper from AST type nodes to property values
//! - Union construction from `__typename`-discriminated object literals

use crate::flow::ast::{FlowProgram, FlowProperty, FlowType, TypeAlias};
use crate::typegen::error::TypegenError;
use crate::typegen::ir::model::{
    ExtractedObject, Fragment, FullEnum, IntermediateState, ObjectProp, ObjectShape,
    OperationType, PropType, PropValue, Scalar, Union, UnionMember,
};
use crate::typegen::ir::utils::{capitalize_first, strip_suffix, uncapitalize_first};

/// The placeholder literal the upstream compiler adds to every enum.
const FUTURE_ADDED_VALUE: &str = "%future added value";

/// The placeholder member name for unselected union members.
const OTHER_MEMBER: &str = "%other";

/// Extract the intermediate state from a parsed input file.
///
/// Enums are collected in a first pass over all aliases so that a
/// reference resolves no matter where the enum is declared; everything else
/// is classified in source order.
pub fn extract_intermediate(
    program: &FlowProgram,
    operation: &OperationType,
) -> Result<IntermediateState, TypegenError> {
    let mut state = IntermediateState {
        enums: program
            .aliases
            .iter()
            .filter_map(extract_enum)
            .collect::<Vec<_>>(),
        ..IntermediateState::default()
    };

    for alias in &program.aliases {
        if extract_enum(alias).is_some() {
            continue;
        }
        match operation {
            OperationType::Query { name }
            | OperationType::Mutation { name }
            | OperationType::Subscription { name } => {
                classify_operation_alias(&mut state, alias, name)?;
            }
            OperationType::Fragment { name, plural } => {
                classify_fragment_alias(&mut state, alias, name, *plural)?;
            }
        }
    }

    Ok(state)
}

/// A top-level union of string literals is an enum. `%future added value`
/// is dropped; duplicate literals collapse keeping input order.
fn extract_enum(alias: &TypeAlias) -> Option<FullEnum> {
    let FlowType::Union(members) = &alias.right else {
        return None;
    };
    let mut values: Vec<String> = Vec::new();
    for member in members {
        let FlowType::StringLiteral { value } = member else {
            return None;
        };
        if value != FUTURE_ADDED_VALUE && !values.contains(value) {
            values.push(value.clone());
        }
    }
    Some(FullEnum {
        name: alias.name.clone(),
        values,
    })
}

fn classify_operation_alias(
    state: &mut IntermediateState,
    alias: &TypeAlias,
    operation_name: &str,
) -> Result<(), TypegenError> {
    let FlowType::Object { properties } = &alias.right else {
        return Ok(());
    };

    if alias.name == operation_name {
        // The aggregate operation descriptor carries no type information
        // we need.
        return Ok(());
    }
    if alias.name == format!("{operation_name}Variables") {
        let path = vec!["variables".to_string()];
        state.variables = Some(make_obj_shape(properties, &path, &state.enums)?);
        return Ok(());
    }
    if alias.name == format!("{operation_name}Response") {
        let path = vec!["response".to_string()];
        state.response = Some(make_obj_shape(properties, &path, &state.enums)?);
        return Ok(());
    }

    let path = vec!["objects".to_string()];
    let definition = make_obj_shape(properties, &path, &state.enums)?;
    state.objects.push(ExtractedObject {
        original_type_name: Some(alias.name.clone()),
        found_in_union: false,
        definition,
    });
    Ok(())
}

fn classify_fragment_alias(
    state: &mut IntermediateState,
    alias: &TypeAlias,
    fragment_name: &str,
    plural: bool,
) -> Result<(), TypegenError> {
    if alias.name == fragment_name {
        if let Some(properties) = fragment_body_properties(&alias.right) {
            let path = vec!["fragment".to_string()];
            state.fragment = Some(Fragment {
                name: fragment_name.to_string(),
                plural,
                definition: make_obj_shape(properties, &path, &state.enums)?,
            });
            return Ok(());
        }
    }

    if !alias.name.contains('$') {
        if let FlowType::Object { properties } = &alias.right {
            let path = vec!["objects".to_string()];
            let definition = make_obj_shape(properties, &path, &state.enums)?;
            state.objects.push(ExtractedObject {
                original_type_name: Some(alias.name.clone()),
                found_in_union: false,
                definition,
            });
        }
    }
    Ok(())
}

/// A fragment body is either an object literal or `$ReadOnlyArray` of one
/// (the plural case).
fn fragment_body_properties(ty: &FlowType) -> Option<&Vec<FlowProperty>> {
    match ty {
        FlowType::Object { properties } => Some(properties),
        FlowType::Generic { name, type_args } if name == "$ReadOnlyArray" => {
            match type_args.first() {
                Some(FlowType::Object { properties }) => Some(properties),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Map one AST type node to a property value.
///
/// `optional` carries the nullability decided by the surrounding context
/// (an optional property marker or a `?T` wrapper).
pub fn map_obj_prop(
    optional: bool,
    enums: &[FullEnum],
    path: &[String],
    ty: &FlowType,
) -> Result<PropValue, TypegenError> {
    let value = match ty {
        FlowType::String | FlowType::StringLiteral { .. } => PropValue {
            nullable: optional,
            prop_type: PropType::Scalar(Scalar::String),
        },
        FlowType::Number | FlowType::NumberLiteral { .. } => PropValue {
            nullable: optional,
            prop_type: PropType::Scalar(Scalar::Float),
        },
        FlowType::Boolean | FlowType::BooleanLiteral { .. } => PropValue {
            nullable: optional,
            prop_type: PropType::Scalar(Scalar::Boolean),
        },
        FlowType::Nullable(inner) => map_obj_prop(true, enums, path, inner)?,
        FlowType::Array(element) => PropValue {
            nullable: optional,
            prop_type: PropType::Array(Box::new(map_obj_prop(false, enums, path, element)?)),
        },
        FlowType::Generic { name, type_args } if name == "$ReadOnlyArray" => {
            match type_args.first() {
                Some(element) => PropValue {
                    nullable: optional,
                    prop_type: PropType::Array(Box::new(map_obj_prop(
                        false, enums, path, element,
                    )?)),
                },
                None => PropValue {
                    nullable: optional,
                    prop_type: PropType::Scalar(Scalar::Any),
                },
            }
        }
        FlowType::Object { properties } => PropValue {
            nullable: optional,
            prop_type: PropType::Object(make_obj_shape(properties, path, enums)?),
        },
        FlowType::Union(members) if members.iter().all(FlowType::is_object) => PropValue {
            nullable: optional,
            prop_type: PropType::Union(make_union(members, path, enums)?),
        },
        FlowType::Generic { name, .. } => {
            match enums.iter().find(|known| known.name == *name) {
                Some(known) => PropValue {
                    nullable: optional,
                    prop_type: PropType::Enum(known.clone()),
                },
                None => PropValue {
                    nullable: optional,
                    prop_type: PropType::TypeReference(unmask_type_name(name)),
                },
            }
        }
        _ => PropValue {
            nullable: optional,
            prop_type: PropType::Scalar(Scalar::Any),
        },
    };
    Ok(value)
}

/// Type reference names pass through verbatim. Only the fragment reference
/// suffixes are ever stripped, and that happens where the reference is
/// recognized.
fn unmask_type_name(name: &str) -> String {
    name.to_string()
}

/// Build an object shape from a property list, keeping input order.
///
/// `$fragmentRefs` flattens into one `FragmentRef` per referenced generic;
/// any other `$`-prefixed key is dropped.
pub fn make_obj_shape(
    properties: &[FlowProperty],
    path: &[String],
    enums: &[FullEnum],
) -> Result<ObjectShape, TypegenError> {
    let mut values = Vec::new();
    for property in properties {
        if property.key == "$fragmentRefs" {
            for name in referenced_fragments(&property.value) {
                values.push(ObjectProp::FragmentRef {
                    fragment_name: name,
                });
            }
            continue;
        }
        if property.key.starts_with('$') {
            continue;
        }
        let mut child_path = Vec::with_capacity(path.len() + 1);
        child_path.push(property.key.clone());
        child_path.extend_from_slice(path);
        values.push(ObjectProp::Prop {
            name: property.key.clone(),
            value: map_obj_prop(property.optional, enums, &child_path, &property.value)?,
        });
    }
    Ok(ObjectShape {
        at_path: path.to_vec(),
        values,
    })
}

/// Collect fragment names from a `$fragmentRefs` initializer: a single
/// generic or an intersection of generics.
fn referenced_fragments(ty: &FlowType) -> Vec<String> {
    match ty {
        FlowType::Generic { name, .. } => vec![strip_suffix(name, "$ref").to_string()],
        FlowType::Intersection(members) => members
            .iter()
            .filter_map(|member| match member {
                FlowType::Generic { name, .. } => {
                    Some(strip_suffix(name, "$ref").to_string())
                }
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Build a union from two or more object-literal members.
///
/// Each member must carry a `__typename` string literal; its capitalized
/// value names the member. Members named `%other` are dropped.
pub fn make_union(
    members: &[FlowType],
    path: &[String],
    enums: &[FullEnum],
) -> Result<Union, TypegenError> {
    let mut union_members = Vec::new();
    for member in members {
        let FlowType::Object { properties } = member else {
            continue;
        };
        let typename = properties.iter().find_map(|property| {
            if property.key != "__typename" {
                return None;
            }
            match &property.value {
                FlowType::StringLiteral { value } => Some(value.clone()),
                _ => None,
            }
        });
        let Some(typename) = typename else {
            return Err(TypegenError::MissingTypenameOnUnion {
                path: display_path(path),
            });
        };
        if typename == OTHER_MEMBER {
            continue;
        }
        let name = capitalize_first(&typename);
        let rest: Vec<FlowProperty> = properties
            .iter()
            .filter(|property| property.key != "__typename")
            .cloned()
            .collect();
        let mut member_path = Vec::with_capacity(path.len() + 1);
        member_path.push(uncapitalize_first(&name));
        member_path.extend_from_slice(path);
        union_members.push(UnionMember {
            name,
            shape: make_obj_shape(&rest, &member_path, enums)?,
        });
    }
    Ok(Union {
        at_path: path.to_vec(),
        members: union_members,
    })
}

/// Render a leaf-first path root-first for diagnostics.
fn display_path(path: &[String]) -> String {
    let mut segments: Vec<&str> = path.iter().map(String::as_str).collect();
    segments.reverse();
    segments.join(".")
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::flow::parse;

    fn extract(content: &str, operation: &OperationType) -> IntermediateState {
        let outcome = parse(content);
        assert!(outcome.errors.is_empty(), "errors: {:?}", outcome.errors);
        extract_intermediate(&outcome.program, operation)
            .unwrap_or_else(|err| panic!("extraction failed: {err}"))
    }

    fn query(name: &str) -> OperationType {
        OperationType::Query {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_classifies_query_roots() {
        let content = r#"
export type AppQueryVariables = {| id: string |};
export type AppQueryResponse = {| +me: ?{| +name: string |} |};
export type AppQuery = {| variables: AppQueryVariables, response: AppQueryResponse |};
"#;
        let state = extract(content, &query("AppQuery"));
        assert!(state.variables.is_some());
        assert!(state.response.is_some());
        assert!(state.objects.is_empty());
        let variables = state.variables.as_ref();
        assert_eq!(
            variables.map(|shape| shape.at_path.clone()),
            Some(vec!["variables".to_string()])
        );
    }

    #[test]
    fn test_named_object_becomes_input_object() {
        let content = r#"
export type UpdateTodoInput = {| id: string, complete?: ?boolean |};
export type M = {| input: UpdateTodoInput |};
export type MutQueryVariables = {| input: UpdateTodoInput |};
"#;
        let state = extract(content, &query("MutQuery"));
        let names: Vec<_> = state
            .objects
            .iter()
            .filter_map(|obj| obj.original_type_name.as_deref())
            .collect();
        assert_eq!(names, vec!["UpdateTodoInput", "M"]);
        // The variables reference resolves to an opaque type reference.
        let variables = state.variables.clone();
        let Some(ObjectProp::Prop { value, .. }) =
            variables.and_then(|shape| shape.values.first().cloned())
        else {
            panic!("expected input prop");
        };
        assert_eq!(
            value.prop_type,
            PropType::TypeReference("UpdateTodoInput".to_string())
        );
    }

    #[test]
    fn test_enum_extraction_drops_future_value() {
        let content = r#"
export type Status = "ACTIVE" | "INACTIVE" | "%future added value";
export type SQueryResponse = {| +status: Status |};
"#;
        let state = extract(content, &query("SQuery"));
        assert_eq!(state.enums.len(), 1);
        assert_eq!(state.enums[0].name, "Status");
        assert_eq!(state.enums[0].values, vec!["ACTIVE", "INACTIVE"]);
    }

    #[test]
    fn test_enum_resolves_when_declared_after_reference() {
        let content = r#"
export type SQueryResponse = {| +status: Status |};
export type Status = "ACTIVE" | "INACTIVE";
"#;
        let state = extract(content, &query("SQuery"));
        let response = state.response.clone();
        let Some(ObjectProp::Prop { value, .. }) =
            response.and_then(|shape| shape.values.first().cloned())
        else {
            panic!("expected status prop");
        };
        assert!(matches!(value.prop_type, PropType::Enum(_)));
    }

    #[test]
    fn test_dollar_keys_discarded_and_fragment_refs_flattened() {
        let content = r#"
export type Foo = {|
  +$refType: Foo$ref,
  +$fragmentRefs: TodoItem_todo$ref & TodoList_list$ref,
  +id: string,
|};
"#;
        let operation = OperationType::Fragment {
            name: "Foo".to_string(),
            plural: false,
        };
        let state = extract(content, &operation);
        let fragment = state.fragment.as_ref();
        let values = fragment.map(|f| f.definition.values.clone());
        let Some(values) = values else {
            panic!("expected fragment");
        };
        assert_eq!(values.len(), 3);
        assert!(matches!(
            &values[0],
            ObjectProp::FragmentRef { fragment_name } if fragment_name == "TodoItem_todo"
        ));
        assert!(matches!(
            &values[1],
            ObjectProp::FragmentRef { fragment_name } if fragment_name == "TodoList_list"
        ));
        assert!(matches!(
            &values[2],
            ObjectProp::Prop { name, .. } if name == "id"
        ));
    }

    #[test]
    fn test_plural_fragment_unwraps_array_body() {
        let content = r#"
export type Items = $ReadOnlyArray<{| +id: string |}>;
"#;
        let operation = OperationType::Fragment {
            name: "Items".to_string(),
            plural: true,
        };
        let state = extract(content, &operation);
        let fragment = state.fragment.as_ref();
        assert_eq!(fragment.map(|f| f.plural), Some(true));
        assert_eq!(fragment.map(|f| f.definition.values.len()), Some(1));
    }

    #[test]
    fn test_union_members_and_other_dropped() {
        let content = r#"
export type UQueryResponse = {|
  +node: ?({| +__typename: "A", +a: string |} | {| +__typename: "B", +b: number |} | {| +__typename: "%other" |})
|};
"#;
        let state = extract(content, &query("UQuery"));
        let response = state.response.clone();
        let Some(ObjectProp::Prop { value, .. }) =
            response.and_then(|shape| shape.values.first().cloned())
        else {
            panic!("expected node prop");
        };
        let PropType::Union(union) = value.prop_type else {
            panic!("expected union");
        };
        assert_eq!(union.members.len(), 2);
        assert_eq!(union.members[0].name, "A");
        assert_eq!(union.members[1].name, "B");
        assert_eq!(
            union.members[0].shape.at_path,
            vec!["a".to_string(), "node".to_string(), "response".to_string()]
        );
        // `__typename` is not part of the member shape.
        assert_eq!(union.members[0].shape.values.len(), 1);
    }

    #[test]
    fn test_union_without_typename_is_an_error() {
        let content = r#"
export type UQueryResponse = {|
  +node: ?({| +a: string |} | {| +b: number |})
|};
"#;
        let outcome = parse(content);
        let result = extract_intermediate(&outcome.program, &query("UQuery"));
        assert!(matches!(
            result,
            Err(TypegenError::MissingTypenameOnUnion { path }) if path == "response.node"
        ));
    }

    #[test]
    fn test_scalar_mapping() {
        let content = r#"
export type SQueryVariables = {|
  a: string,
  b: number,
  c: boolean,
  d?: ?string,
  e: $ReadOnlyArray<?number>,
  f: SomeOpaque,
|};
"#;
        let state = extract(content, &query("SQuery"));
        let Some(shape) = state.variables else {
            panic!("expected variables");
        };
        let types: Vec<_> = shape
            .values
            .iter()
            .map(|prop| match prop {
                ObjectProp::Prop { value, .. } => (value.nullable, value.prop_type.clone()),
                ObjectProp::FragmentRef { .. } => panic!("unexpected fragment ref"),
            })
            .collect();
        assert_eq!(types[0], (false, PropType::Scalar(Scalar::String)));
        assert_eq!(types[1], (false, PropType::Scalar(Scalar::Float)));
        assert_eq!(types[2], (false, PropType::Scalar(Scalar::Boolean)));
        assert_eq!(types[3], (true, PropType::Scalar(Scalar::String)));
        let (nullable, PropType::Array(element)) = types[4].clone() else {
            panic!("expected array");
        };
        assert!(!nullable);
        assert!(element.nullable);
        assert_eq!(element.prop_type, PropType::Scalar(Scalar::Float));
        assert_eq!(
            types[5].1,
            PropType::TypeReference("SomeOpaque".to_string())
        );
    }
}
