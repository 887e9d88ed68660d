//! Reason code emission from the finalized state.
//!
//! Sections are printed in a fixed order: header, enums, the `Unions`
//! module, the `Types` module, root definitions, the `Internal` converter
//! assets, fragment-ref assets, the `Utils` module and the operation-type
//! trailer. Runtime names (`ReasonRelay.*`, `ReasonRelayUtils.*`) are
//! referenced, never implemented.

use crate::typegen::error::TypegenError;
use crate::typegen::ir::converters::{
    build_converter_assets, ConverterAssets, Direction, RawSentinel,
};
use crate::typegen::ir::model::{
    ConnectionConfig, FinalizedObject, Fragment, FullEnum, FullState, ObjectProp,
    ObjectShape, OperationType, PrintConfig, PropType, PropValue, Scalar, Union,
};
use crate::typegen::ir::utils::{
    capitalize_first, enum_type_name, path_to_name, print_record_key, uncapitalize_first,
};

/// Trait for emitting Reason code from nodes that need no surrounding
/// state.
pub trait Emit {
    /// Convert the node to its Reason string representation.
    fn emit(&self) -> String;
}

impl Emit for Scalar {
    fn emit(&self) -> String {
        match self {
            Scalar::String => "string".to_string(),
            Scalar::Float => "float".to_string(),
            Scalar::Boolean => "bool".to_string(),
            Scalar::Any => "ReasonRelay.any".to_string(),
        }
    }
}

impl Emit for FullEnum {
    /// One variant type plus the string conversion helpers.
    fn emit(&self) -> String {
        let type_name = enum_type_name(&self.name);
        let mut output = format!("type {type_name} = [\n");
        for value in &self.values {
            output.push_str(&format!("  | `{value}\n"));
        }
        output.push_str("  | `FutureAddedValue(string)\n];\n\n");

        output.push_str(&format!(
            "let unwrap_{type_name} = (v: string): {type_name} =>\n  switch (v) {{\n"
        ));
        for value in &self.values {
            output.push_str(&format!("  | \"{value}\" => `{value}\n"));
        }
        output.push_str("  | v => `FutureAddedValue(v)\n  };\n\n");

        output.push_str(&format!(
            "let wrap_{type_name} = (v: {type_name}): string =>\n  switch (v) {{\n"
        ));
        for value in &self.values {
            output.push_str(&format!("  | `{value} => \"{value}\"\n"));
        }
        output.push_str("  | `FutureAddedValue(v) => v\n  };\n");
        output
    }
}

impl Emit for OperationType {
    /// The operation-type descriptor constant trailing the output.
    fn emit(&self) -> String {
        match self {
            OperationType::Fragment { name, plural } => {
                format!("let operationType = ReasonRelay.Fragment(\"{name}\", {plural});\n")
            }
            OperationType::Query { name } => {
                format!("let operationType = ReasonRelay.Query(\"{name}\");\n")
            }
            OperationType::Mutation { name } => {
                format!("let operationType = ReasonRelay.Mutation(\"{name}\");\n")
            }
            OperationType::Subscription { name } => {
                format!("let operationType = ReasonRelay.Subscription(\"{name}\");\n")
            }
        }
    }
}

/// Emit the whole generated file.
pub fn print_full_state(
    state: &FullState,
    operation: &OperationType,
    config: &PrintConfig,
) -> Result<String, TypegenError> {
    if state.variables.is_none() && state.response.is_none() && state.fragment.is_none() {
        return Err(TypegenError::NoExtractableOperationsFound);
    }

    let mut output = String::from("/* @generated */\n");

    for full_enum in &state.enums {
        output.push('\n');
        output.push_str(&full_enum.emit());
    }

    if !state.unions.is_empty() {
        output.push('\n');
        output.push_str(&print_unions_module(state)?);
        output.push_str("\nopen Unions;\n");
    }

    // Object declarations in reverse insertion order, then the root
    // definitions, all inside the Types module.
    let declared: Vec<&FinalizedObject> = state
        .objects
        .iter()
        .rev()
        .filter(|obj| !obj.found_in_union && obj.record_name.is_some())
        .collect();
    output.push_str("\nmodule Types = {\n");
    for obj in &declared {
        if let Some(record_name) = obj.record_name.as_deref() {
            output.push_str(&print_record_declaration(
                record_name,
                &obj.definition,
                state,
                1,
                false,
            )?);
        }
    }
    if let Some(variables) = &state.variables {
        output.push_str(&print_record_declaration(
            "variables", variables, state, 1, false,
        )?);
        if matches!(operation, OperationType::Query { .. }) {
            output.push_str(&print_record_declaration(
                "refetchVariables",
                variables,
                state,
                1,
                true,
            )?);
        }
    }
    if let Some(response) = &state.response {
        let name = match operation {
            OperationType::Query { .. } => "response",
            OperationType::Mutation { .. } => "mutationResponse",
            OperationType::Subscription { .. } => "subscriptionResponse",
            OperationType::Fragment { .. } => "fragmentResponse",
        };
        output.push_str(&print_record_declaration(name, response, state, 1, false)?);
    }
    if let Some(fragment) = &state.fragment {
        if fragment.plural {
            output.push_str(&print_record_declaration(
                "fragment_t",
                &fragment.definition,
                state,
                1,
                false,
            )?);
            output.push_str("  type fragment = array(fragment_t);\n");
        } else {
            output.push_str(&print_record_declaration(
                "fragment",
                &fragment.definition,
                state,
                1,
                false,
            )?);
        }
    }
    output.push_str("};\n\nopen Types;\n");

    output.push('\n');
    output.push_str(&print_internal_module(state, operation)?);

    if let Some(fragment) = &state.fragment {
        output.push('\n');
        output.push_str(&print_fragment_ref_assets(fragment));
    }

    output.push('\n');
    output.push_str(&print_utils_module(state, config)?);

    output.push('\n');
    output.push_str(&operation.emit());

    Ok(output)
}

/// The Reason type expression for one property value.
fn print_prop_value(value: &PropValue, state: &FullState) -> Result<String, TypegenError> {
    let inner = print_prop_type(&value.prop_type, state)?;
    if value.nullable {
        Ok(format!("option({inner})"))
    } else {
        Ok(inner)
    }
}

fn print_prop_type(prop_type: &PropType, state: &FullState) -> Result<String, TypegenError> {
    match prop_type {
        PropType::Scalar(scalar) => Ok(scalar.emit()),
        PropType::Enum(full_enum) => Ok(enum_type_name(&full_enum.name)),
        PropType::Union(union) => Ok(format!("union_{}", path_to_name(&union.at_path)?)),
        PropType::Object(shape) => match state.record_name_at_path(&shape.at_path) {
            Some(record_name) => Ok(record_name.to_string()),
            None => path_to_name(&shape.at_path),
        },
        PropType::Array(element) => {
            Ok(format!("array({})", print_prop_value(element, state)?))
        }
        PropType::TypeReference(name) => {
            match state
                .object_by_original_name(name)
                .and_then(|obj| obj.record_name.clone())
            {
                Some(record_name) => Ok(record_name),
                None => Ok(uncapitalize_first(name)),
            }
        }
        PropType::FragmentRefValue(name) => {
            Ok(format!("ReasonRelay.fragmentRefs([ | `{name}])"))
        }
    }
}

/// The field lines of a record body. Fragment refs collapse into one
/// trailing `fragmentRefs` field.
fn print_record_fields(
    shape: &ObjectShape,
    state: &FullState,
    indent: usize,
    force_non_nullable: bool,
) -> Result<String, TypegenError> {
    let pad = "  ".repeat(indent);
    let mut output = String::new();
    let mut fragment_refs: Vec<&str> = Vec::new();
    for prop in &shape.values {
        match prop {
            ObjectProp::Prop { name, value } => {
                let forced;
                let value = if force_non_nullable && value.nullable {
                    forced = PropValue {
                        nullable: false,
                        prop_type: value.prop_type.clone(),
                    };
                    &forced
                } else {
                    value
                };
                output.push_str(&format!(
                    "{pad}{}: {},\n",
                    print_record_key(name),
                    print_prop_value(value, state)?
                ));
            }
            ObjectProp::FragmentRef { fragment_name } => {
                fragment_refs.push(fragment_name);
            }
        }
    }
    if !fragment_refs.is_empty() {
        let tags: Vec<String> = fragment_refs
            .iter()
            .map(|name| format!("`{name}"))
            .collect();
        output.push_str(&format!(
            "{pad}fragmentRefs: ReasonRelay.fragmentRefs([ | {}]),\n",
            tags.join(" | ")
        ));
    }
    Ok(output)
}

/// A `type <name> = {...};` declaration at the given indent. Shapes with
/// no printable fields alias `unit`.
fn print_record_declaration(
    name: &str,
    shape: &ObjectShape,
    state: &FullState,
    indent: usize,
    force_non_nullable: bool,
) -> Result<String, TypegenError> {
    let pad = "  ".repeat(indent);
    if shape.is_empty() {
        return Ok(format!("{pad}type {name} = unit;\n"));
    }
    let fields = print_record_fields(shape, state, indent + 1, force_non_nullable)?;
    Ok(format!("{pad}type {name} = {{\n{fields}{pad}}};\n"))
}

/// The `Unions` module: per union a nested module holding the member
/// records, the polymorphic-variant alias and the wrap/unwrap helpers.
fn print_unions_module(state: &FullState) -> Result<String, TypegenError> {
    let mut output = String::from("module Unions = {\n");
    let mut first = true;
    for union in state.unions.iter().rev() {
        if !first {
            output.push('\n');
        }
        first = false;
        output.push_str(&print_union(union, state)?);
    }
    output.push_str("};\n");
    Ok(output)
}

fn print_union(union: &Union, state: &FullState) -> Result<String, TypegenError> {
    let base_name = path_to_name(&union.at_path)?;
    let module_name = format!("Union_{base_name}");
    let alias_name = format!("union_{base_name}");

    let mut output = format!("  module {module_name} = {{\n");
    for obj in union_member_objects(union, state).iter().rev() {
        if let Some(record_name) = obj.record_name.as_deref() {
            output.push_str(&print_record_declaration(
                record_name,
                &obj.definition,
                state,
                2,
                false,
            )?);
        }
    }
    for member in &union.members {
        let member_alias = uncapitalize_first(&member.name);
        let record_name = state
            .record_name_at_path(&member.shape.at_path)
            .map_or_else(|| path_to_name(&member.shape.at_path), |name| Ok(name.to_string()))?;
        output.push_str(&format!("    type {member_alias} = {record_name};\n"));
    }
    output.push_str("  };\n\n");

    output.push_str(&format!("  type {alias_name} = [\n"));
    for member in &union.members {
        let member_alias = uncapitalize_first(&member.name);
        output.push_str(&format!(
            "    | `{}({module_name}.{member_alias})\n",
            member.name
        ));
    }
    output.push_str("    | `UnselectedUnionMember(string)\n  ];\n\n");

    output.push_str(&format!(
        "  let unwrap_{alias_name}: Js.Json.t => {alias_name} =\n    json =>\n      switch (json->ReasonRelay.getUnionTypename) {{\n"
    ));
    for member in &union.members {
        output.push_str(&format!(
            "      | \"{}\" => `{}(Obj.magic(json))\n",
            member.name, member.name
        ));
    }
    output.push_str(
        "      | typename => `UnselectedUnionMember(typename)\n      };\n\n",
    );

    output.push_str(&format!(
        "  let wrap_{alias_name}: {alias_name} => Js.Json.t =\n    fun\n"
    ));
    for member in &union.members {
        output.push_str(&format!("    | `{}(v) => Obj.magic(v)\n", member.name));
    }
    output.push_str("    | `UnselectedUnionMember(_) => Js.Json.null;\n");
    Ok(output)
}

/// The finalized objects declared inside a union's module: those whose
/// path lies under this union and under no deeper one.
fn union_member_objects<'a>(
    union: &Union,
    state: &'a FullState,
) -> Vec<&'a FinalizedObject> {
    state
        .objects
        .iter()
        .filter(|obj| obj.found_in_union && innermost_union(state, &obj.at_path) == Some(union))
        .collect()
}

fn innermost_union<'a>(state: &'a FullState, path: &[String]) -> Option<&'a Union> {
    state
        .unions
        .iter()
        .filter(|candidate| {
            candidate.at_path.len() < path.len() && path.ends_with(&candidate.at_path)
        })
        .max_by_key(|candidate| candidate.at_path.len())
}

/// The `Internal` module holding one converter block per root.
fn print_internal_module(
    state: &FullState,
    operation: &OperationType,
) -> Result<String, TypegenError> {
    let mut blocks: Vec<String> = Vec::new();

    if let Some(fragment) = &state.fragment {
        let assets = build_converter_assets(&fragment.definition, state)?;
        blocks.push(print_converter_block(
            "fragment",
            &assets,
            Direction::Unwrap,
            RawSentinel::Undefined,
        ));
    }
    if let Some(response) = &state.response {
        let assets = build_converter_assets(response, state)?;
        blocks.push(print_converter_block(
            "response",
            &assets,
            Direction::Unwrap,
            RawSentinel::Undefined,
        ));
        if matches!(operation, OperationType::Mutation { .. }) {
            blocks.push(print_converter_block(
                "wrapResponse",
                &assets,
                Direction::Wrap,
                RawSentinel::Null,
            ));
        }
    }
    if let Some(variables) = &state.variables {
        let assets = build_converter_assets(variables, state)?;
        blocks.push(print_converter_block(
            "variables",
            &assets,
            Direction::Wrap,
            RawSentinel::Undefined,
        ));
    }

    let mut output = String::from("module Internal = {\n");
    output.push_str(&blocks.join("\n"));
    output.push_str("};\n");
    Ok(output)
}

fn print_converter_block(
    root_name: &str,
    assets: &ConverterAssets,
    direction: Direction,
    sentinel: RawSentinel,
) -> String {
    let helper_prefix = match direction {
        Direction::Unwrap => "unwrap",
        Direction::Wrap => "wrap",
    };
    let mut output = format!("  type {root_name}Raw;\n");
    output.push_str(&format!(
        "  let {root_name}Converter: Js.Json.t = [%raw\n    {{json| {} |json}}\n  ];\n",
        assets.instructions
    ));

    let mut categories: Vec<String> = Vec::new();
    if !assets.enums.is_empty() {
        let entries: Vec<String> = assets
            .enums
            .iter()
            .map(|name| format!("\"{name}\": {helper_prefix}_{name}"))
            .collect();
        categories.push(format!("\"e\": {{{}}}", entries.join(", ")));
    }
    if !assets.unions.is_empty() {
        let entries: Vec<String> = assets
            .unions
            .iter()
            .map(|name| format!("\"{name}\": {helper_prefix}_union_{name}"))
            .collect();
        categories.push(format!("\"u\": {{{}}}", entries.join(", ")));
    }
    if categories.is_empty() {
        output.push_str(&format!("  let {root_name}ConverterMap = ();\n"));
    } else {
        output.push_str(&format!(
            "  let {root_name}ConverterMap = {{{}}};\n",
            categories.join(", ")
        ));
    }

    output.push_str(&format!(
        "  let convert{} = v =>\n    v->ReasonRelay.convertObj(\n      {root_name}Converter,\n      {root_name}ConverterMap,\n      {},\n    );\n",
        capitalize_first(root_name),
        sentinel.print()
    ));
    output
}

/// The opaque token consumers use to pass a fragment's data around.
fn print_fragment_ref_assets(fragment: &Fragment) -> String {
    let mut output = String::from("type fragmentRef;\n");
    output.push_str(&format!(
        "external getFragmentRef:\n  ReasonRelay.fragmentRefs([> | `{}]) => fragmentRef =\n  \"%identity\";\n",
        fragment.name
    ));
    output
}

/// The `Utils` module: the connection helper when configured, and one
/// constructor per input object that has optional fields.
fn print_utils_module(
    state: &FullState,
    config: &PrintConfig,
) -> Result<String, TypegenError> {
    let mut entries: Vec<String> = Vec::new();

    if let Some(connection) = &config.connection {
        if let Some(helper) = print_connection_helper(state, connection) {
            entries.push(helper);
        }
    }

    for obj in &state.objects {
        if obj.original_type_name.is_none() {
            continue;
        }
        if let Some(constructor) = print_input_constructor(obj, state)? {
            entries.push(constructor);
        }
    }

    let mut output = String::from("module Utils = {\n");
    output.push_str(&entries.join("\n"));
    output.push_str("};\n");
    Ok(output)
}

/// Resolve the connection config against the finalized objects and print
/// the `getConnectionNodes` helper. A path that matches nothing simply
/// produces no helper.
fn print_connection_helper(
    state: &FullState,
    connection: &ConnectionConfig,
) -> Option<String> {
    let (connection_type, node_record) = resolve_connection(state, connection)?;
    Some(format!(
        "  let getConnectionNodes = (connection: {connection_type}): array({node_record}) =>\n    ReasonRelayUtils.collectConnectionNodes(connection);\n"
    ))
}

fn resolve_connection(
    state: &FullState,
    connection: &ConnectionConfig,
) -> Option<(String, String)> {
    if connection.at_object_path == ["fragment"] {
        state.fragment.as_ref()?;
        let node_path = vec![
            "node".to_string(),
            "edges".to_string(),
            "fragment".to_string(),
        ];
        let node_record = state.record_name_at_path(&node_path)?;
        return Some(("fragment".to_string(), node_record.to_string()));
    }

    // The configured path may arrive leaf-first or root-first; both
    // orientations are tried against the response and fragment roots.
    let mut orientations = vec![connection.at_object_path.clone()];
    let mut reversed = connection.at_object_path.clone();
    reversed.reverse();
    if reversed != connection.at_object_path {
        orientations.push(reversed);
    }

    for orientation in &orientations {
        for root in ["response", "fragment"] {
            let mut full = orientation.clone();
            full.push(root.to_string());
            let Some(found) = state.object_at_path(&full) else {
                continue;
            };
            let connection_path: Vec<String> =
                if found.at_path.first().map(String::as_str) == Some("edges") {
                    found.at_path[1..].to_vec()
                } else {
                    found.at_path.clone()
                };
            let connection_record = state.record_name_at_path(&connection_path)?;
            let mut node_path = vec!["node".to_string(), "edges".to_string()];
            node_path.extend(connection_path.iter().cloned());
            let node_record = state.record_name_at_path(&node_path)?;
            return Some((
                format!("option({connection_record})"),
                node_record.to_string(),
            ));
        }
    }
    None
}

/// A `make_<record>` constructor for an input object, with optional
/// labeled arguments for its nullable fields. Inputs whose fields are all
/// required need no constructor.
fn print_input_constructor(
    obj: &FinalizedObject,
    state: &FullState,
) -> Result<Option<String>, TypegenError> {
    let Some(record_name) = obj.record_name.as_deref() else {
        return Ok(None);
    };
    let props: Vec<(&str, &PropValue)> = obj
        .definition
        .values
        .iter()
        .filter_map(|prop| match prop {
            ObjectProp::Prop { name, value } => Some((name.as_str(), value)),
            ObjectProp::FragmentRef { .. } => None,
        })
        .collect();
    if !props.iter().any(|(_, value)| value.nullable) {
        return Ok(None);
    }

    let mut args: Vec<String> = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    for (name, value) in &props {
        let field = escape_field_name(name);
        if value.nullable {
            args.push(format!("~{field}=?"));
        } else {
            args.push(format!(
                "~{field}: {}",
                print_prop_type(&value.prop_type, state)?
            ));
        }
        fields.push(field);
    }

    Ok(Some(format!(
        "  let make_{record_name} = ({}, ()): {record_name} => {{\n    {},\n  }};\n",
        args.join(", "),
        fields.join(",\n    ")
    )))
}

/// The bare Reason identifier for a field, without the `[@bs.as]` rename
/// attribute.
fn escape_field_name(name: &str) -> String {
    let printed = print_record_key(name);
    match printed.rsplit_once(' ') {
        Some((_, escaped)) => escaped.to_string(),
        None => printed,
    }
}
