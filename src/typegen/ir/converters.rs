//! Converter-asset builder.
//!
//! For each operation root this module walks the object definition and
//! produces a nested description of which fields need runtime conversion
//! (nullable vs option, raw enum strings vs variants, unions, referenced
//! input objects, opaque values to skip). The emitter serializes the
//! description into the instruction table and converter map consumed by
//! the runtime library.

use serde_json::{Map, Value};

use crate::typegen::error::TypegenError;
use crate::typegen::ir::model::{FullState, ObjectProp, ObjectShape, PropType, PropValue};
use crate::typegen::ir::utils::{enum_type_name, path_to_name, uncapitalize_first};

/// Which way values flow through the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Raw JSON to target values (responses, fragments).
    Unwrap,
    /// Target values to raw JSON (variables, mutation wrapResponse).
    Wrap,
}

/// The raw sentinel standing in for an absent nullable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawSentinel {
    Undefined,
    Null,
}

impl RawSentinel {
    /// The runtime expression the emitter passes to `convertObj`.
    pub fn print(self) -> &'static str {
        match self {
            RawSentinel::Undefined => "Js.undefined",
            RawSentinel::Null => "Js.null",
        }
    }
}

/// Conversion requirements of one field value, nested per the shape of the
/// type it annotates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConverterInstruction {
    pub nullable: bool,
    pub skip: bool,
    pub enum_name: Option<String>,
    pub union: Option<String>,
    pub array: Option<Box<ConverterInstruction>>,
    /// Conversion continues in the table of this referenced record.
    pub object: Option<String>,
    /// Child fields (inline objects and union members).
    pub fields: Vec<(String, ConverterInstruction)>,
}

impl ConverterInstruction {
    /// Whether the instruction changes the value at its own path.
    fn has_flags(&self) -> bool {
        self.nullable
            || self.skip
            || self.enum_name.is_some()
            || self.union.is_some()
            || self.object.is_some()
            || self.array.as_ref().is_some_and(|inner| inner.is_significant())
    }

    /// Whether the instruction (or anything below it) matters at all.
    fn is_significant(&self) -> bool {
        self.has_flags() || self.fields.iter().any(|(_, child)| child.is_significant())
    }
}

/// Everything the emitter needs for one root's converter block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConverterAssets {
    /// Instruction tables: `__root` plus one per referenced input object,
    /// each keyed by underscore-joined JSON path.
    pub instructions: Value,
    /// Enum type names needing a converter map entry.
    pub enums: Vec<String>,
    /// Union local names needing a converter map entry.
    pub unions: Vec<String>,
}

/// Build the converter assets for one root definition.
pub fn build_converter_assets(
    definition: &ObjectShape,
    state: &FullState,
) -> Result<ConverterAssets, TypegenError> {
    let mut assets = ConverterAssets::default();
    let mut referenced: Vec<String> = Vec::new();

    let root = shape_instruction(definition, state, &mut assets, &mut referenced)?;
    let mut tables = Map::new();
    tables.insert("__root".to_string(), flatten_instruction(&root));

    // Referenced input objects get their own table; references found while
    // flattening one table may enqueue more.
    let mut seen: Vec<String> = Vec::new();
    while let Some(name) = referenced.pop() {
        if seen.contains(&name) {
            continue;
        }
        seen.push(name.clone());
        let Some(obj) = state.object_by_original_name(&name) else {
            continue;
        };
        let Some(record_name) = obj.record_name.clone() else {
            continue;
        };
        let table =
            shape_instruction(&obj.definition, state, &mut assets, &mut referenced)?;
        tables.insert(record_name, flatten_instruction(&table));
    }

    assets.instructions = Value::Object(tables);
    Ok(assets)
}

fn shape_instruction(
    shape: &ObjectShape,
    state: &FullState,
    assets: &mut ConverterAssets,
    referenced: &mut Vec<String>,
) -> Result<ConverterInstruction, TypegenError> {
    let mut node = ConverterInstruction::default();
    for prop in &shape.values {
        if let ObjectProp::Prop { name, value } = prop {
            let child = value_instruction(value, state, assets, referenced)?;
            if child.is_significant() {
                node.fields.push((name.clone(), child));
            }
        }
    }
    Ok(node)
}

fn value_instruction(
    value: &PropValue,
    state: &FullState,
    assets: &mut ConverterAssets,
    referenced: &mut Vec<String>,
) -> Result<ConverterInstruction, TypegenError> {
    let mut node = ConverterInstruction {
        nullable: value.nullable,
        ..ConverterInstruction::default()
    };
    match &value.prop_type {
        PropType::Scalar(_) => {}
        PropType::Enum(full_enum) => {
            let name = enum_type_name(&full_enum.name);
            if !assets.enums.contains(&name) {
                assets.enums.push(name.clone());
            }
            node.enum_name = Some(name);
        }
        PropType::Union(union) => {
            let name = path_to_name(&union.at_path)?;
            if !assets.unions.contains(&name) {
                assets.unions.push(name.clone());
            }
            node.union = Some(name);
            for member in &union.members {
                let child = shape_instruction(&member.shape, state, assets, referenced)?;
                if child.is_significant() {
                    node.fields.push((uncapitalize_first(&member.name), child));
                }
            }
        }
        PropType::Object(shape) => {
            let child = shape_instruction(shape, state, assets, referenced)?;
            node.fields = child.fields;
        }
        PropType::Array(element) => {
            let inner = value_instruction(element, state, assets, referenced)?;
            node.array = Some(Box::new(inner));
        }
        PropType::TypeReference(name) => {
            match state
                .object_by_original_name(name)
                .and_then(|obj| obj.record_name.clone())
            {
                Some(record_name) => {
                    node.object = Some(record_name);
                    referenced.push(name.clone());
                }
                // Opaque values (custom scalars) pass through untouched.
                None => node.skip = true,
            }
        }
        PropType::FragmentRefValue(_) => node.skip = true,
    }
    Ok(node)
}

/// Flatten a nested instruction into `{ "<joined path>": {flags} }`.
fn flatten_instruction(root: &ConverterInstruction) -> Value {
    let mut out = Map::new();
    for (key, child) in &root.fields {
        flatten_into(&mut out, key.clone(), child);
    }
    Value::Object(out)
}

fn flatten_into(out: &mut Map<String, Value>, path: String, node: &ConverterInstruction) {
    let flags = instruction_flags(node);
    if !flags.is_empty() {
        out.insert(path.clone(), Value::Object(flags));
    }
    for (key, child) in node.direct_fields() {
        flatten_into(out, format!("{path}_{key}"), child);
    }
}

fn instruction_flags(node: &ConverterInstruction) -> Map<String, Value> {
    let mut flags = Map::new();
    // Arrays merge their element's flags into the field entry; the flag
    // value records element nullability.
    let (element, array_marker) = match &node.array {
        Some(inner) => (
            inner.as_ref(),
            Some(if inner.nullable { "n" } else { "" }),
        ),
        None => (node, None),
    };
    if node.nullable {
        flags.insert("n".to_string(), Value::String(String::new()));
    }
    if let Some(marker) = array_marker {
        flags.insert("a".to_string(), Value::String(marker.to_string()));
    }
    if element.skip {
        flags.insert("s".to_string(), Value::String(String::new()));
    }
    if let Some(name) = &element.enum_name {
        flags.insert("e".to_string(), Value::String(name.clone()));
    }
    if let Some(name) = &element.union {
        flags.insert("u".to_string(), Value::String(name.clone()));
    }
    if let Some(name) = &element.object {
        flags.insert("r".to_string(), Value::String(name.clone()));
    }
    flags
}

impl ConverterInstruction {
    /// The children to flatten below this entry, looking through arrays.
    fn direct_fields(&self) -> &[(String, ConverterInstruction)] {
        match &self.array {
            Some(inner) => &inner.fields,
            None => &self.fields,
        }
    }
}
