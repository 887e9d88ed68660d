//! Intermediate data model for extracted type information.
//!
//! Two layers of state flow through the pipeline:
//! - `IntermediateState`: the raw result of walking the input AST
//!   (enums, named objects, the operation roots).
//! - `FullState`: the finalized form with record names assigned, enums
//!   deduplicated and unions hoisted, ready for emission.
//!
//! Paths (`at_path`) are leaf-first sequences built by prepending; the
//! anchors `["variables"]`, `["response"]`, `["fragment"]` and `["root"]`
//! identify roots.

use serde::Deserialize;

/// The kind of GraphQL operation a generated types file belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "operation", rename_all = "lowercase")]
pub enum OperationType {
    Fragment { name: String, plural: bool },
    Query { name: String },
    Mutation { name: String },
    Subscription { name: String },
}

impl OperationType {
    /// The unqualified operation identifier.
    pub fn name(&self) -> &str {
        match self {
            OperationType::Fragment { name, .. }
            | OperationType::Query { name }
            | OperationType::Mutation { name }
            | OperationType::Subscription { name } => name,
        }
    }
}

/// Options recognized by the printer. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrintConfig {
    pub connection: Option<ConnectionConfig>,
}

/// Marks one field in the output as a Relay connection, enabling the
/// `getConnectionNodes` helper for it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    pub at_object_path: Vec<String>,
    pub field_name: String,
}

/// Scalar types the target language can express directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    String,
    Float,
    Boolean,
    Any,
}

/// The type of a single extracted property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropType {
    Scalar(Scalar),
    /// Reference to an extracted enum declaration.
    Enum(FullEnum),
    /// Inline polymorphic union discriminated by `__typename`.
    Union(Union),
    /// Inline anonymous record.
    Object(ObjectShape),
    /// Homogeneous sequence; the element carries its own nullability.
    Array(Box<PropValue>),
    /// Opaque nominal type name carried through to the output.
    TypeReference(String),
    /// Reserved for standalone fragment reference values.
    FragmentRefValue(String),
}

/// A property type plus its nullability.
#[derive(Debug, Clone, PartialEq)]
pub struct PropValue {
    pub nullable: bool,
    pub prop_type: PropType,
}

/// One entry of an object shape: either a named property or a fragment
/// reference spread onto the object.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectProp {
    Prop { name: String, value: PropValue },
    FragmentRef { fragment_name: String },
}

/// An object literal with path-addressed identity. `values` keeps the
/// input order.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectShape {
    pub at_path: Vec<String>,
    pub values: Vec<ObjectProp>,
}

impl ObjectShape {
    /// Whether the shape has any printable entry at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A string-literal union extracted as an enum.
#[derive(Debug, Clone, PartialEq)]
pub struct FullEnum {
    pub name: String,
    pub values: Vec<String>,
}

/// One member of a polymorphic union, keyed by its capitalized typename.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionMember {
    pub name: String,
    pub shape: ObjectShape,
}

/// An inline union of object literals. Members named `%other` are dropped
/// at construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct Union {
    pub at_path: Vec<String>,
    pub members: Vec<UnionMember>,
}

/// A named top-level object as the extractor found it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedObject {
    pub original_type_name: Option<String>,
    pub found_in_union: bool,
    pub definition: ObjectShape,
}

/// An object with its record name decided, ready for emission.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedObject {
    pub original_type_name: Option<String>,
    pub record_name: Option<String>,
    pub at_path: Vec<String>,
    pub definition: ObjectShape,
    pub found_in_union: bool,
}

/// The fragment root of a fragment operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub name: String,
    pub plural: bool,
    pub definition: ObjectShape,
}

/// Raw extraction result, before naming and deduplication.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntermediateState {
    pub enums: Vec<FullEnum>,
    pub objects: Vec<ExtractedObject>,
    pub variables: Option<ObjectShape>,
    pub response: Option<ObjectShape>,
    pub fragment: Option<Fragment>,
}

/// Finalized state consumed by the emitter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FullState {
    pub enums: Vec<FullEnum>,
    pub unions: Vec<Union>,
    pub objects: Vec<FinalizedObject>,
    pub variables: Option<ObjectShape>,
    pub response: Option<ObjectShape>,
    pub fragment: Option<Fragment>,
}

impl FullState {
    /// Look up the finalized object rooted at exactly `path` (leaf-first).
    pub fn object_at_path(&self, path: &[String]) -> Option<&FinalizedObject> {
        self.objects.iter().find(|obj| obj.at_path == path)
    }

    /// Look up the record name of the object rooted at `path`.
    pub fn record_name_at_path(&self, path: &[String]) -> Option<&str> {
        self.object_at_path(path)
            .and_then(|obj| obj.record_name.as_deref())
    }

    /// Look up a named input object by its original type alias name.
    pub fn object_by_original_name(&self, name: &str) -> Option<&FinalizedObject> {
        self.objects
            .iter()
            .find(|obj| obj.original_type_name.as_deref() == Some(name))
    }
}
