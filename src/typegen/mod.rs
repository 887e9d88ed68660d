//! Flow-types to Reason code generator.
//!
//! This module turns the type declarations the Relay compiler writes for
//! each operation into Reason source:
//! - Record declarations for every selected object shape
//! - Variant types and string converters for enums
//! - Polymorphic variants and tag switches for `__typename` unions
//! - Converter instruction tables bridging raw JSON and typed values

pub mod error;
pub mod ir;

mod printer;

pub use error::TypegenError;
pub use ir::model::{ConnectionConfig, OperationType, PrintConfig};
pub use printer::print_from_flow_types;
