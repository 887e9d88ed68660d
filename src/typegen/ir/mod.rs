//! Intermediate representation for Flow-to-Reason type generation.
//!
//! This module defines a three-stage architecture:
//! 1. Extraction: Flow AST -> intermediate state (all input-dialect corner
//!    cases resolved)
//! 2. Finalization: intermediate state -> full state (record naming,
//!    deduplication, union hoisting)
//! 3. Emission: full state -> Reason source text, with converter assets
//!    built alongside
//!
//! ## Module structure
//!
//! - `model`: the intermediate data model (prop values, shapes, states)
//! - `extract`: Flow AST -> `IntermediateState`
//! - `finalize`: `IntermediateState` -> `FullState`
//! - `emit`: `FullState` -> Reason code (via the `Emit` trait and section
//!   printers)
//! - `converters`: runtime conversion instruction tables
//! - `utils`: naming helpers shared across modules

pub mod model;
pub mod utils;

mod converters;
mod emit;
mod extract;
mod finalize;

// Re-export the main entry points.
pub use emit::{print_full_state, Emit};
pub use extract::extract_intermediate;
pub use finalize::intermediate_to_full;
