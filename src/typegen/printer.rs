//! Entry point for the type generation pipeline.
//!
//! This module is a thin wrapper around the IR-based code generation.
//! The pipeline is:
//! 1. Parse: Flow source -> FlowProgram
//! 2. Extract: FlowProgram -> IntermediateState (all input-dialect logic
//!    resolved)
//! 3. Finalize: IntermediateState -> FullState (names assigned, enums and
//!    unions deduplicated)
//! 4. Emit: FullState -> Reason source text

use tracing::warn;

use crate::flow;
use crate::typegen::error::TypegenError;
use crate::typegen::ir::{extract_intermediate, intermediate_to_full, print_full_state};
use crate::typegen::ir::model::{OperationType, PrintConfig};

/// Generate the Reason source for one Relay-generated Flow types file.
///
/// Parse failures are not fatal to the host: each diagnostic is logged and
/// an empty string is returned so the host can decide whether to continue.
pub fn print_from_flow_types(
    content: &str,
    operation_type: &OperationType,
    config: &PrintConfig,
) -> Result<String, TypegenError> {
    let outcome = flow::parse(content);
    if !outcome.errors.is_empty() {
        for error in &outcome.errors {
            warn!(operation = operation_type.name(), "parse error: {error}");
        }
        return Ok(String::new());
    }

    let intermediate = extract_intermediate(&outcome.program, operation_type)?;
    let full = intermediate_to_full(intermediate)?;
    print_full_state(&full, operation_type, config)
}
