use clap::Args;
use serde::Deserialize;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

use crate::typegen::{print_from_flow_types, OperationType, PrintConfig};

/// The payload the host build tool hands to the generator.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrintPayload {
    content: String,
    operation_type: OperationType,
    #[serde(default)]
    config: PrintConfig,
}

#[derive(Args, Debug, Clone)]
pub struct PrintArgs {
    /// Payload JSON file; "-" reads from stdin
    #[arg(long = "payload", value_name = "FILE")]
    pub payload: PathBuf,
    /// Output file; stdout when omitted
    #[arg(long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn run(args: PrintArgs) -> i32 {
    match run_inner(&args) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn run_inner(args: &PrintArgs) -> Result<(), String> {
    let raw = if args.payload.to_str() == Some("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|err| format!("Failed to read payload from stdin: {err}"))?;
        buffer
    } else {
        fs::read_to_string(&args.payload)
            .map_err(|err| format!("Failed to read payload file: {err}"))?
    };

    let payload: PrintPayload =
        serde_json::from_str(&raw).map_err(|err| format!("Failed to parse payload: {err}"))?;

    debug!(
        operation = payload.operation_type.name(),
        content_len = payload.content.len(),
        "Generating Reason types."
    );
    let printed = print_from_flow_types(
        &payload.content,
        &payload.operation_type,
        &payload.config,
    )
    .map_err(|err| format!("Failed to generate types: {err}"))?;

    match &args.output {
        Some(path) => fs::write(path, &printed)
            .map_err(|err| format!("Failed to write output file: {err}"))?,
        None => print!("{printed}"),
    }
    Ok(())
}
