#![forbid(unsafe_code)]
#![deny(warnings, unused_must_use, dead_code, missing_debug_implementations)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! relgen generates Reason types and converter helpers from the Flow type
//! declarations the Relay compiler writes for each GraphQL operation.

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

mod cli;
pub mod flow;
pub mod typegen;

pub use typegen::{
    print_from_flow_types, ConnectionConfig, OperationType, PrintConfig, TypegenError,
};

#[derive(Parser)]
#[command(
    name = "relgen",
    version,
    about = "Generate Reason types from Relay compiler output"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the Reason source for one operation payload
    Print(cli::print::PrintArgs),
}

/// Run the CLI with the given arguments and return the process exit code.
pub fn run_cli(args: Vec<String>) -> i32 {
    init_tracing();
    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.command {
            Some(Commands::Print(print_args)) => cli::print::run(print_args),
            None => {
                let mut cmd = Cli::command();
                let _ = cmd.print_help();
                println!();
                0
            }
        },
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

fn init_tracing() {
    let crate_root = module_path!().to_string();

    // RELGEN_LOG controls log level: "trace", "debug", "info", "warn",
    // "error" or a full tracing filter spec like "relgen=debug".
    let filter = match std::env::var("RELGEN_LOG") {
        Ok(level) if is_plain_level(&level) => {
            format!("{crate_root}={level}")
        }
        Ok(spec) => spec,
        Err(_) => format!("{crate_root}=info"),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn is_plain_level(value: &str) -> bool {
    matches!(value, "trace" | "debug" | "info" | "warn" | "error")
}
