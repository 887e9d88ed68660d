//! Command-line entry point for the relgen code generator.

fn main() {
    std::process::exit(relgen::run_cli(std::env::args().collect()));
}
