//! Binary entry point for `gosubmod`.

use clap::Parser;
use gosubmod::cli::Cli;
use std::process;

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .init();

    if let Err(e) = gosubmod::run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
