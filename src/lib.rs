#![doc = include_str!("../README.md")]

pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod fs;
pub mod modfile;
pub mod module;
pub mod submod;

pub use error::*;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Runs the parsed command line.
pub fn run(cli: cli::Cli) -> Result<()> {
    use cli::Command;

    let cwd = std::env::current_dir()?;
    let config = config::Config::resolve(cli.modfile.as_deref(), &cwd)
        .with_strict(!cli.no_strict)
        .with_dry_run(cli.dry_run);
    log::debug!("Using manifest {}", config.manifest_path.display());

    match cli.command {
        Command::List => command::list::execute(&config),
        Command::Add(args) => command::add::execute(&config, &args.modules),
        Command::Drop(args) => command::drop::execute(&config, &args.modules),
    }
}
