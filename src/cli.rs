use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Add or drop local "replace" directives for Go submodules.
#[derive(Parser, Debug)]
#[command(name = "gosubmod", version, about, long_about = None)]
#[command(arg_required_else_help = true, subcommand_required = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the go.mod file (defaults to go.mod in the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub modfile: Option<PathBuf>,

    /// Do not require submodule directories to exist
    #[arg(long, global = true)]
    pub no_strict: bool,

    /// Print the resulting go.mod instead of writing it
    #[arg(long, short = 'n', global = true)]
    pub dry_run: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// List all recognized submodules
    #[command(visible_alias = "l")]
    List,

    /// Add "replace" directives with relative paths for submodules
    #[command(visible_alias = "a")]
    Add(ModulesArgs),

    /// Drop "replace" directives with relative paths for submodules
    #[command(visible_alias = "d")]
    Drop(ModulesArgs),
}

#[derive(Args, Debug, PartialEq, Eq)]
pub struct ModulesArgs {
    /// Submodules to act on, as `path` or `path@version` (all when omitted)
    #[arg(value_name = "MODULE")]
    pub modules: Vec<String>,
}

impl Cli {
    /// Log level for `-v` repetitions, `warn` by default.
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}
