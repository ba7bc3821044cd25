//! Subcommand implementations.
//!
//! Each command loads the manifest named by the [`Config`], works on the
//! in-memory [`SubmodFile`] and, for `add` and `drop`, writes the result back
//! through a [`Transaction`].

pub mod add;
pub mod drop;
pub mod list;

use crate::config::Config;
use crate::error::Result;
use crate::fs::Transaction;
use crate::modfile::Replace;
use crate::submod::SubmodFile;
use std::io::Write;

/// Formats `file` and writes it to the manifest path, or prints it in dry-run mode.
fn write_manifest(
    config: &Config,
    file: &mut SubmodFile,
    heading: &str,
    changed: &[Replace],
) -> Result<()> {
    let content = file.format();

    let mut txn = Transaction::new(config.dry_run);
    txn.update_file(config.manifest_path.clone(), content.clone())?;

    if config.dry_run {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(content.as_bytes())?;
        stdout.flush()?;
    }

    txn.commit()?;

    let directives: Vec<String> = changed.iter().map(describe).collect();
    txn.print_summary(&config.root, heading, &directives);
    Ok(())
}

fn describe(replace: &Replace) -> String {
    format!("replace {} => {}", replace.old, replace.new)
}
