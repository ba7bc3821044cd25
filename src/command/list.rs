use crate::config::Config;
use crate::error::Result;
use crate::submod::SubmodFile;
use std::io::{self, BufWriter, Write};

/// Prints every submodule, one `path@version` per line.
pub fn execute(config: &Config) -> Result<()> {
    let file = SubmodFile::load::<&str>(config, &[])?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_list(&file, &mut out)?;
    Ok(())
}

/// Writes the submodule list to `out` and flushes it.
pub fn write_list(file: &SubmodFile, out: &mut impl Write) -> io::Result<()> {
    for require in file.submodules() {
        writeln!(out, "{}", require.module)?;
    }
    out.flush()
}
