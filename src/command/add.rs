use crate::config::Config;
use crate::error::Result;
use crate::submod::SubmodFile;

/// Adds local replace directives for `modules` (all submodules when empty).
pub fn execute(config: &Config, modules: &[String]) -> Result<()> {
    let mut file = SubmodFile::load(config, modules)?;

    let added = file.add_replaces(modules)?;
    log::debug!("{} replace directive(s) added or updated", added.len());

    super::write_manifest(config, &mut file, "Replace directives", &added)
}
