use crate::config::Config;
use crate::error::Result;
use crate::submod::SubmodFile;

/// Drops local replace directives of `modules` (all submodules when empty).
pub fn execute(config: &Config, modules: &[String]) -> Result<()> {
    let mut file = SubmodFile::load(config, modules)?;

    let dropped = file.remove_replaces(modules)?;
    if dropped.is_empty() {
        log::info!("No local replace directives to drop");
    }

    super::write_manifest(config, &mut file, "Dropped directives", &dropped)
}
