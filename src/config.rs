//! Resolved run configuration.
//!
//! The command line is turned into a [`Config`] once, in [`Config::resolve`].
//! Everything below it works with the absolute paths stored here and never
//! looks at the process working directory.

use std::path::{Path, PathBuf};

/// Default manifest file name.
pub const GO_MOD: &str = "go.mod";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Absolute path of the go.mod file.
    pub manifest_path: PathBuf,
    /// Directory holding the manifest; submodule directories are relative to it.
    pub root: PathBuf,
    /// Require every replaced submodule directory to exist.
    pub strict: bool,
    /// Print the result instead of writing it.
    pub dry_run: bool,
}

impl Config {
    /// Configuration for an absolute manifest path, strict and not dry-run.
    pub fn new(manifest_path: impl Into<PathBuf>) -> Self {
        let manifest_path = manifest_path.into();
        let root = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            manifest_path,
            root,
            strict: true,
            dry_run: false,
        }
    }

    /// Resolves an optional `--modfile` argument against `cwd`.
    ///
    /// Without one, `go.mod` in `cwd` is used.
    pub fn resolve(modfile: Option<&Path>, cwd: &Path) -> Self {
        let path = match modfile {
            Some(p) if p.is_absolute() => p.to_path_buf(),
            Some(p) => cwd.join(p),
            None => cwd.join(GO_MOD),
        };
        Self::new(path)
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}
