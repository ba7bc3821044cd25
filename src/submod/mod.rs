//! Submodule-aware view of a go.mod file.
//!
//! A submodule is a required module nested under the main module, e.g.
//! `example.com/a/b` required by `example.com/a`. [`SubmodFile`] adds or drops
//! `replace` directives that point such requirements at their local
//! directories.
//!
//! ## Example
//!
//! ```
//! use gosubmod::submod::SubmodFile;
//!
//! let text = "module example.com/a\n\nrequire example.com/a/b v1.0.0\n";
//! let mut file = SubmodFile::parse("/work/a/go.mod", text)?;
//! file.add_replaces::<&str>(&[])?;
//! assert!(file.format().contains("replace example.com/a/b => ./b"));
//! # Ok::<(), gosubmod::SubmodError>(())
//! ```

pub mod policy;
pub mod probe;

pub use policy::{PrefixMatch, SubmodulePolicy};
pub use probe::{DirectoryProbe, FsProbe};

use crate::config::Config;
use crate::error::{Result, SubmodError};
use crate::modfile::{ModFile, Replace, Require};
use crate::module::{ModuleSet, ModuleVersion, parse_modules, path};
use std::fs;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// A parsed go.mod together with where it lives and how submodules are found.
pub struct SubmodFile {
    file: ModFile,
    path: PathBuf,
    root: PathBuf,
    strict: bool,
    policy: Box<dyn SubmodulePolicy>,
    probe: Box<dyn DirectoryProbe>,
}

impl SubmodFile {
    /// Parses manifest text. `path` is where it was read from; submodule
    /// directories are resolved against its parent.
    ///
    /// Strict mode is off; see [`with_strict`](Self::with_strict).
    pub fn parse(path: impl Into<PathBuf>, text: &str) -> Result<Self> {
        let path = path.into();
        Self::from_text(&path, text).map_err(|e| e.in_manifest(&path, &[]))
    }

    /// Reads and parses the manifest named by `config`.
    ///
    /// `modules` are the modules the caller is about to work on; they are
    /// attached to any error.
    pub fn load<S: AsRef<str>>(config: &Config, modules: &[S]) -> Result<Self> {
        let path = &config.manifest_path;
        log::debug!("Reading {}", path.display());

        let loaded = fs::read_to_string(path)
            .map_err(|e| {
                SubmodError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to read {}: {}", path.display(), e),
                ))
            })
            .and_then(|text| Self::from_text(path, &text));

        match loaded {
            Ok(file) => Ok(file
                .with_root(config.root.clone())
                .with_strict(config.strict)),
            Err(e) => Err(e.in_manifest(path, &to_strings(modules))),
        }
    }

    fn from_text(path: &Path, text: &str) -> Result<Self> {
        let file = ModFile::parse(&path.display().to_string(), text)?;
        let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self {
            file,
            path: path.to_path_buf(),
            root,
            strict: false,
            policy: Box::new(PrefixMatch),
            probe: Box::new(FsProbe),
        })
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_policy(mut self, policy: impl SubmodulePolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn with_probe(mut self, probe: impl DirectoryProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mod_file(&self) -> &ModFile {
        &self.file
    }

    /// Requirements that are submodules of the main module, in file order.
    pub fn submodules(&self) -> Vec<&Require> {
        let Some(main) = self.file.module_path() else {
            return Vec::new();
        };
        self.file
            .require
            .iter()
            .filter(|r| self.policy.is_submodule(&r.module.path, main))
            .collect()
    }

    /// Paths of all submodules.
    pub fn submodule_paths(&self) -> Vec<String> {
        self.submodules()
            .into_iter()
            .map(|r| r.module.path.clone())
            .collect()
    }

    /// Adds a `replace sub => ./dir` for each requested submodule, or for every
    /// submodule when `modules` is empty. Returns the replacements written.
    ///
    /// In strict mode every directory is checked before anything is changed.
    pub fn add_replaces<S: AsRef<str>>(&mut self, modules: &[S]) -> Result<Vec<Replace>> {
        let requested = to_strings(modules);
        self.try_add_replaces(&requested)
            .map_err(|e| e.in_manifest(&self.path, &requested))
    }

    fn try_add_replaces(&mut self, requested: &[String]) -> Result<Vec<Replace>> {
        let targets = self.targets(requested)?;
        let Some(main) = self.file.module_path().map(str::to_string) else {
            return Ok(Vec::new());
        };

        let mut planned = Vec::new();
        for sub in self.selected(&targets) {
            let name = dir_name(&sub.path, &main);
            if self.strict {
                let dir = self.root.join(&name);
                log::debug!("Checking {} for {}", dir.display(), sub.path);
                if !self.probe.is_dir(&dir)? {
                    return Err(SubmodError::MissingSubmoduleDirectory(dir));
                }
            }
            planned.push((sub, format!(".{}{}", MAIN_SEPARATOR, name)));
        }

        let mut added = Vec::new();
        for (sub, target) in planned {
            self.file.add_replace(&sub.path, "", &target, "")?;
            log::info!("Replaced {} => {}", sub.path, target);
            added.extend(
                self.file
                    .replace
                    .iter()
                    .find(|r| r.old.path == sub.path && r.old.version.is_empty())
                    .cloned(),
            );
        }
        Ok(added)
    }

    /// Drops every local (`./`, `../`) replacement of the requested
    /// submodules, or of every submodule when `modules` is empty. Returns the
    /// replacements removed.
    ///
    /// The old-side version of a replacement is not compared.
    pub fn remove_replaces<S: AsRef<str>>(&mut self, modules: &[S]) -> Result<Vec<Replace>> {
        let requested = to_strings(modules);
        self.try_remove_replaces(&requested)
            .map_err(|e| e.in_manifest(&self.path, &requested))
    }

    fn try_remove_replaces(&mut self, requested: &[String]) -> Result<Vec<Replace>> {
        let targets = self.targets(requested)?;
        let subs: Vec<String> = self
            .selected(&targets)
            .into_iter()
            .map(|m| m.path)
            .collect();

        let doomed: Vec<Replace> = self
            .file
            .replace
            .iter()
            .filter(|r| subs.contains(&r.old.path) && r.new.path.starts_with('.'))
            .cloned()
            .collect();

        let mut dropped: Vec<Replace> = Vec::new();
        for r in doomed {
            if dropped.iter().any(|d| d.old == r.old) {
                continue;
            }
            if r.old.is_versioned() {
                log::warn!("Dropping replace pinned to {}", r.old);
            }
            self.file.drop_replace(&r.old.path, &r.old.version)?;
            log::info!("Dropped replace {} => {}", r.old, r.new);
            dropped.push(r);
        }
        Ok(dropped)
    }

    /// Cleans up and renders the manifest.
    pub fn format(&mut self) -> String {
        self.file.format()
    }

    fn targets(&self, requested: &[String]) -> Result<ModuleSet> {
        if requested.is_empty() {
            parse_modules(&self.submodule_paths())
        } else {
            parse_modules(requested)
        }
    }

    fn selected(&self, targets: &ModuleSet) -> Vec<ModuleVersion> {
        self.submodules()
            .into_iter()
            .filter(|r| targets.contains_path(&r.module))
            .map(|r| r.module.clone())
            .collect()
    }
}

/// Directory of a submodule relative to the main module: the major-version
/// suffix is not part of it.
fn dir_name(sub_path: &str, main_path: &str) -> String {
    let prefix = path::strip_major(sub_path);
    prefix
        .strip_prefix(main_path)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(prefix)
        .to_string()
}

fn to_strings<S: AsRef<str>>(modules: &[S]) -> Vec<String> {
    modules.iter().map(|m| m.as_ref().to_string()).collect()
}
