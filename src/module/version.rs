//! Module identifiers and module spec parsing.

use crate::error::{Result, SubmodError};
use crate::module::{path, semver};
use std::fmt;

/// A module path paired with an optional canonical version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ModuleVersion {
    pub path: String,
    /// Empty when unversioned.
    pub version: String,
}

impl ModuleVersion {
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
        }
    }

    /// A bare path with no version.
    pub fn unversioned(path: impl Into<String>) -> Self {
        Self::new(path, "")
    }

    /// Parses a `path` or `path@version` spec.
    ///
    /// The major-version suffix (`/v2`) stays part of the path. A supplied
    /// version must be valid semver and agree with that suffix; it is stored
    /// in canonical form.
    pub fn parse(spec: &str) -> Result<Self> {
        let invalid = |reason: String| SubmodError::InvalidModulePath(spec.to_string(), reason);

        let (module_path, version) = match spec.split_once('@') {
            Some((p, v)) => (p, Some(v)),
            None => (spec, None),
        };

        path::check_path(module_path).map_err(invalid)?;

        let Some(version) = version else {
            return Ok(Self::unversioned(module_path));
        };

        let canonical = semver::canonical_module_version(version)
            .ok_or_else(|| invalid(format!("invalid version '{}'", version)))?;
        let (_, path_major) = path::split_path_version(module_path)
            .ok_or_else(|| invalid("invalid version".to_string()))?;
        path::check_path_major(&canonical, path_major)
            .map_err(|reason| invalid(format!("version {}: {}", version, reason)))?;

        Ok(Self::new(module_path, canonical))
    }

    pub fn is_versioned(&self) -> bool {
        !self.version.is_empty()
    }
}

impl fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{}@{}", self.path, self.version)
        }
    }
}

/// An ordered set of parsed module specs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSet(Vec<ModuleVersion>);

impl ModuleSet {
    /// Reports whether any member has the same path as `module`.
    ///
    /// Versions are not compared.
    pub fn contains_path(&self, module: &ModuleVersion) -> bool {
        self.0.iter().any(|m| m.path == module.path)
    }
}

/// Parses every spec, failing on the first invalid one.
pub fn parse_modules<S: AsRef<str>>(specs: &[S]) -> Result<ModuleSet> {
    specs
        .iter()
        .map(|s| ModuleVersion::parse(s.as_ref()))
        .collect::<Result<Vec<_>>>()
        .map(ModuleSet)
}
