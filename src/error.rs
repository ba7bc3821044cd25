//! Error types for gosubmod.
//!
//! All operations return `Result<T>` which aliases `Result<T, SubmodError>`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from submodule operations.
#[derive(Debug, Error)]
pub enum SubmodError {
    /// Module path (or `path@version` spec) failed validation.
    #[error("Invalid module path '{0}': {1}")]
    InvalidModulePath(String, String),

    /// Strict mode expected a submodule directory that is not there.
    #[error("Expected {} to be a directory", .0.display())]
    MissingSubmoduleDirectory(PathBuf),

    /// go.mod syntax or directive error.
    #[error("{file}:{line}: {message}")]
    ManifestParse {
        file: String,
        line: usize,
        message: String,
    },

    /// Adding or dropping a directive failed.
    #[error("Cannot update go.mod: {0}")]
    ManifestMutation(String),

    /// An error that crossed the manifest facade, with the manifest path and
    /// the modules requested on the command line.
    #[error("{}: modules [{}]: {source}", .path.display(), .modules.join(", "))]
    Manifest {
        path: PathBuf,
        modules: Vec<String>,
        #[source]
        source: Box<SubmodError>,
    },

    /// File system operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Unexpected error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SubmodError {
    /// Wraps `self` with the manifest path and requested modules.
    ///
    /// Already-wrapped errors are returned unchanged.
    pub fn in_manifest(self, path: impl Into<PathBuf>, modules: &[String]) -> Self {
        match self {
            wrapped @ SubmodError::Manifest { .. } => wrapped,
            other => SubmodError::Manifest {
                path: path.into(),
                modules: modules.to_vec(),
                source: Box::new(other),
            },
        }
    }

    /// Returns the innermost error, looking through manifest context.
    pub fn root(&self) -> &SubmodError {
        match self {
            SubmodError::Manifest { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias for gosubmod operations.
pub type Result<T> = std::result::Result<T, SubmodError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_context_display() {
        let err = SubmodError::MissingSubmoduleDirectory(PathBuf::from("/work/a/b"))
            .in_manifest("/work/a/go.mod", &["example.com/a/b".to_string()]);

        assert_eq!(
            err.to_string(),
            "/work/a/go.mod: modules [example.com/a/b]: Expected /work/a/b to be a directory"
        );
        assert!(matches!(
            err.root(),
            SubmodError::MissingSubmoduleDirectory(_)
        ));
    }

    #[test]
    fn test_in_manifest_does_not_nest() {
        let err = SubmodError::ManifestMutation("boom".into())
            .in_manifest("go.mod", &[])
            .in_manifest("other/go.mod", &["x".to_string()]);

        match err {
            SubmodError::Manifest { path, modules, .. } => {
                assert_eq!(path, PathBuf::from("go.mod"));
                assert!(modules.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
