//! Deciding which requirements are submodules.

/// Decides whether a required module is nested under the main module.
pub trait SubmodulePolicy {
    fn is_submodule(&self, path: &str, main_path: &str) -> bool;
}

/// Textual prefix match: `example.com/a/b` is a submodule of `example.com/a`.
///
/// The target directory is not checked for a go.mod of its own, so
/// `example.com/ab` also matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixMatch;

impl SubmodulePolicy for PrefixMatch {
    fn is_submodule(&self, path: &str, main_path: &str) -> bool {
        !main_path.is_empty() && path.len() > main_path.len() && path.starts_with(main_path)
    }
}
