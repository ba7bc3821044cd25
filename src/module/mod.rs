//! Go module identifiers.
//!
//! - **`path`**: module path validation and major-version suffix handling
//! - **`semver`**: Go-flavoured semantic version parsing and canonicalization
//! - **`version`**: `ModuleVersion` and parsing of `path[@version]` specs

pub mod path;
pub mod semver;
pub mod version;

pub use version::{ModuleSet, ModuleVersion, parse_modules};
