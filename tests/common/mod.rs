//! Shared fixtures for gosubmod integration tests
//!
//! These helpers create real Go module layouts in temp directories and run the
//! binary against them.

use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[allow(unused)]
pub const WITHOUT_REPLACES: &str = "module example.com/a

require (
\texample.com/a/b v1.0.0
\texample.com/a/c/v2 v2.0.0
)
";

#[allow(unused)]
pub const WITH_REPLACES: &str = "module example.com/a

require (
\texample.com/a/b v1.0.0
\texample.com/a/c/v2 v2.0.0
)

replace example.com/a/b => ./b

replace example.com/a/c/v2 => ./c
";

/// Creates a module root with the given go.mod and submodule directories.
#[allow(unused)]
pub fn create_module(go_mod: &str, subdirs: &[&str]) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("go.mod"), go_mod).unwrap();

    for dir in subdirs {
        let sub = temp.path().join(dir);
        fs::create_dir_all(&sub).unwrap();
        fs::write(
            sub.join("go.mod"),
            format!("module example.com/a/{}\n", dir),
        )
        .unwrap();
    }

    temp
}

/// The standard layout: `example.com/a` with submodules `b` and `c` (v2).
#[allow(unused)]
pub fn create_test_module() -> TempDir {
    create_module(WITHOUT_REPLACES, &["b", "c"])
}

#[allow(unused)]
pub fn read_go_mod(root: &Path) -> String {
    fs::read_to_string(root.join("go.mod")).unwrap()
}

/// Runs gosubmod in `root`.
pub fn run_gosubmod(root: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = cargo_bin_cmd!("gosubmod");
    cmd.args(args).current_dir(root).env_remove("RUST_LOG");

    cmd.assert()
}
