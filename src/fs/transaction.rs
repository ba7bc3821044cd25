//! Staged manifest write.
//!
//! ## Execution Guarantees
//!
//! - **Atomic writes**: the file is written to a sibling temp file and renamed
//!   over the original, so readers never see a half-written go.mod
//! - **Idempotency**: unchanged content is never written
//!
//! ## Example
//!
//! ```no_run
//! # use gosubmod::fs::Transaction;
//! # use std::path::PathBuf;
//! # fn example() -> gosubmod::error::Result<()> {
//! let mut txn = Transaction::new(false);
//! txn.update_file(PathBuf::from("go.mod"), "module example.com/a\n".into())?;
//! txn.commit()?;
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, SubmodError};

use colored::Colorize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
struct FileUpdate {
    path: PathBuf,
    new: String,
}

/// A single file update, written on [`commit`](Transaction::commit).
///
/// ## Dry-Run Mode
///
/// When `dry_run = true`, the update is staged and reported but never written.
#[must_use = "Transaction must be committed"]
pub struct Transaction {
    update: Option<FileUpdate>,
    dry_run: bool,
    committed: bool,
}

impl Transaction {
    pub fn new(dry_run: bool) -> Self {
        Self {
            update: None,
            dry_run,
            committed: false,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// True when there is nothing to write.
    pub fn is_empty(&self) -> bool {
        self.update.is_none()
    }

    /// Stages new content for `path`.
    ///
    /// Reads the current content; if it equals `new_content` nothing is staged.
    pub fn update_file(&mut self, path: PathBuf, new_content: String) -> Result<()> {
        if self.committed {
            return Err(SubmodError::Other(anyhow::anyhow!(
                "Cannot modify transaction after commit"
            )));
        }

        log::debug!("Staging update for: {}", path.display());

        let original = fs::read_to_string(&path).map_err(|e| {
            log::error!("Failed to read {}: {}", path.display(), e);
            SubmodError::Io(io::Error::new(
                e.kind(),
                format!("Failed to read {}: {}", path.display(), e),
            ))
        })?;

        if original == new_content {
            log::debug!("Content unchanged, skipping: {}", path.display());
            self.update = None;
            return Ok(());
        }

        if self.dry_run {
            log::info!("Would update: {}", path.display());
        }

        self.update = Some(FileUpdate {
            path,
            new: new_content,
        });
        Ok(())
    }

    /// Writes the staged update, if any.
    pub fn commit(&mut self) -> Result<()> {
        if self.committed {
            return Err(SubmodError::Other(anyhow::anyhow!(
                "Transaction already committed"
            )));
        }
        self.committed = true;

        let Some(update) = &self.update else {
            return Ok(());
        };
        if self.dry_run {
            return Ok(());
        }

        let path = &update.path;
        let metadata = fs::metadata(path).map_err(|e| {
            SubmodError::Io(io::Error::new(
                e.kind(),
                format!("File no longer exists: {}", path.display()),
            ))
        })?;
        if metadata.permissions().readonly() {
            return Err(SubmodError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("File is read-only: {}", path.display()),
            )));
        }

        write_atomic(path, &update.new).map_err(|e| {
            log::error!("Failed to write {}: {}", path.display(), e);
            SubmodError::Io(io::Error::new(
                e.kind(),
                format!("Failed to write {}: {}", path.display(), e),
            ))
        })?;
        log::debug!("Updated: {}", path.display());
        Ok(())
    }

    /// Prints what changed to stderr.
    ///
    /// `directives` are the go.mod directives added or dropped, listed under
    /// `heading`. The path is shown relative to `root` with forward slashes.
    pub fn print_summary(&self, root: &Path, heading: &str, directives: &[String]) {
        let Some(update) = &self.update else {
            eprintln!("{}", "No changes needed".yellow());
            return;
        };

        let relative =
            pathdiff::diff_paths(&update.path, root).unwrap_or_else(|| update.path.clone());
        let display = relative.to_string_lossy().replace('\\', "/");

        if self.dry_run {
            eprintln!("\n{}", "DRY RUN - No changes will be made".yellow().bold());
        } else {
            eprintln!("\n{}", "Changes applied:".green().bold());
        }

        if !directives.is_empty() {
            eprintln!("\n{}", heading.bold());
            for directive in directives {
                if self.dry_run {
                    eprintln!("   • {}", directive);
                } else {
                    eprintln!("   {} {}", "✓".green(), directive);
                }
            }
        }

        eprintln!();
        if self.dry_run {
            eprintln!(
                "{} will be modified. Run without {} to apply.",
                display.cyan().bold(),
                "--dry-run".cyan()
            );
        } else {
            eprintln!("{} Updated {}", "✓".green().bold(), display.dimmed());
        }
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if !self.committed && self.update.is_some() && !self.dry_run {
            log::warn!("Transaction dropped without commit");
        }
    }
}

/// Writes `content` to a temp file next to `path`, then renames it over `path`.
///
/// The original file's permissions are carried over.
fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    fs::write(&tmp, content)?;
    let result = fs::metadata(path)
        .and_then(|meta| fs::set_permissions(&tmp, meta.permissions()))
        .and_then(|_| fs::rename(&tmp, path));

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn go_mod(temp: &TempDir, content: &str) -> PathBuf {
        let path = temp.path().join("go.mod");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_new_transaction() {
        let txn = Transaction::new(false);
        assert!(!txn.is_dry_run());
        assert!(txn.is_empty());
    }

    #[test]
    fn test_update_file_stages_without_writing() {
        let temp = TempDir::new().unwrap();
        let path = go_mod(&temp, "module example.com/a\n");

        let mut txn = Transaction::new(true);
        txn.update_file(path.clone(), "module example.com/b\n".to_string())
            .unwrap();

        assert!(!txn.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "module example.com/a\n");
    }

    #[test]
    fn test_update_file_no_change_skips() {
        let temp = TempDir::new().unwrap();
        let path = go_mod(&temp, "module example.com/a\n");

        let mut txn = Transaction::new(false);
        txn.update_file(path, "module example.com/a\n".to_string())
            .unwrap();

        assert!(txn.is_empty());
        txn.commit().unwrap();
    }

    #[test]
    fn test_update_file_nonexistent_fails() {
        let temp = TempDir::new().unwrap();
        let mut txn = Transaction::new(false);
        let result = txn.update_file(temp.path().join("go.mod"), "x".to_string());

        assert!(matches!(result, Err(SubmodError::Io(_))));
    }

    #[test]
    fn test_dry_run_commit_does_not_write() {
        let temp = TempDir::new().unwrap();
        let path = go_mod(&temp, "original\n");

        let mut txn = Transaction::new(true);
        txn.update_file(path.clone(), "modified\n".to_string())
            .unwrap();
        txn.commit().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "original\n");
    }

    #[test]
    fn test_commit_writes_and_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let path = go_mod(&temp, "original\n");

        let mut txn = Transaction::new(false);
        txn.update_file(path.clone(), "modified\n".to_string())
            .unwrap();
        txn.commit().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "modified\n");
        let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_commit_twice_fails() {
        let mut txn = Transaction::new(false);
        txn.commit().unwrap();
        assert!(txn.commit().is_err());
    }

    #[test]
    fn test_update_after_commit_fails() {
        let temp = TempDir::new().unwrap();
        let path = go_mod(&temp, "original\n");

        let mut txn = Transaction::new(false);
        txn.commit().unwrap();
        assert!(txn.update_file(path, "modified\n".to_string()).is_err());
    }

    #[test]
    fn test_commit_refuses_read_only_file() {
        let temp = TempDir::new().unwrap();
        let path = go_mod(&temp, "original\n");

        let mut txn = Transaction::new(false);
        txn.update_file(path.clone(), "modified\n".to_string())
            .unwrap();

        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&path, perms).unwrap();

        let result = txn.commit();
        assert!(matches!(
            result,
            Err(SubmodError::Io(e)) if e.kind() == io::ErrorKind::PermissionDenied
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), "original\n");

        let mut perms = fs::metadata(&path).unwrap().permissions();
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
        fs::set_permissions(&path, perms).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_commit_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = go_mod(&temp, "original\n");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        let mut txn = Transaction::new(false);
        txn.update_file(path.clone(), "modified\n".to_string())
            .unwrap();
        txn.commit().unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[test]
    fn test_print_summary() {
        let temp = TempDir::new().unwrap();
        let path = go_mod(&temp, "original\n");

        let empty = Transaction::new(false);
        empty.print_summary(temp.path(), "Added", &[]);

        let mut txn = Transaction::new(true);
        txn.update_file(path, "modified\n".to_string()).unwrap();
        txn.print_summary(
            temp.path(),
            "Added",
            &["replace example.com/a/b => ./b".to_string()],
        );
    }
}
