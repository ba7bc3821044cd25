//! Directory existence checks used by strict mode.

use std::fs;
use std::io;
use std::path::Path;

/// Answers whether a path is an existing directory.
pub trait DirectoryProbe {
    /// Returns `Ok(false)` when nothing exists at `path`.
    fn is_dir(&self, path: &Path) -> io::Result<bool>;
}

/// Probes the real file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl DirectoryProbe for FsProbe {
    fn is_dir(&self, path: &Path) -> io::Result<bool> {
        match fs::metadata(path) {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fs_probe() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("go.mod");
        fs::write(&file, "module example.com/a\n").unwrap();

        let probe = FsProbe;
        assert!(probe.is_dir(temp.path()).unwrap());
        assert!(!probe.is_dir(&file).unwrap());
        assert!(!probe.is_dir(&temp.path().join("missing")).unwrap());
    }
}
