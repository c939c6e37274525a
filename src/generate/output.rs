//! Writing rendered artifacts to disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, XmiError};

/// Resolve a rendered destination against the output folder.
///
/// Absolute destinations are used as-is; relative ones are joined to
/// `output_folder` when one is configured, otherwise left relative to the
/// working directory.
pub(crate) fn resolve_dest(output_folder: Option<&Path>, dest: &str) -> Option<PathBuf> {
    let dest = dest.trim();
    if dest.is_empty() {
        return None;
    }
    let path = PathBuf::from(dest);
    Some(match output_folder {
        Some(base) if path.is_relative() => base.join(path),
        _ => path,
    })
}

/// Replace the file at `path` with `contents`, creating parent directories.
pub(crate) fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|err| XmiError::io(dir, err))?;
        }
    }
    fs::write(path, contents).map_err(|err| XmiError::io(path, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_dest() {
        let base = Path::new("/out");
        assert_eq!(resolve_dest(Some(base), "a/b.py"), Some(PathBuf::from("/out/a/b.py")));
        assert_eq!(resolve_dest(Some(base), "/abs/b.py"), Some(PathBuf::from("/abs/b.py")));
        assert_eq!(resolve_dest(None, "a/b.py"), Some(PathBuf::from("a/b.py")));
        assert_eq!(resolve_dest(Some(base), "  "), None);
    }

    #[test]
    fn test_write_creates_parents_and_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep/nested/file.txt");

        write_file(&path, "first version").unwrap();
        write_file(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_write_into_file_parent_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        let err = write_file(&blocker.join("child.txt"), "y").unwrap_err();
        assert!(matches!(err, XmiError::Io { .. }));
    }
}
