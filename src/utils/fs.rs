//! Directory move/copy primitives backing the default [`FileMover`]
//! implementation.
//!
//! [`FileMover`]: crate::installer::FileMover

use std::fs;
use std::io;
use std::path::Path;

/// Moves a directory, replacing the destination if it exists.
///
/// Prefers an atomic `rename`; falls back to recursive copy plus removal
/// when the move crosses filesystems.
pub fn move_dir(from: &Path, to: &Path) -> io::Result<()> {
    if to.exists() {
        fs::remove_dir_all(to)?;
    }

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            copy_dir(from, to)?;
            fs::remove_dir_all(from)
        }
        Err(e) => Err(e),
    }
}

/// Recursively copies a directory tree.
pub fn copy_dir(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_dir_renames() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("nested/file.txt"), "content").unwrap();

        let dst = dir.path().join("dst");
        move_dir(&src, &dst).unwrap();

        assert!(!src.exists());
        assert_eq!(
            fs::read_to_string(dst.join("nested/file.txt")).unwrap(),
            "content"
        );
    }

    #[test]
    fn test_move_dir_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("new.txt"), "new").unwrap();
        let dst = dir.path().join("dst");
        fs::create_dir(&dst).unwrap();
        fs::write(dst.join("old.txt"), "old").unwrap();

        move_dir(&src, &dst).unwrap();

        assert!(dst.join("new.txt").is_file());
        assert!(!dst.join("old.txt").exists());
    }

    #[test]
    fn test_copy_dir_preserves_tree() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a");
        fs::create_dir_all(src.join("b/c")).unwrap();
        fs::write(src.join("b/c/leaf.txt"), "x").unwrap();

        let dst = dir.path().join("copy");
        copy_dir(&src, &dst).unwrap();

        assert!(src.exists());
        assert_eq!(fs::read_to_string(dst.join("b/c/leaf.txt")).unwrap(), "x");
    }
}
