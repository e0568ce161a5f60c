//! File copy primitive used by the walker

use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Reasons a single file copy can fail
#[derive(Debug, Error)]
pub enum CopyError {
    #[error("file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("no permission to read: {}", .0.display())]
    ReadPermission(PathBuf),

    #[error("no permission to write: {}", .0.display())]
    WritePermission(PathBuf),

    #[error("source and destination are the same file: {}", .0.display())]
    SameFile(PathBuf),

    #[error("{}: {error}", .path.display())]
    Io { path: PathBuf, error: io::Error },
}

/// Copy `src` to `dst`, creating or truncating `dst`.
///
/// Returns the number of bytes written. Parent directories of `dst` are not
/// created.
pub fn copy_file(dst: &Path, src: &Path) -> Result<u64, CopyError> {
    let input = File::open(src).map_err(|e| read_error(src, e))?;

    // Creating the destination would truncate the source
    if is_same_file(dst, src) {
        return Err(CopyError::SameFile(src.to_path_buf()));
    }

    let output = File::create(dst).map_err(|e| write_error(dst, e))?;

    let mut reader = BufReader::new(input);
    let mut writer = BufWriter::new(output);

    let written = io::copy(&mut reader, &mut writer).map_err(|error| CopyError::Io {
        path: dst.to_path_buf(),
        error,
    })?;
    writer.flush().map_err(|error| CopyError::Io {
        path: dst.to_path_buf(),
        error,
    })?;

    Ok(written)
}

/// Check whether anything exists at `path`.
///
/// Only a definite "not found" counts as missing; a path that cannot be
/// inspected for other reasons is treated as existing.
pub fn exists(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(_) => true,
        Err(e) => e.kind() != ErrorKind::NotFound,
    }
}

#[cfg(unix)]
fn is_same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    // Hard links share the inode but not the canonical path
    match (std::fs::metadata(a), std::fs::metadata(b)) {
        (Ok(a), Ok(b)) => (a.dev(), a.ino()) == (b.dev(), b.ino()),
        _ => false,
    }
}

#[cfg(not(unix))]
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn read_error(src: &Path, e: io::Error) -> CopyError {
    match e.kind() {
        ErrorKind::NotFound => CopyError::SourceNotFound(src.to_path_buf()),
        ErrorKind::PermissionDenied => CopyError::ReadPermission(src.to_path_buf()),
        _ => CopyError::Io {
            path: src.to_path_buf(),
            error: e,
        },
    }
}

fn write_error(dst: &Path, e: io::Error) -> CopyError {
    match e.kind() {
        ErrorKind::PermissionDenied => CopyError::WritePermission(dst.to_path_buf()),
        _ => CopyError::Io {
            path: dst.to_path_buf(),
            error: e,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use predicates::prelude::*;

    #[test]
    fn test_copy_creates_destination() {
        let temp = assert_fs::TempDir::new().unwrap();
        let src = temp.child("a.txt");
        src.write_str("hello").unwrap();
        let dst = temp.child("b.txt");

        let written = copy_file(dst.path(), src.path()).unwrap();

        assert_eq!(written, 5);
        dst.assert("hello");
        src.assert("hello");
    }

    #[test]
    fn test_copy_replaces_existing_content() {
        let temp = assert_fs::TempDir::new().unwrap();
        let src = temp.child("a.txt");
        src.write_str("new").unwrap();
        let dst = temp.child("b.txt");
        dst.write_str("old and longer").unwrap();

        copy_file(dst.path(), src.path()).unwrap();

        dst.assert("new");
    }

    #[test]
    fn test_missing_source() {
        let temp = assert_fs::TempDir::new().unwrap();
        let dst = temp.child("b.txt");

        let err = copy_file(dst.path(), &temp.path().join("missing.txt")).unwrap_err();

        assert!(matches!(err, CopyError::SourceNotFound(_)));
        assert!(err.to_string().starts_with("file not found: "));
        dst.assert(predicate::path::missing());
    }

    #[test]
    fn test_missing_destination_directory_is_io_error() {
        let temp = assert_fs::TempDir::new().unwrap();
        let src = temp.child("a.txt");
        src.write_str("data").unwrap();

        let err = copy_file(&temp.path().join("nodir").join("b.txt"), src.path()).unwrap_err();

        assert!(matches!(err, CopyError::Io { .. }));
    }

    #[test]
    fn test_copy_onto_itself_keeps_content() {
        let temp = assert_fs::TempDir::new().unwrap();
        let src = temp.child("a.txt");
        src.write_str("keep me").unwrap();

        let err = copy_file(src.path(), src.path()).unwrap_err();

        assert!(matches!(err, CopyError::SameFile(_)));
        src.assert("keep me");
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_onto_hard_link_keeps_content() {
        let temp = assert_fs::TempDir::new().unwrap();
        let src = temp.child("a.txt");
        src.write_str("hello").unwrap();
        let link = temp.child("link.txt");
        std::fs::hard_link(src.path(), link.path()).unwrap();

        let err = copy_file(link.path(), src.path()).unwrap_err();

        assert!(matches!(err, CopyError::SameFile(_)));
        src.assert("hello");
        link.assert("hello");
    }

    #[test]
    fn test_permission_errors_classified() {
        let denied = || io::Error::from(ErrorKind::PermissionDenied);

        let err = read_error(Path::new("src.txt"), denied());
        assert_eq!(err.to_string(), "no permission to read: src.txt");

        let err = write_error(Path::new("dst.txt"), denied());
        assert_eq!(err.to_string(), "no permission to write: dst.txt");

        let err = write_error(Path::new("dst.txt"), io::Error::from(ErrorKind::NotFound));
        assert!(matches!(err, CopyError::Io { .. }));
    }

    #[test]
    fn test_exists() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("present");
        file.touch().unwrap();

        assert!(exists(file.path()));
        assert!(exists(temp.path()));
        assert!(!exists(&temp.path().join("absent")));
    }
}
