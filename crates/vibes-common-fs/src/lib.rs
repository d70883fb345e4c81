//! File system utilities for the vibes toolset.
//!
//! Documents and rule files are always read whole and replaced whole; writes go
//! through a sibling temp file and a rename so a reader never sees a half-written
//! document.

pub mod path;

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use vibes_common_core::{Error, ErrorCode, Result};

/// Default read limit for documents and configuration files (8 MiB).
pub const DEFAULT_MAX_SIZE: usize = 8 * 1024 * 1024;

fn fs_error(code: ErrorCode, message: String, path: &Path, source: Option<io::Error>) -> Error {
    Error::FileSystem {
        code,
        message,
        path: Some(path.to_string_lossy().to_string()),
        source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
    }
}

/// Read a file to string with size limit.
pub fn read_to_string(path: impl AsRef<Path>, max_size: usize) -> Result<String> {
    let path = path.as_ref();

    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => fs_error(
            ErrorCode::FILE_NOT_FOUND,
            format!("file not found: {}", path.display()),
            path,
            Some(e),
        ),
        io::ErrorKind::PermissionDenied => fs_error(
            ErrorCode::FILE_READ_ERROR,
            format!("permission denied: {}", path.display()),
            path,
            Some(e),
        ),
        _ => fs_error(
            ErrorCode::FILE_READ_ERROR,
            format!("failed to read metadata: {}", path.display()),
            path,
            Some(e),
        ),
    })?;

    if metadata.is_dir() {
        return Err(fs_error(
            ErrorCode::FILE_READ_ERROR,
            format!("is a directory: {}", path.display()),
            path,
            None,
        ));
    }

    if metadata.len() as usize > max_size {
        return Err(fs_error(
            ErrorCode::FILE_TOO_LARGE,
            format!("file too large: {} bytes (max: {})", metadata.len(), max_size),
            path,
            None,
        ));
    }

    fs::read_to_string(path).map_err(|e| {
        fs_error(
            ErrorCode::FILE_READ_ERROR,
            format!("failed to read file: {}", path.display()),
            path,
            Some(e),
        )
    })
}

/// Write to a file atomically (write to temp, then rename).
pub fn write_atomic(path: impl AsRef<Path>, contents: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    ensure_dir(parent)?;

    let mut temp_path = path.to_path_buf();
    if let Some(name) = path.file_name() {
        temp_path.set_file_name(format!(".{}.tmp", name.to_string_lossy()));
    } else {
        temp_path.push(".tmp");
    }

    {
        let mut file = File::create(&temp_path).map_err(|e| {
            fs_error(
                ErrorCode::FILE_WRITE_ERROR,
                format!("failed to create temporary file: {}", temp_path.display()),
                &temp_path,
                Some(e),
            )
        })?;

        file.write_all(contents).map_err(|e| {
            fs_error(
                ErrorCode::FILE_WRITE_ERROR,
                format!("failed to write to temporary file: {}", temp_path.display()),
                &temp_path,
                Some(e),
            )
        })?;

        file.sync_all().map_err(|e| {
            fs_error(
                ErrorCode::FILE_WRITE_ERROR,
                format!("failed to sync temporary file: {}", temp_path.display()),
                &temp_path,
                Some(e),
            )
        })?;
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        fs_error(
            ErrorCode::FILE_WRITE_ERROR,
            format!("failed to rename temporary file to target: {}", path.display()),
            path,
            Some(e),
        )
    })?;

    Ok(())
}

/// Write string to file atomically.
pub fn write_string_atomic(path: impl AsRef<Path>, contents: &str) -> Result<()> {
    write_atomic(path, contents.as_bytes())
}

/// Ensure a directory exists.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| {
            fs_error(
                ErrorCode::FILE_WRITE_ERROR,
                format!("failed to create directory: {}", path.display()),
                path,
                Some(e),
            )
        })?;
    }
    Ok(())
}

/// Rename a file, keeping the error shape of the other helpers.
pub fn rename(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<()> {
    let (from, to) = (from.as_ref(), to.as_ref());
    fs::rename(from, to).map_err(|e| {
        let code = if e.kind() == io::ErrorKind::NotFound {
            ErrorCode::FILE_NOT_FOUND
        } else {
            ErrorCode::FILE_WRITE_ERROR
        };
        fs_error(
            code,
            format!("failed to rename {} to {}", from.display(), to.display()),
            from,
            Some(e),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = read_to_string(dir.path().join("missing.md"), 1024).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FILE_NOT_FOUND);
        assert!(err.is_not_found());
    }

    #[test]
    fn test_read_respects_size_limit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.md");
        fs::write(&path, "x".repeat(64)).unwrap();

        let err = read_to_string(&path, 10).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FILE_TOO_LARGE);
        assert_eq!(read_to_string(&path, 64).unwrap().len(), 64);
    }

    #[test]
    fn test_read_directory_fails() {
        let dir = tempdir().unwrap();
        let err = read_to_string(dir.path(), 1024).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FILE_READ_ERROR);
    }

    #[test]
    fn test_write_atomic_replaces_content_and_leaves_no_temp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("doc.md");

        write_string_atomic(&path, "first").unwrap();
        write_string_atomic(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!dir.path().join("nested").join(".doc.md.tmp").exists());
    }

    #[test]
    fn test_rename_missing_source() {
        let dir = tempdir().unwrap();
        let err = rename(dir.path().join("a"), dir.path().join("b")).unwrap_err();
        assert!(err.is_not_found());
    }
}
