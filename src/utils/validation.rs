use crate::error::{Result, TransferError};
use std::path::{Component, Path, PathBuf};

/// Checks that a remote id can double as a local file name.
/// Drive ids are URL-safe, but other backends make no such promise.
pub fn validate_file_name(name: &str) -> Result<&str> {
    if name.is_empty() {
        return Err(TransferError::InvalidName(
            "File name cannot be empty".to_string(),
        ));
    }

    if name.contains('/') || name.contains('\\') || name.chars().any(|c| c.is_control()) {
        tracing::warn!("Path traversal attempt detected: {}", name);
        return Err(TransferError::InvalidName(format!(
            "'{}' is not a single path component",
            name
        )));
    }

    if name == "." || name == ".." {
        return Err(TransferError::InvalidName(format!(
            "'{}' is a reserved name",
            name
        )));
    }

    Ok(name)
}

/// Drops trailing separators, so `a/b/` and `a/b` name the same folder.
pub fn normalize_dir_path(path: &Path) -> PathBuf {
    // `components()` already ignores trailing separators and `.` segments
    // after the first one.
    let normalized: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

/// Base name of a path, as UTF-8 when possible.
pub fn base_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            TransferError::InvalidName(format!("'{}' has no base name", path.display()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("1AbC-xyz_09").is_ok());
        assert!(validate_file_name("report.zip").is_ok());
        assert!(validate_file_name("").is_err());
        assert!(validate_file_name("../etc").is_err());
        assert!(validate_file_name("a\\b").is_err());
        assert!(validate_file_name("..").is_err());
        assert!(validate_file_name("bad\nname").is_err());
    }

    #[test]
    fn test_validate_file_name_is_precondition() {
        let err = validate_file_name("a/b").unwrap_err();
        assert!(err.is_precondition());
    }

    #[test]
    fn test_normalize_trailing_separator() {
        assert_eq!(
            normalize_dir_path(Path::new("/a/b/myfolder/")),
            normalize_dir_path(Path::new("/a/b/myfolder"))
        );
        assert_eq!(
            normalize_dir_path(Path::new("/a/b/myfolder/")),
            PathBuf::from("/a/b/myfolder")
        );
        assert_eq!(normalize_dir_path(Path::new("./")), PathBuf::from("."));
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name(Path::new("/a/b/myfolder")).unwrap(), "myfolder");
        assert_eq!(base_name(Path::new("notes.txt")).unwrap(), "notes.txt");
        assert!(base_name(Path::new("/")).is_err());
    }
}
