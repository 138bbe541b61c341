use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Not an archive: {}", .0.display())]
    NotAnArchive(PathBuf),

    #[error("Expected exactly one file in {}, found {found} entries", .archive.display())]
    UnexpectedEntryCount { archive: PathBuf, found: usize },

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Not Found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Remote store error: {0}")]
    Remote(#[from] anyhow::Error),
}

impl TransferError {
    /// True for the failures raised by our own checks rather than by the
    /// filesystem, the zip reader or the remote store.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            TransferError::NotAnArchive(_)
                | TransferError::UnexpectedEntryCount { .. }
                | TransferError::InvalidName(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TransferError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_kinds() {
        assert!(TransferError::NotAnArchive(PathBuf::from("a.bin")).is_precondition());
        assert!(
            TransferError::UnexpectedEntryCount {
                archive: PathBuf::from("a.zip"),
                found: 2,
            }
            .is_precondition()
        );
        assert!(!TransferError::NotFound(PathBuf::from("missing")).is_precondition());
        assert!(!TransferError::Remote(anyhow::anyhow!("boom")).is_precondition());
    }

    #[test]
    fn test_display_includes_path() {
        let err = TransferError::NotAnArchive(PathBuf::from("/tmp/abc"));
        assert_eq!(err.to_string(), "Not an archive: /tmp/abc");
    }
}
