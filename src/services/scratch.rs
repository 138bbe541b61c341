use crate::error::Result;
use std::path::{Path, PathBuf};

/// Hands out integer-named staging directories under a fixed root.
///
/// Every call rescans from `0` and takes the lowest free name, so gaps left
/// by removed directories are reused. The check and the `mkdir` are two
/// separate steps: one process, one thread.
#[derive(Debug, Clone)]
pub struct ScratchSpace {
    root: PathBuf,
}

impl ScratchSpace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn allocate(&self) -> Result<PathBuf> {
        if !self.root.exists() {
            tracing::debug!("Creating scratch root {}", self.root.display());
            std::fs::create_dir_all(&self.root)?;
        }

        let mut counter: u64 = 0;
        loop {
            let candidate = self.root.join(counter.to_string());
            if candidate.exists() {
                counter += 1;
                continue;
            }

            std::fs::create_dir(&candidate)?;
            tracing::debug!("Allocated scratch directory {}", candidate.display());
            return Ok(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_empty_root() {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = ScratchSpace::new(tmp.path().join("scratch"));

        let dir = scratch.allocate().unwrap();
        assert_eq!(dir, tmp.path().join("scratch").join("0"));
        assert!(dir.is_dir());
    }

    #[test]
    fn test_allocate_after_existing() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["0", "1", "2"] {
            std::fs::create_dir_all(tmp.path().join(name)).unwrap();
        }

        let scratch = ScratchSpace::new(tmp.path());
        assert_eq!(scratch.allocate().unwrap(), tmp.path().join("3"));
    }

    #[test]
    fn test_allocate_fills_gap() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["0", "2"] {
            std::fs::create_dir_all(tmp.path().join(name)).unwrap();
        }

        let scratch = ScratchSpace::new(tmp.path());
        assert_eq!(scratch.allocate().unwrap(), tmp.path().join("1"));
        assert_eq!(scratch.allocate().unwrap(), tmp.path().join("3"));
    }

    #[test]
    fn test_plain_file_occupies_name() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("0"), b"not a dir").unwrap();

        let scratch = ScratchSpace::new(tmp.path());
        assert_eq!(scratch.allocate().unwrap(), tmp.path().join("1"));
    }

    #[test]
    fn test_sequential_calls_are_unique() {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = ScratchSpace::new(tmp.path());

        let first = scratch.allocate().unwrap();
        let second = scratch.allocate().unwrap();
        assert_ne!(first, second);
        assert!(first.is_dir() && second.is_dir());
    }
}
