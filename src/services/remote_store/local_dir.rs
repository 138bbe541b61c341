use super::{RemoteFile, RemoteStore};
use crate::utils::validation::validate_file_name;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// A store backed by a plain directory: `<root>/<id>/<file name>`.
pub struct LocalDirStore {
    root: PathBuf,
}

impl LocalDirStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    async fn stored_file(&self, remote_id: &str) -> Result<PathBuf> {
        validate_file_name(remote_id)?;
        let slot = self.root.join(remote_id);

        let mut entries = fs::read_dir(&slot)
            .await
            .map_err(|e| anyhow!("Unknown file id '{}': {}", remote_id, e))?;

        let mut found = None;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                if found.is_some() {
                    return Err(anyhow!("Slot '{}' holds more than one file", remote_id));
                }
                found = Some(entry.path());
            }
        }

        found.ok_or_else(|| anyhow!("Slot '{}' is empty", remote_id))
    }
}

#[async_trait]
impl RemoteStore for LocalDirStore {
    fn provider_id(&self) -> &'static str {
        "local"
    }

    async fn upload(&self, local_path: &Path) -> Result<RemoteFile> {
        let name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("'{}' has no file name", local_path.display()))?;

        let id = uuid::Uuid::new_v4().simple().to_string();
        let slot = self.root.join(&id);
        fs::create_dir_all(&slot).await?;
        fs::copy(local_path, slot.join(&name)).await?;

        Ok(RemoteFile { id, name })
    }

    async fn download(&self, remote_id: &str, dest_path: &Path) -> Result<PathBuf> {
        let stored = self.stored_file(remote_id).await?;
        if let Some(parent) = dest_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::copy(&stored, dest_path).await?;
        Ok(dest_path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_then_download() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("report.csv");
        std::fs::write(&source, b"a,b\n1,2\n").unwrap();

        let store = LocalDirStore::new(tmp.path().join("store"));
        let remote = store.upload(&source).await.unwrap();
        assert_eq!(remote.name, "report.csv");

        let dest = tmp.path().join("out/copy.csv");
        let path = store.download(&remote.id, &dest).await.unwrap();
        assert_eq!(path, dest);
        assert_eq!(std::fs::read(&dest).unwrap(), b"a,b\n1,2\n");
    }

    #[tokio::test]
    async fn test_unknown_id() {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalDirStore::new(tmp.path().to_path_buf());
        assert!(store.download("missing", &tmp.path().join("x")).await.is_err());
        assert!(store.download("../escape", &tmp.path().join("x")).await.is_err());
    }

    #[tokio::test]
    async fn test_ids_are_distinct() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("a.txt");
        std::fs::write(&source, b"a").unwrap();

        let store = LocalDirStore::new(tmp.path().join("store"));
        let first = store.upload(&source).await.unwrap();
        let second = store.upload(&source).await.unwrap();
        assert_ne!(first.id, second.id);
    }
}
