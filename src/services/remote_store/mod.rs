use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What a store hands back for an upload. Only `id` is needed to download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Provider identifier (e.g., "google_drive", "local")
    fn provider_id(&self) -> &'static str;

    /// Upload a local file, named after its base name remotely
    async fn upload(&self, local_path: &Path) -> Result<RemoteFile>;

    /// Fetch the content of `remote_id` into `dest_path`
    async fn download(&self, remote_id: &str, dest_path: &Path) -> Result<PathBuf>;
}

/// Picks a store by backend name, mirroring the `STORE_BACKEND` values
pub fn create_store(
    backend: &str,
    config: &crate::config::TransferConfig,
) -> Result<Box<dyn RemoteStore>> {
    match backend.to_lowercase().as_str() {
        "google_drive" | "gdrive" | "drive" => {
            let drive_config = crate::config::DriveConfig::from_env();
            Ok(Box::new(google_drive::GoogleDriveStore::new(&drive_config)?))
        }
        "local" | "local_dir" => Ok(Box::new(local_dir::LocalDirStore::new(
            config.local_store_dir.clone(),
        ))),
        _ => Err(anyhow::anyhow!("Unknown store backend '{}'", backend)),
    }
}

pub mod google_drive;
pub mod local_dir;
