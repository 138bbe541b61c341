use crate::config::TransferConfig;
use crate::error::{Result, TransferError};
use crate::services::archive;
use crate::services::remote_store::{RemoteFile, RemoteStore};
use crate::services::scratch::ScratchSpace;
use crate::utils::validation::{base_name, normalize_dir_path, validate_file_name};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Uploads and downloads files and folders, zipping and unzipping on the way.
pub struct TransferService {
    store: Arc<dyn RemoteStore>,
    scratch: ScratchSpace,
    work_dir: PathBuf,
}

impl TransferService {
    pub fn new(store: Arc<dyn RemoteStore>, config: TransferConfig) -> Self {
        Self {
            store,
            scratch: ScratchSpace::new(config.scratch_root),
            work_dir: config.work_dir,
        }
    }

    pub fn scratch(&self) -> &ScratchSpace {
        &self.scratch
    }

    /// Zips `dir_path` into `<work_dir>/<base name>.zip` and uploads that archive.
    pub async fn upload_folder(&self, dir_path: &Path) -> Result<RemoteFile> {
        let dir = named_source(dir_path)?;
        let name = base_name(&dir)?;

        std::fs::create_dir_all(&self.work_dir)?;
        let archive_path = archive::pack(&dir, self.work_dir.join(&name))?;
        info!(
            "📦 Packed folder {} into {}",
            dir.display(),
            archive_path.display()
        );

        self.upload_archive(&archive_path).await
    }

    /// Uploads `path`, zipping it first into `<path>.zip` when `compress` is set.
    pub async fn upload_file(&self, path: &Path, compress: bool) -> Result<RemoteFile> {
        if !compress {
            return self.upload_raw(path).await;
        }

        // `d/` must become `d.zip` next to `d`, never `d/.zip` inside it
        let source = named_source(path)?;
        let archive_path = archive::pack(&source, &source)?;
        info!(
            "📦 Compressed {} into {}",
            source.display(),
            archive_path.display()
        );

        self.upload_archive(&archive_path).await
    }

    /// Downloads `remote_id` into the work dir. A `.zip` result is unwrapped
    /// to the single file it contains when `decompress` is set.
    pub async fn download_file(
        &self,
        remote_id: &str,
        dest_name: Option<&str>,
        decompress: bool,
    ) -> Result<PathBuf> {
        let downloaded = self.download_raw(remote_id, dest_name).await?;

        if !(decompress && archive::has_archive_extension(&downloaded)) {
            return Ok(downloaded);
        }

        let extracted = self.extract_single_file(&downloaded)?;
        if extracted != downloaded {
            std::fs::remove_file(&downloaded)?;
        }

        Ok(extracted)
    }

    /// Downloads a zipped folder and unpacks it into a fresh scratch directory.
    pub async fn download_folder(
        &self,
        remote_id: &str,
        dest_name: Option<&str>,
    ) -> Result<PathBuf> {
        let downloaded = self.download_raw(remote_id, dest_name).await?;
        if !archive::has_archive_extension(&downloaded) {
            return Err(TransferError::NotAnArchive(downloaded));
        }

        let output_dir = self.scratch.allocate()?;
        archive::unpack(&downloaded, &output_dir)?;
        info!(
            "📂 Extracted {} into {}",
            downloaded.display(),
            output_dir.display()
        );

        Ok(output_dir)
    }

    /// Unwraps an archive holding exactly one file.
    ///
    /// The file lands next to the scratch directory it was extracted into,
    /// under its entry name, and the scratch directory is removed. Anything
    /// other than one plain file at the top level is rejected.
    pub fn extract_single_file(&self, archive_path: &Path) -> Result<PathBuf> {
        let output_dir = self.scratch.allocate()?;
        archive::unpack(archive_path, &output_dir)?;

        let entries = std::fs::read_dir(&output_dir)?.collect::<std::io::Result<Vec<_>>>()?;
        let file = match entries.as_slice() {
            [entry] if entry.path().is_file() => entry.path(),
            _ => {
                return Err(TransferError::UnexpectedEntryCount {
                    archive: archive_path.to_path_buf(),
                    found: entries.len(),
                });
            }
        };

        let parent_dir = output_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.scratch.root().to_path_buf());
        let new_location = parent_dir.join(base_name(&file)?);

        std::fs::rename(&file, &new_location)?;
        std::fs::remove_dir(&output_dir)?;
        info!("📄 New location {}", new_location.display());

        Ok(new_location)
    }

    async fn upload_archive(&self, archive_path: &Path) -> Result<RemoteFile> {
        let remote = self.upload_raw(archive_path).await?;
        std::fs::remove_file(archive_path)?;
        debug!("Removed uploaded archive {}", archive_path.display());
        Ok(remote)
    }

    async fn upload_raw(&self, path: &Path) -> Result<RemoteFile> {
        if !path.is_file() {
            return Err(TransferError::NotFound(path.to_path_buf()));
        }

        let remote = self.store.upload(path).await?;
        info!(
            "☁️  Uploaded {} to {} as {} ({})",
            path.display(),
            self.store.provider_id(),
            remote.name,
            remote.id
        );
        Ok(remote)
    }

    async fn download_raw(&self, remote_id: &str, dest_name: Option<&str>) -> Result<PathBuf> {
        let dest = match dest_name {
            Some(name) => self.work_dir.join(name),
            None => self.work_dir.join(validate_file_name(remote_id)?),
        };

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let path = self.store.download(remote_id, &dest).await?;
        info!(
            "⬇️  Downloaded {} from {} to {}",
            remote_id,
            self.store.provider_id(),
            path.display()
        );
        Ok(path)
    }
}

/// Drops trailing separators and resolves names like `.` so the path has a
/// usable base name.
fn named_source(path: &Path) -> Result<PathBuf> {
    let normalized = normalize_dir_path(path);
    if base_name(&normalized).is_ok() {
        Ok(normalized)
    } else {
        Ok(normalized.canonicalize()?)
    }
}
