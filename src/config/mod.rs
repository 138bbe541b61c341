use anyhow::{Result, anyhow};
use std::env;
use std::path::PathBuf;

/// Local layout and backend selection for transfers
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Root under which integer-named scratch directories are allocated (default: "drive_utils_temp")
    pub scratch_root: PathBuf,

    /// Directory receiving downloads and folder archives (default: ".")
    pub work_dir: PathBuf,

    /// Remote store type: "google_drive" or "local" (default: "google_drive")
    pub store_backend: String,

    /// Root of the local directory store (default: "drive_store")
    pub local_store_dir: PathBuf,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            scratch_root: PathBuf::from("drive_utils_temp"),
            work_dir: PathBuf::from("."),
            store_backend: "google_drive".to_string(),
            local_store_dir: PathBuf::from("drive_store"),
        }
    }
}

impl TransferConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            scratch_root: env::var("SCRATCH_ROOT")
                .map(PathBuf::from)
                .unwrap_or(default.scratch_root),

            work_dir: env::var("WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.work_dir),

            store_backend: env::var("STORE_BACKEND").unwrap_or(default.store_backend),

            local_store_dir: env::var("LOCAL_STORE_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.local_store_dir),
        }
    }

    /// Config rooted in a single directory, with the local store backend
    pub fn local(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            scratch_root: base.join("scratch"),
            work_dir: base.clone(),
            store_backend: "local".to_string(),
            local_store_dir: base.join("store"),
        }
    }
}

/// How the Drive backend obtains an access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveCredentials {
    /// A token minted elsewhere, used until the API rejects it
    AccessToken(String),
    /// OAuth refresh flow, exchanged on demand
    Refresh {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct DriveConfig {
    pub access_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    /// Folder that uploads are placed in; Drive root when unset
    pub folder_id: Option<String>,
}

impl DriveConfig {
    pub fn from_env() -> Self {
        Self {
            access_token: env::var("GOOGLE_DRIVE_ACCESS_TOKEN").ok(),
            client_id: env::var("GOOGLE_CLIENT_ID").ok(),
            client_secret: env::var("GOOGLE_CLIENT_SECRET").ok(),
            refresh_token: env::var("GOOGLE_REFRESH_TOKEN").ok(),
            folder_id: env::var("GOOGLE_DRIVE_FOLDER_ID").ok(),
        }
    }

    /// An explicit access token wins over the refresh triple.
    pub fn credentials(&self) -> Result<DriveCredentials> {
        if let Some(token) = self.access_token.as_ref().filter(|t| !t.is_empty()) {
            return Ok(DriveCredentials::AccessToken(token.clone()));
        }

        match (&self.client_id, &self.client_secret, &self.refresh_token) {
            (Some(client_id), Some(client_secret), Some(refresh_token)) => {
                Ok(DriveCredentials::Refresh {
                    client_id: client_id.clone(),
                    client_secret: client_secret.clone(),
                    refresh_token: refresh_token.clone(),
                })
            }
            _ => Err(anyhow!(
                "Google Drive credentials missing: set GOOGLE_DRIVE_ACCESS_TOKEN or GOOGLE_CLIENT_ID, GOOGLE_CLIENT_SECRET and GOOGLE_REFRESH_TOKEN"
            )),
        }
    }
}
