use super::{RemoteFile, RemoteStore};
use crate::config::{DriveConfig, DriveCredentials};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio_util::io::ReaderStream;
use url::Url;

const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Refresh this long before the token actually expires
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
pub struct CloudTokens {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl CloudTokens {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) > now
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    name: String,
}

pub struct GoogleDriveStore {
    client: reqwest::Client,
    credentials: DriveCredentials,
    folder_id: Option<String>,
    tokens: Mutex<Option<CloudTokens>>,
}

impl GoogleDriveStore {
    pub fn new(config: &DriveConfig) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            credentials: config.credentials()?,
            folder_id: config.folder_id.clone(),
            tokens: Mutex::new(None),
        })
    }

    /// Returns a usable access token, exchanging the refresh token the
    /// first time and whenever the cached one is about to expire.
    async fn access_token(&self) -> Result<String> {
        let (client_id, client_secret, refresh_token) = match &self.credentials {
            DriveCredentials::AccessToken(token) => return Ok(token.clone()),
            DriveCredentials::Refresh {
                client_id,
                client_secret,
                refresh_token,
            } => (client_id, client_secret, refresh_token),
        };

        let mut cached = self.tokens.lock().await;
        if let Some(tokens) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            return Ok(tokens.access_token.clone());
        }

        tracing::info!("🔑 Refreshing Google Drive access token");
        let res = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;
        let token: TokenResponse = ensure_success(res, "token refresh").await?.json().await?;

        let tokens = CloudTokens {
            access_token: token.access_token,
            expires_at: Utc::now() + token_lifetime(token.expires_in)?,
        };
        let access_token = tokens.access_token.clone();
        *cached = Some(tokens);

        Ok(access_token)
    }
}

#[async_trait]
impl RemoteStore for GoogleDriveStore {
    fn provider_id(&self) -> &'static str {
        "google_drive"
    }

    async fn upload(&self, local_path: &Path) -> Result<RemoteFile> {
        let name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("'{}' has no file name", local_path.display()))?;
        let token = self.access_token().await?;

        let file = tokio::fs::File::open(local_path).await?;
        let size = file.metadata().await?.len();

        // Resumable session: metadata first, then the bytes in one streamed PUT
        let res = self
            .client
            .post(resumable_upload_url()?)
            .bearer_auth(&token)
            .header("X-Upload-Content-Type", "application/octet-stream")
            .header("X-Upload-Content-Length", size)
            .json(&upload_metadata(&name, self.folder_id.as_deref()))
            .send()
            .await?;
        let res = ensure_success(res, "upload session").await?;
        let session_url = res
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| anyhow!("Upload session response carried no Location header"))?
            .to_string();

        tracing::debug!("Streaming {} bytes of {} to Drive", size, name);
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let res = self
            .client
            .put(session_url)
            .bearer_auth(&token)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, size)
            .body(body)
            .send()
            .await?;
        let file: DriveFile = ensure_success(res, "upload").await?.json().await?;

        Ok(RemoteFile {
            id: file.id,
            name: file.name,
        })
    }

    async fn download(&self, remote_id: &str, dest_path: &Path) -> Result<PathBuf> {
        let token = self.access_token().await?;

        let mut url = file_url(remote_id)?;
        url.query_pairs_mut().append_pair("alt", "media");
        let res = self.client.get(url).bearer_auth(&token).send().await?;
        let mut res = ensure_success(res, "download").await?;

        let mut file = tokio::fs::File::create(dest_path).await?;
        while let Some(chunk) = res.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(dest_path.to_path_buf())
    }
}

fn file_url(id: &str) -> Result<Url> {
    let mut url = Url::parse(FILES_URL)?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("Drive files URL cannot take path segments"))?
        .push(id);
    Ok(url)
}

fn token_lifetime(expires_in: i64) -> Result<Duration> {
    Duration::try_seconds(expires_in)
        .filter(|d| *d > Duration::zero())
        .ok_or_else(|| anyhow!("Token endpoint returned invalid expires_in {}", expires_in))
}

fn resumable_upload_url() -> Result<Url> {
    Ok(Url::parse_with_params(
        UPLOAD_URL,
        &[("uploadType", "resumable"), ("fields", "id,name")],
    )?)
}

fn upload_metadata(name: &str, folder_id: Option<&str>) -> serde_json::Value {
    match folder_id {
        Some(folder) => serde_json::json!({ "name": name, "parents": [folder] }),
        None => serde_json::json!({ "name": name }),
    }
}

async fn ensure_success(res: reqwest::Response, action: &str) -> Result<reqwest::Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().await.unwrap_or_default();
    Err(anyhow!(
        "Google Drive {} failed with status {}: {}",
        action,
        status,
        body
    ))
}
