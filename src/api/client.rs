use futures::Stream;
use futures::TryStreamExt;
use reqwest::Client;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use super::models::{ProviderConfig, VideoMetadata};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to launch provider: {0}")]
    LaunchError(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Thin wrapper over the two remote capabilities this app needs: the
/// `yt-dlp` executable for metadata/stream listing, and plain HTTP for
/// thumbnail bytes and the stream payloads themselves.
#[derive(Clone)]
pub struct ProviderClient {
    config: ProviderConfig,
    http: Client,
}

impl ProviderClient {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    /// Query the provider for a video's metadata and format list.
    ///
    /// Runs `yt-dlp --dump-json` and parses its single-line JSON output.
    /// A non-zero exit surfaces the last non-empty stderr line, which is
    /// where yt-dlp puts its human-readable `ERROR:` message.
    pub async fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata> {
        debug!(url, "invoking yt-dlp for metadata");

        let output = Command::new(&self.config.ytdlp_bin)
            .arg("--no-playlist")
            .arg("--no-warnings")
            .arg("--no-progress")
            .arg("--dump-json")
            .arg(url)
            .output()
            .await
            .map_err(|e| {
                ApiError::LaunchError(format!("{}: {}", self.config.ytdlp_bin.display(), e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("provider exited with an error")
                .to_string();
            return Err(ApiError::ProviderError(message));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| ApiError::InvalidMetadata(format!("JSON decode error: {}", e)))
    }

    /// Fetch raw thumbnail bytes.
    pub async fn fetch_thumbnail(&self, url: &str) -> Result<bytes::Bytes> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?)
    }

    /// Open a media stream download.
    /// Returns (total_size, chunk stream).
    pub async fn download_file_stream(
        &self,
        download_url: &str,
    ) -> Result<(Option<u64>, impl Stream<Item = Result<bytes::Bytes>>)> {
        let response = self
            .http
            .get(download_url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ApiError::ProviderError(format!("Download request failed: {}", e)))?;

        let total_size = response.content_length();
        let stream = response.bytes_stream().map_err(ApiError::RequestError);

        Ok((total_size, stream))
    }
}
