//! HTTP access for sources and the driver.
//!
//! [`Fetcher`] wraps one shared `reqwest::Client` with a fixed timeout. It
//! never retries; a failed call is terminal for the item that made it.
//!
//! Downloads are streamed into `<destination>.part` and renamed onto the
//! destination only once the body is complete, so an interrupted or failed
//! transfer leaves nothing behind at the destination path.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::config::FetcherConfig;
use crate::error::{DownloadError, FetchError, SetupError};

/// Suffix appended to the destination file name while downloading.
pub const PART_SUFFIX: &str = ".part";

/// A file saved by [`Fetcher::download_binary`].
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    /// Final path of the file.
    pub path: PathBuf,
    /// Bytes written.
    pub size: u64,
    /// `Content-Type` reported by the server.
    pub content_type: Option<String>,
}

/// Network fetcher shared by every source in a run.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build the HTTP client.
    pub fn new(config: &FetcherConfig) -> Result<Self, SetupError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(SetupError::Client)?;

        Ok(Self { client })
    }

    /// GET `url` and return the body as text.
    ///
    /// Any non-success status is an error carrying that status.
    pub async fn fetch_markup(&self, url: &str) -> Result<String, FetchError> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    /// Stream `url` into `destination`, creating parent directories.
    pub async fn download_binary(
        &self,
        url: &str,
        destination: &Path,
    ) -> Result<DownloadedFile, DownloadError> {
        self.download_binary_with(url, |_| destination.to_path_buf())
            .await
    }

    /// Like [`download_binary`](Self::download_binary), but the destination is
    /// chosen once the response headers are known.
    ///
    /// `choose_destination` receives the response `Content-Type`, if any.
    pub async fn download_binary_with<F>(
        &self,
        url: &str,
        choose_destination: F,
    ) -> Result<DownloadedFile, DownloadError>
    where
        F: FnOnce(Option<&str>) -> PathBuf + Send,
    {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let destination = choose_destination(content_type.as_deref());

        let size = save_response(response, &destination).await?;
        debug!("Saved {} bytes to {}", size, destination.display());

        Ok(DownloadedFile {
            path: destination,
            size,
            content_type,
        })
    }
}

/// Path of the in-progress file for `destination`.
pub fn part_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(PART_SUFFIX);
    destination.with_file_name(name)
}

async fn save_response(response: Response, destination: &Path) -> Result<u64, DownloadError> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| DownloadError::io(parent, e))?;
    }

    let part = PartFile::new(part_path(destination));
    let size = write_body(response, part.path()).await?;

    fs::rename(part.path(), destination)
        .await
        .map_err(|e| DownloadError::io(destination, e))?;
    part.commit();

    Ok(size)
}

/// Write the whole body to `path`. The handle is closed when this returns.
async fn write_body(response: Response, path: &Path) -> Result<u64, DownloadError> {
    let mut file = fs::File::create(path)
        .await
        .map_err(|e| DownloadError::io(path, e))?;

    let mut stream = response.bytes_stream();
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk: Bytes = chunk?;
        file.write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(path, e))?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(|e| DownloadError::io(path, e))?;
    file.sync_all()
        .await
        .map_err(|e| DownloadError::io(path, e))?;

    Ok(written)
}

/// Removes the `.part` file on drop unless the download was committed.
struct PartFile {
    path: PathBuf,
    committed: bool,
}

impl PartFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PartFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed partial file {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove {}: {}", self.path.display(), e),
        }
    }
}
