//! Asset downloader
//!
//! Streams a response body into the output directory under the URL's last
//! path segment. Existing files of the same name are overwritten.

use crate::crawler::fetcher::fetch;
use crate::url::file_name;
use crate::{DownloadError, FetchError};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Writes downloaded assets into a single target directory
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
    target_dir: PathBuf,
}

impl Downloader {
    /// Creates a downloader writing into `target_dir`
    ///
    /// The directory must already exist; the harvester creates it at startup.
    pub fn new(client: Client, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            target_dir: target_dir.into(),
        }
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Downloads `url` and returns where it was stored
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - The file written
    /// * `Err(DownloadError::Fetch)` - Transport failure or non-success status
    /// * `Err(DownloadError::MissingFileName)` - The URL has no usable last segment
    /// * `Err(DownloadError::Io)` - Creating or writing the file failed
    pub async fn download(&self, url: &Url) -> Result<PathBuf, DownloadError> {
        let name = file_name(url).ok_or_else(|| DownloadError::MissingFileName {
            url: url.to_string(),
        })?;

        let mut response = fetch(&self.client, url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            }
            .into());
        }

        let path = self.target_dir.join(name);
        let io_error = |source| DownloadError::Io {
            path: path.clone(),
            source,
        };

        let mut file = File::create(&path).await.map_err(io_error)?;

        while let Some(chunk) = response.chunk().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })? {
            file.write_all(&chunk).await.map_err(io_error)?;
        }
        file.flush().await.map_err(io_error)?;

        Ok(path)
    }
}
