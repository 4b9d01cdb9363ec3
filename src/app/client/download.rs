//! File download operations with atomic writes
//!
//! Downloads go to a temporary sibling path first and are renamed into
//! place once complete, so an interrupted run never leaves a partial
//! file where the pipeline expects a finished one.

use std::path::Path;

use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::app::client::http::{ensure_success, HttpGateway};
use crate::constants::files;
use crate::errors::{DownloadError, DownloadResult};

/// File download operations handler
pub struct DownloadHandler<'a> {
    gateway: &'a HttpGateway,
}

impl<'a> DownloadHandler<'a> {
    /// Creates a new DownloadHandler over the shared gateway
    pub fn new(gateway: &'a HttpGateway) -> Self {
        Self { gateway }
    }

    /// Downloads `url` to `destination`, replacing any existing file
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if the request fails, the server responds
    /// with a non-success status, or file I/O fails.
    pub async fn download_file(&self, url: &Url, destination: &Path) -> DownloadResult<()> {
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp_path = temp_sibling(destination);

        let response = ensure_success(self.gateway.get(url).await?, url)?;
        let bytes = response.bytes().await?;

        let mut file = File::create(&temp_path).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&temp_path, destination).await.map_err(|_| {
            DownloadError::AtomicOperationFailed {
                temp_path: temp_path.clone(),
                final_path: destination.to_path_buf(),
            }
        })?;

        tracing::info!(
            "Downloaded {} ({} bytes) to {}",
            url,
            bytes.len(),
            destination.display()
        );
        Ok(())
    }
}

/// Temporary sibling path used during an atomic download
fn temp_sibling(destination: &Path) -> std::path::PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "download".to_string());
    name.push_str(files::TEMP_FILE_SUFFIX);
    destination.with_file_name(name)
}
