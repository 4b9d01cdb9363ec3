//! Listing and file retrieval with saved-data support
//!
//! The retriever materializes upstream content locally: the listing as a
//! decoded descriptor sequence and each referenced file as a path on disk.
//! Two debugging modes mirror the production flow without touching it:
//! `save` keeps a copy of everything downloaded under a saved-data
//! directory, and `use_saved` reads from that directory instead of the
//! network. Offline tests run the whole pipeline through `use_saved`.

use std::path::{Path, PathBuf};

use url::Url;

use crate::app::client::EconaiClient;
use crate::app::listing::{decode_listing, FileDescriptor};
use crate::errors::{DownloadError, DownloadResult, ListingResult};

/// Saved-data behavior for a run
#[derive(Debug, Clone, Default)]
pub struct RetrieveOptions {
    /// Keep a copy of every download in the saved-data directory
    pub save: bool,
    /// Read from the saved-data directory instead of the network
    pub use_saved: bool,
    /// Saved-data directory used by either mode
    pub saved_dir: PathBuf,
}

/// Fetches the listing and materializes referenced files locally
pub struct Retriever {
    client: EconaiClient,
    base_url: String,
    latest_url: Url,
    temp_dir: PathBuf,
    options: RetrieveOptions,
}

impl Retriever {
    /// Creates a retriever for one run
    ///
    /// `temp_dir` receives the downloaded files and must outlive every
    /// path handed out by [`fetch_file`](Self::fetch_file).
    pub fn new(
        client: EconaiClient,
        base_url: &str,
        latest_path: &str,
        temp_dir: &Path,
        options: RetrieveOptions,
    ) -> DownloadResult<Self> {
        let latest_url = join_url(base_url, latest_path)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            latest_url,
            temp_dir: temp_dir.to_path_buf(),
            options,
        })
    }

    /// Fetches and decodes the latest-publication listing
    pub async fn fetch_listing(&self) -> ListingResult<Vec<FileDescriptor>> {
        let local = local_name(self.latest_url.path());
        let body = if self.options.use_saved {
            let path = self.options.saved_dir.join(&local);
            tracing::info!("Reading saved listing from {}", path.display());
            read_saved_text(&path)?
        } else {
            tracing::info!("Fetching listing from {}", self.latest_url);
            let body = self.client.get_text(&self.latest_url).await?;
            if self.options.save {
                self.save_copy_bytes(&local, body.as_bytes())?;
            }
            body
        };
        decode_listing(&body)
    }

    /// Materializes one referenced file locally and returns its path
    pub async fn fetch_file(&self, relative_url: &str) -> DownloadResult<PathBuf> {
        let local = local_name(relative_url);
        if self.options.use_saved {
            let path = self.options.saved_dir.join(&local);
            if !path.exists() {
                return Err(DownloadError::SavedCopyMissing { path });
            }
            return Ok(path);
        }

        let url = join_url(&self.base_url, relative_url)?;
        let destination = self.temp_dir.join(&local);
        self.client.download_file(&url, &destination).await?;
        if self.options.save {
            std::fs::create_dir_all(&self.options.saved_dir)?;
            std::fs::copy(&destination, self.options.saved_dir.join(&local))?;
        }
        Ok(destination)
    }

    fn save_copy_bytes(&self, local: &str, bytes: &[u8]) -> DownloadResult<()> {
        std::fs::create_dir_all(&self.options.saved_dir)?;
        std::fs::write(self.options.saved_dir.join(local), bytes)?;
        Ok(())
    }
}

fn read_saved_text(path: &Path) -> DownloadResult<String> {
    if !path.exists() {
        return Err(DownloadError::SavedCopyMissing {
            path: path.to_path_buf(),
        });
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Joins the service base URL with a listing-relative path
///
/// The listing publishes paths meant for plain concatenation onto the
/// base URL, so this avoids RFC 3986 relative resolution on purpose.
fn join_url(base_url: &str, relative: &str) -> DownloadResult<Url> {
    let joined = format!("{}{}", base_url.trim_end_matches('/'), relative);
    Url::parse(&joined).map_err(|e| DownloadError::InvalidUrl {
        url: joined,
        error: e.to_string(),
    })
}

/// Local filename for a URL path: its last non-empty segment
fn local_name(url_path: &str) -> String {
    url_path
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or("download")
        .to_string()
}
