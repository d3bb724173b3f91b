// Shared HTTP client and status checks for URL-based repositories

use crate::downloader;
use crate::error::{FetchError, Result};
use crate::ui;
use crate::version::VersionInfo;
use anyhow::Context;
use log::debug;
use reqwest::{Client, StatusCode};
use std::path::{Path, PathBuf};

/// User-Agent string for all HTTP requests
const USER_AGENT: &str = concat!("mongofetch/", env!("CARGO_PKG_VERSION"));

lazy_static::lazy_static! {
    /// Shared HTTP client with proper User-Agent
    static ref CLIENT: Client = Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .expect("Failed to create HTTP client");
}

/// Get a reference to the shared HTTP client
pub fn client() -> &'static Client {
    &CLIENT
}

/// Check that `url` is downloadable.
///
/// 404 means the archive is not in this repository; any status other than
/// 200 is fatal.
pub async fn check_available(url: &str, version: &VersionInfo) -> Result<()> {
    let spinner = ui::spinner(&format!("Checking {}", url));
    let response = client().get(url).send().await;
    ui::clear_bar(&spinner);

    let response = response.with_context(|| format!("Failed to reach '{}'", url))?;
    let status = response.status();
    debug!("GET {} -> {}", url, status);

    if status == StatusCode::NOT_FOUND {
        return Err(FetchError::NotFoundInRepository(format!(
            "File not found in repo: {}",
            url
        )));
    }

    if status != StatusCode::OK {
        return Err(anyhow::anyhow!(
            "Unable to download from url '{}' (response code '{}'). It could be that version '{}' you specified does not exist. Please double check the version you provide",
            url,
            status.as_u16(),
            version.version_number()
        )
        .into());
    }

    Ok(())
}

/// Check availability, then hand the URL to the external downloader
pub async fn fetch_url(url: &str, version: &VersionInfo, destination: &Path) -> Result<PathBuf> {
    check_available(url, version).await?;
    downloader::download_url(url, destination).await
}
