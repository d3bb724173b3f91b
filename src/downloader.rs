// Generic URL downloader backed by curl or wget

use crate::error::{FetchError, Result};
use crate::repository::archive_name;
use crate::ui;
use anyhow::Context;
use log::{debug, info};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// External download tools, in order of preference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadTool {
    Curl(PathBuf),
    Wget(PathBuf),
}

impl DownloadTool {
    /// Find curl, falling back to wget
    pub fn detect() -> Result<Self> {
        if let Ok(path) = which::which("curl") {
            return Ok(DownloadTool::Curl(path));
        }
        if let Ok(path) = which::which("wget") {
            return Ok(DownloadTool::Wget(path));
        }
        Err(FetchError::MissingDownloadTool)
    }

    pub fn program(&self) -> &Path {
        match self {
            DownloadTool::Curl(path) | DownloadTool::Wget(path) => path,
        }
    }

    /// Arguments for fetching `url` into the working directory.
    ///
    /// curl runs silent-but-show-errors unless the session is interactive.
    pub fn args(&self, url: &str, interactive: bool) -> Vec<String> {
        let mut args = Vec::new();
        match self {
            DownloadTool::Curl(_) => {
                args.push("-O".to_string());
                if !interactive {
                    args.push("-Ss".to_string());
                }
            }
            DownloadTool::Wget(_) => {}
        }
        args.push(url.to_string());
        args
    }
}

/// Download `url` into `destination` and return the archive path.
///
/// The child process is killed if this future is dropped, which is how an
/// interrupt stops an in-flight transfer.
pub async fn download_url(url: &str, destination: &Path) -> Result<PathBuf> {
    let tool = DownloadTool::detect()?;
    download_url_with(&tool, url, destination).await
}

pub async fn download_url_with(
    tool: &DownloadTool,
    url: &str,
    destination: &Path,
) -> Result<PathBuf> {
    info!("Downloading {}...", url);

    let args = tool.args(url, ui::is_interactive());
    debug!(
        "Running {} {} in {}",
        tool.program().display(),
        args.join(" "),
        destination.display()
    );

    let status = Command::new(tool.program())
        .args(&args)
        .current_dir(destination)
        .kill_on_drop(true)
        .status()
        .await
        .with_context(|| format!("Failed to run {}", tool.program().display()))?;

    if !status.success() {
        return Err(anyhow::anyhow!(
            "{} exited with {} while downloading '{}'",
            tool.program().display(),
            status,
            url
        )
        .into());
    }

    Ok(destination.join(archive_name(url)))
}
