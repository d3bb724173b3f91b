// Download orchestration across registered repositories

use crate::error::{FetchError, Result};
use crate::platform::PlatformSpec;
use crate::registry::RepositoryRegistry;
use crate::repository::{BinaryRepository, ensure_edition_supported};
use crate::version::VersionInfo;
use anyhow::Context;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Download the archive for `version` into `destination`.
///
/// Repositories are tried strictly in registry order. A repository that
/// does not hold the archive is skipped; any other failure stops the search.
pub async fn download_binary(
    registry: &RepositoryRegistry,
    version: &VersionInfo,
    destination: &Path,
) -> Result<PathBuf> {
    let platform = PlatformSpec::detect()?;
    download_binary_for(registry, &platform, version, destination).await
}

/// Same as [`download_binary`] with platform facts supplied by the caller
pub async fn download_binary_for(
    registry: &RepositoryRegistry,
    platform: &PlatformSpec,
    version: &VersionInfo,
    destination: &Path,
) -> Result<PathBuf> {
    let destination = prepare_destination(destination).await?;
    let edition = version.edition();

    for repository in registry.eligible(edition) {
        debug!(
            "Trying repository '{}' for {}",
            repository.name(),
            version
        );
        match repository.fetch(platform, version, &destination).await {
            Ok(path) => {
                info!(
                    "Downloaded mongodb {} from repository '{}'",
                    version,
                    repository.name()
                );
                return Ok(path);
            }
            Err(e) if e.is_not_found() => {
                debug!(
                    "No mongodb binary (version: '{}', edition: '{}') found in repo '{}': {}",
                    version.version_number(),
                    edition,
                    repository.name(),
                    e
                );
            }
            Err(e) => return Err(e),
        }
    }

    Err(FetchError::BinaryNotFound {
        version: version.version_number().to_string(),
        edition,
    })
}

/// Download from one named repository, without falling back to others
pub async fn download_from(
    repository: &dyn BinaryRepository,
    version: &VersionInfo,
    destination: &Path,
) -> Result<PathBuf> {
    ensure_edition_supported(repository, version.edition())?;
    let destination = prepare_destination(destination).await?;
    debug!("Fetching {} from repository '{}' only", version, repository.name());
    repository.download_file(version, &destination).await
}

async fn prepare_destination(destination: &Path) -> Result<PathBuf> {
    let destination = std::path::absolute(destination)
        .with_context(|| format!("Invalid destination {}", destination.display()))?;
    tokio::fs::create_dir_all(&destination)
        .await
        .with_context(|| format!("Failed to create {}", destination.display()))?;
    Ok(destination)
}
