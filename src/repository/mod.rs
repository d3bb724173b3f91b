// Binary repositories that can locate and deliver MongoDB archives

use crate::error::{FetchError, Result};
use crate::platform::PlatformSpec;
use crate::version::{Edition, VersionInfo};
use std::path::{Path, PathBuf};

pub mod default;
pub mod http;
pub mod s3;
pub mod template;

pub use default::DefaultRepository;
pub use s3::S3Repository;
pub use template::TemplateRepository;

/// Trait for binary repositories (public CDN, template mirrors, S3 buckets)
#[async_trait::async_trait]
pub trait BinaryRepository: Send + Sync {
    /// Unique label, used in logs and error messages
    fn name(&self) -> &str;

    /// Short description of the backend (e.g. "cdn", "http", "s3")
    fn kind(&self) -> &'static str;

    fn supported_editions(&self) -> &[Edition];

    fn supports(&self, edition: Edition) -> bool {
        self.supported_editions().contains(&edition)
    }

    /// Compute where the archive for `version` lives in this repository.
    ///
    /// The result is a URL for HTTP repositories and an object key for
    /// storage-backed ones; only the repository itself interprets it.
    fn compute_download_location(
        &self,
        platform: &PlatformSpec,
        version: &VersionInfo,
    ) -> Result<String>;

    /// Transfer the archive into `destination` and return its path.
    ///
    /// # Errors
    /// [`FetchError::NotFoundInRepository`] when this repository does not
    /// hold the archive; any other error is fatal.
    async fn fetch(
        &self,
        platform: &PlatformSpec,
        version: &VersionInfo,
        destination: &Path,
    ) -> Result<PathBuf>;

    /// Detect the host platform and fetch in one step.
    async fn download_file(&self, version: &VersionInfo, destination: &Path) -> Result<PathBuf> {
        let platform = PlatformSpec::detect()?;
        self.fetch(&platform, version, destination).await
    }
}

/// Fail with `UnsupportedEdition` unless `edition` is served by the repository.
pub fn ensure_edition_supported(repository: &dyn BinaryRepository, edition: Edition) -> Result<()> {
    if repository.supports(edition) {
        Ok(())
    } else {
        Err(FetchError::UnsupportedEdition {
            edition: edition.to_string(),
            repository: repository.name().to_string(),
        })
    }
}

/// Final path segment of a URL or object key, without any query string
pub fn archive_name(location: &str) -> &str {
    let without_query = location.split(['?', '#']).next().unwrap_or(location);
    without_query.rsplit('/').next().unwrap_or(without_query)
}
