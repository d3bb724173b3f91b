// Public MongoDB CDN repository

use crate::constants;
use crate::error::{FetchError, Result};
use crate::platform::PlatformSpec;
use crate::repository::{BinaryRepository, ensure_edition_supported, http};
use crate::version::{Edition, VersionInfo};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

lazy_static::lazy_static! {
    static ref ENTERPRISE_NAMING_CUTOFF: VersionInfo =
        VersionInfo::new(constants::ENTERPRISE_NAMING_CUTOFF, None)
            .expect("Invalid enterprise naming cutoff version");
}

const SUPPORTED_EDITIONS: [Edition; 2] = [Edition::Community, Edition::Enterprise];

/// The public distribution CDN. Always registered first.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRepository;

impl DefaultRepository {
    pub fn new() -> Self {
        Self
    }
}

fn enterprise_archive(
    platform: &PlatformSpec,
    version: &VersionInfo,
) -> Result<(&'static str, String)> {
    let (domain, rel_name) = if version.is_at_least(&ENTERPRISE_NAMING_CUTOFF) {
        (constants::ENTERPRISE_DOMAIN, "enterprise")
    } else {
        (constants::LEGACY_ENTERPRISE_DOMAIN, "subscription")
    };

    let (Some(dist_name), Some(dist_version)) =
        (platform.os_dist_name.as_deref(), platform.os_dist_version_no_dots())
    else {
        return Err(anyhow::anyhow!(
            "Enterprise builds are published per Linux distribution, but no distribution was detected on this host (os: {})",
            platform.os_name
        )
        .into());
    };

    let archive = format!(
        "mongodb-{}-{}-{}{}-{}.tgz",
        platform.platform_spec,
        rel_name,
        dist_name,
        dist_version,
        version.version_number()
    );
    Ok((domain, archive))
}

#[async_trait]
impl BinaryRepository for DefaultRepository {
    fn name(&self) -> &str {
        constants::DEFAULT_REPOSITORY_NAME
    }

    fn kind(&self) -> &'static str {
        "cdn"
    }

    fn supported_editions(&self) -> &[Edition] {
        &SUPPORTED_EDITIONS
    }

    fn compute_download_location(
        &self,
        platform: &PlatformSpec,
        version: &VersionInfo,
    ) -> Result<String> {
        ensure_edition_supported(self, version.edition())?;

        let (domain, archive) = match version.edition() {
            Edition::Community => (
                constants::COMMUNITY_DOMAIN,
                format!(
                    "mongodb-{}-{}.tgz",
                    platform.platform_spec,
                    version.version_number()
                ),
            ),
            Edition::Enterprise => enterprise_archive(platform, version)?,
        };

        Ok(format!("http://{}/{}/{}", domain, platform.os_name, archive))
    }

    async fn fetch(
        &self,
        platform: &PlatformSpec,
        version: &VersionInfo,
        destination: &Path,
    ) -> Result<PathBuf> {
        let url = self.compute_download_location(platform, version)?;
        http::fetch_url(&url, version, destination)
            .await
            .map_err(|e| match e {
                FetchError::NotFoundInRepository(msg) => FetchError::NotFoundInRepository(format!(
                    "{} (repository '{}')",
                    msg,
                    self.name()
                )),
                other => other,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::template::tests::{linux_platform, osx_platform};

    fn location(version: &str, edition: Edition, platform: &PlatformSpec) -> Result<String> {
        let version = VersionInfo::new(version, Some(edition)).unwrap();
        DefaultRepository::new().compute_download_location(platform, &version)
    }

    #[test]
    fn test_community_url() {
        assert_eq!(
            location("3.0.0", Edition::Community, &linux_platform()).unwrap(),
            "http://fastdl.mongodb.org/linux/mongodb-linux-x86_64-3.0.0.tgz"
        );
        assert_eq!(
            location("2.4.9", Edition::Community, &osx_platform()).unwrap(),
            "http://fastdl.mongodb.org/osx/mongodb-osx-x86_64-2.4.9.tgz"
        );
    }

    #[test]
    fn test_enterprise_url_at_cutoff() {
        assert_eq!(
            location("2.6.1", Edition::Enterprise, &linux_platform()).unwrap(),
            "http://downloads.10gen.com/linux/mongodb-linux-x86_64-enterprise-ubuntu1404-2.6.1.tgz"
        );
        assert_eq!(
            location("3.0.0", Edition::Enterprise, &linux_platform()).unwrap(),
            "http://downloads.10gen.com/linux/mongodb-linux-x86_64-enterprise-ubuntu1404-3.0.0.tgz"
        );
    }

    #[test]
    fn test_enterprise_url_before_cutoff() {
        assert_eq!(
            location("2.6.0", Edition::Enterprise, &linux_platform()).unwrap(),
            "http://downloads.mongodb.com/linux/mongodb-linux-x86_64-subscription-ubuntu1404-2.6.0.tgz"
        );
        assert_eq!(
            location("2.6.1-rc0", Edition::Enterprise, &linux_platform()).unwrap(),
            "http://downloads.mongodb.com/linux/mongodb-linux-x86_64-subscription-ubuntu1404-2.6.1-rc0.tgz"
        );
    }

    #[test]
    fn test_enterprise_requires_dist_info() {
        let err = location("3.0.0", Edition::Enterprise, &osx_platform()).unwrap_err();
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("no distribution was detected"));
    }

    #[test]
    fn test_supports_both_editions() {
        let repo = DefaultRepository::new();
        assert_eq!(repo.name(), "default");
        assert!(repo.supports(Edition::Community));
        assert!(repo.supports(Edition::Enterprise));
    }
}
