// Locate command for previewing download locations

use crate::platform::PlatformSpec;
use crate::registry::RepositoryRegistry;
use crate::ui;
use crate::commands::requested_version;
use crate::version::Edition;

pub fn locate(
    registry: &RepositoryRegistry,
    version: String,
    edition: Edition,
    repo: Option<&str>,
) -> anyhow::Result<()> {
    let version = requested_version(&version, edition)?;
    let platform = PlatformSpec::detect()?;

    let repositories = match repo {
        Some(name) => {
            let repository = registry
                .get(name)
                .ok_or_else(|| anyhow::anyhow!("Unknown binary repository '{}'", name))?;
            vec![repository]
        }
        None => registry.eligible(edition).collect(),
    };

    if repositories.is_empty() {
        anyhow::bail!("No registered repository serves the {} edition", edition);
    }

    for repository in repositories {
        match repository.compute_download_location(&platform, &version) {
            Ok(location) => ui::status(&format!("{}:", repository.name()), &location),
            Err(e) => ui::error(&format!("{}: {:#}", repository.name(), e)),
        }
    }
    Ok(())
}
