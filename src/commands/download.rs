// Download command for fetching a server archive

use crate::commands::requested_version;
use crate::download;
use crate::registry::RepositoryRegistry;
use crate::ui;
use crate::version::{Edition, is_supported_mongo_version};
use log::info;
use std::path::PathBuf;

pub async fn download(
    registry: &RepositoryRegistry,
    version: String,
    edition: Edition,
    dir: Option<PathBuf>,
    repo: Option<&str>,
) -> anyhow::Result<()> {
    let version = requested_version(&version, edition)?;
    if !is_supported_mongo_version(version.version_number())? {
        ui::warning(&format!(
            "Version {} is older than the oldest supported release",
            version
        ));
    }

    let destination = match dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let path = match repo {
        Some(name) => {
            let repository = registry
                .get(name)
                .ok_or_else(|| anyhow::anyhow!("Unknown binary repository '{}'", name))?;
            info!("Looking up mongodb {} in repository '{}'", version, name);
            download::download_from(repository.as_ref(), &version, &destination).await?
        }
        None => {
            info!("Looking up mongodb {}", version);
            download::download_binary(registry, &version, &destination).await?
        }
    };

    ui::success(&format!("Downloaded mongodb {}", version));
    ui::plain(&path.display().to_string());
    Ok(())
}
