// Command implementations, one file per subcommand

pub mod download;
pub mod locate;
pub mod platform;
pub mod repos;

use crate::version::{Edition, VersionInfo, make_version_info};

/// Version requested on the command line, tagged with its edition
fn requested_version(version: &str, edition: Edition) -> anyhow::Result<VersionInfo> {
    make_version_info(Some(version), Some(edition))?
        .ok_or_else(|| anyhow::anyhow!("A MongoDB version is required"))
}
