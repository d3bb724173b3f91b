// Registry of binary repositories in priority order

use crate::config::{Config, RepositoryEntry};
use crate::constants;
use crate::error::{FetchError, Result};
use crate::repository::{BinaryRepository, DefaultRepository, S3Repository, TemplateRepository};
use crate::version::Edition;
use log::debug;
use std::sync::Arc;

/// Ordered list of repositories, built once and owned by the caller.
///
/// The public CDN always comes first, followed by the configured custom
/// repositories in file order. Nothing is re-read after construction.
pub struct RepositoryRegistry {
    repositories: Vec<Arc<dyn BinaryRepository>>,
}

impl RepositoryRegistry {
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut repositories: Vec<Arc<dyn BinaryRepository>> =
            vec![Arc::new(DefaultRepository::new())];

        for (name, entry) in config.custom_binary_repositories()? {
            let repository = make_binary_repository(&name, &entry)?;
            debug!(
                "Registered {} repository '{}' ({})",
                repository.kind(),
                name,
                entry.url_template
            );
            repositories.push(repository);
        }

        Ok(Self { repositories })
    }

    /// Registry over an explicit repository list, used as-is
    #[cfg(test)]
    pub fn from_repositories(repositories: Vec<Arc<dyn BinaryRepository>>) -> Self {
        Self { repositories }
    }

    pub fn repositories(&self) -> &[Arc<dyn BinaryRepository>] {
        &self.repositories
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn BinaryRepository>> {
        self.repositories.iter().find(|r| r.name() == name)
    }

    /// Repositories able to serve `edition`, in priority order
    pub fn eligible(&self, edition: Edition) -> impl Iterator<Item = &Arc<dyn BinaryRepository>> {
        self.repositories.iter().filter(move |r| r.supports(edition))
    }
}

fn make_binary_repository(
    name: &str,
    entry: &RepositoryEntry,
) -> Result<Arc<dyn BinaryRepository>> {
    if name == constants::DEFAULT_REPOSITORY_NAME {
        return Err(FetchError::InvalidRepositoryConfig {
            name: name.to_string(),
            reason: "this name is reserved for the public repository".to_string(),
        });
    }

    if entry.is_object_storage() {
        Ok(Arc::new(S3Repository::from_entry(name, entry)?))
    } else {
        Ok(Arc::new(TemplateRepository::from_entry(name, entry)))
    }
}
