// Repos command for listing registered repositories

use crate::registry::RepositoryRegistry;
use crate::ui;

pub fn repos(registry: &RepositoryRegistry) -> anyhow::Result<()> {
    ui::header("Binary repositories (in priority order):");
    for (index, repository) in registry.repositories().iter().enumerate() {
        let editions = repository
            .supported_editions()
            .iter()
            .map(|e| e.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        ui::plain(&format!(
            "  {}. {} [{}] editions: {}",
            index + 1,
            repository.name(),
            repository.kind(),
            editions
        ));
    }
    Ok(())
}
