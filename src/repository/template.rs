// Template-based repositories and placeholder substitution

use crate::config::RepositoryEntry;
use crate::error::{FetchError, Result};
use crate::platform::PlatformSpec;
use crate::repository::{BinaryRepository, ensure_edition_supported, http};
use crate::version::{Edition, VersionInfo};
use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Placeholders a URL template may reference
pub const PLACEHOLDERS: [&str; 7] = [
    "os_name",
    "platform_spec",
    "os_dist_name",
    "os_dist_version",
    "os_dist_version_no_dots",
    "mongodb_version",
    "mongodb_edition",
];

fn placeholder_value(
    placeholder: &str,
    platform: &PlatformSpec,
    version: &VersionInfo,
) -> Option<Option<String>> {
    let value = match placeholder {
        "os_name" => Some(platform.os_name.clone()),
        "platform_spec" => Some(platform.platform_spec.clone()),
        "os_dist_name" => platform.os_dist_name.clone(),
        "os_dist_version" => platform.os_dist_version.clone(),
        "os_dist_version_no_dots" => platform.os_dist_version_no_dots(),
        "mongodb_version" => Some(version.version_number().to_string()),
        "mongodb_edition" => Some(version.edition().to_string()),
        _ => return None,
    };
    Some(value)
}

/// Substitute `{placeholder}` tokens in `template`. `{{` and `}}` are literal
/// braces.
pub fn render_template(
    template: &str,
    platform: &PlatformSpec,
    version: &VersionInfo,
) -> anyhow::Result<String> {
    let mut rendered = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                rendered.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                rendered.push('}');
            }
            '{' => {
                let mut placeholder = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => placeholder.push(c),
                        None => {
                            anyhow::bail!("Unterminated placeholder in template '{}'", template)
                        }
                    }
                }
                let value =
                    placeholder_value(&placeholder, platform, version).ok_or_else(|| {
                        anyhow::anyhow!(
                            "Unknown placeholder '{{{}}}' in template '{}'. Supported placeholders: {}",
                            placeholder,
                            template,
                            PLACEHOLDERS.join(", ")
                        )
                    })?;
                let value = value.ok_or_else(|| {
                    anyhow::anyhow!(
                        "Placeholder '{{{}}}' has no value on this host (os: {})",
                        placeholder,
                        platform.os_name
                    )
                })?;
                rendered.push_str(&value);
            }
            '}' => anyhow::bail!("Unmatched '}}' in template '{}'", template),
            c => rendered.push(c),
        }
    }

    Ok(rendered)
}

/// Render a repository's template, attributing failures to the repository
pub fn render_location(
    repository: &str,
    template: &str,
    platform: &PlatformSpec,
    version: &VersionInfo,
) -> Result<String> {
    render_template(template, platform, version)
        .with_context(|| format!("Binary repository '{}'", repository))
        .map_err(FetchError::from)
}

/// Custom repository resolving URLs from a configured template and
/// downloading them over HTTP
#[derive(Debug, Clone)]
pub struct TemplateRepository {
    name: String,
    supported_editions: Vec<Edition>,
    url_template: String,
}

impl TemplateRepository {
    pub fn new(
        name: impl Into<String>,
        url_template: impl Into<String>,
        supported_editions: Vec<Edition>,
    ) -> Self {
        Self {
            name: name.into(),
            supported_editions,
            url_template: url_template.into(),
        }
    }

    pub fn from_entry(name: &str, entry: &RepositoryEntry) -> Self {
        Self::new(
            name,
            entry.url_template.clone(),
            entry.supported_editions.clone(),
        )
    }
}

#[async_trait]
impl BinaryRepository for TemplateRepository {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "http"
    }

    fn supported_editions(&self) -> &[Edition] {
        &self.supported_editions
    }

    fn compute_download_location(
        &self,
        platform: &PlatformSpec,
        version: &VersionInfo,
    ) -> Result<String> {
        ensure_edition_supported(self, version.edition())?;
        render_location(&self.name, &self.url_template, platform, version)
    }

    async fn fetch(
        &self,
        platform: &PlatformSpec,
        version: &VersionInfo,
        destination: &Path,
    ) -> Result<PathBuf> {
        let url = self.compute_download_location(platform, version)?;
        http::fetch_url(&url, version, destination).await
    }
}
