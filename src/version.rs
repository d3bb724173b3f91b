// Version model for MongoDB server releases

use crate::error::{FetchError, Result};
use semver::{Prerelease, Version};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Oldest server release this tool knows how to fetch.
pub const MIN_SUPPORTED_VERSION: &str = "1.8";

/// MongoDB distribution variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Edition {
    #[default]
    Community,
    Enterprise,
}

impl Edition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Edition::Community => "community",
            Edition::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Edition {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "community" => Ok(Edition::Community),
            "enterprise" => Ok(Edition::Enterprise),
            other => Err(format!(
                "Unsupported edition '{}'. Expected 'community' or 'enterprise'",
                other
            )),
        }
    }
}

impl TryFrom<String> for Edition {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Edition> for String {
    fn from(edition: Edition) -> Self {
        edition.as_str().to_string()
    }
}

/// Marker spellings and the semver identifier each one maps to. Identifiers
/// sort lexically, so alpha < beta < candidate.
const PRE_RELEASE_TAGS: &[(&str, &str)] = &[
    ("alpha", "a"),
    ("beta", "b"),
    ("pre", "c"),
    ("rc", "c"),
    ("a", "a"),
    ("b", "b"),
    ("c", "c"),
];

/// Comparable form of a MongoDB version string.
///
/// The release is padded to three components (`2.6` becomes `2.6.0`) and a
/// pre-release marker becomes a numeric identifier pair such as `c.1`.
fn normalize(version: &str) -> Option<Version> {
    let lowered = version.trim().to_ascii_lowercase();
    let text = lowered.strip_prefix('v').unwrap_or(&lowered);

    let split = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(text.len());
    let (numeric, suffix) = text.split_at(split);

    // "2.6.0.rc1" puts the separator dot on the numeric side
    let (numeric, dotted) = match numeric.strip_suffix('.') {
        Some(stripped) if !suffix.is_empty() => (stripped, true),
        _ => (numeric, false),
    };

    let mut release = numeric
        .split('.')
        .map(|part| part.parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;
    while release.len() > 3 && release.last() == Some(&0) {
        release.pop();
    }
    if release.len() > 3 {
        return None;
    }
    release.resize(3, 0);

    let mut normalized = Version::new(release[0], release[1], release[2]);
    if !suffix.is_empty() {
        let marker = if dotted {
            suffix
        } else {
            suffix.strip_prefix(['-', '.', '~']).unwrap_or(suffix)
        };
        normalized.pre = parse_pre_release(marker)?;
    }

    Some(normalized)
}

fn parse_pre_release(marker: &str) -> Option<Prerelease> {
    let (rest, tag) = PRE_RELEASE_TAGS
        .iter()
        .find_map(|&(spelling, tag)| marker.strip_prefix(spelling).map(|rest| (rest, tag)))?;

    let digits = rest.strip_prefix('.').unwrap_or(rest);
    let number: u64 = if digits.is_empty() {
        0
    } else if digits.chars().all(|c| c.is_ascii_digit()) {
        digits.parse().ok()?
    } else {
        return None;
    };

    Prerelease::new(&format!("{}.{}", tag, number)).ok()
}

/// A validated MongoDB version plus the edition it refers to.
#[derive(Debug, Clone)]
pub struct VersionInfo {
    version_number: String,
    normalized: Version,
    edition: Edition,
}

impl VersionInfo {
    /// Build a version from a user-supplied string. The edition defaults to
    /// community.
    pub fn new(version_number: &str, edition: Option<Edition>) -> Result<Self> {
        let version_number = version_number.trim().replace("-pre-", "-pre");
        let normalized = normalize(&version_number)
            .ok_or_else(|| FetchError::InvalidVersion(version_number.clone()))?;

        Ok(Self {
            version_number,
            normalized,
            edition: edition.unwrap_or_default(),
        })
    }

    /// The version string as given (trimmed), used verbatim in archive names.
    pub fn version_number(&self) -> &str {
        &self.version_number
    }

    pub fn edition(&self) -> Edition {
        self.edition
    }

    /// Numeric comparison that ignores the edition.
    pub fn compare_version(&self, other: &VersionInfo) -> Ordering {
        self.normalized.cmp(&other.normalized)
    }

    pub fn is_at_least(&self, other: &VersionInfo) -> bool {
        self.compare_version(other) != Ordering::Less
    }
}

impl PartialEq for VersionInfo {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized && self.edition == other.edition
    }
}

impl Eq for VersionInfo {}

impl PartialOrd for VersionInfo {
    /// Orders by version number only. Numerically equal versions of
    /// different editions are unordered, keeping `==` and `partial_cmp`
    /// consistent.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.compare_version(other) {
            Ordering::Equal if self.edition != other.edition => None,
            ordering => Some(ordering),
        }
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.version_number, self.edition)
    }
}

/// Optional-aware constructor: `None` passes through untouched.
pub fn make_version_info(
    version_number: Option<&str>,
    edition: Option<Edition>,
) -> Result<Option<VersionInfo>> {
    version_number
        .map(|v| VersionInfo::new(v, edition))
        .transpose()
}

pub fn is_valid_version(version_number: &str) -> bool {
    VersionInfo::new(version_number, None).is_ok()
}

/// True for versions at or above [`MIN_SUPPORTED_VERSION`].
pub fn is_supported_mongo_version(version_number: &str) -> Result<bool> {
    let version = VersionInfo::new(version_number, None)?;
    let minimum = VersionInfo::new(MIN_SUPPORTED_VERSION, None)?;
    Ok(version.is_at_least(&minimum))
}
