// Platform detection for archive naming

use crate::error::{FetchError, Result};
use log::debug;
use std::fs;

/// OS tokens understood by MongoDB archive names
pub const SUPPORTED_OS_NAMES: [&str; 4] = ["linux", "osx", "win32", "sunos5"];

const OS_RELEASE_PATH: &str = "/etc/os-release";

/// Platform facts used to build a download location.
///
/// Always computed from the live host; nothing here is cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformSpec {
    pub os_name: String,
    pub bits: u32,
    pub platform_spec: String,
    pub os_dist_name: Option<String>,
    pub os_dist_version: Option<String>,
}

impl PlatformSpec {
    /// Probe the running host.
    pub fn detect() -> Result<Self> {
        let os_name = resolve_os_name();
        let bits = host_bits();
        let platform_spec = resolve_platform_spec(&os_name, bits)?;
        let (os_dist_name, os_dist_version) = resolve_dist_info();

        debug!(
            "Detected platform: os={} bits={} spec={} dist={:?} {:?}",
            os_name, bits, platform_spec, os_dist_name, os_dist_version
        );

        Ok(Self {
            os_name,
            bits,
            platform_spec,
            os_dist_name,
            os_dist_version,
        })
    }

    /// Distribution version with the dots removed (e.g. "14.04" -> "1404")
    pub fn os_dist_version_no_dots(&self) -> Option<String> {
        self.os_dist_version.as_ref().map(|v| v.replace('.', ""))
    }
}

/// Canonical OS token for the running host
pub fn resolve_os_name() -> String {
    let mac_version = if cfg!(target_os = "macos") {
        mac_product_version()
    } else {
        None
    };
    normalize_os_name(host_system_name(), mac_version.as_deref())
}

/// Map a reported system name onto one of the canonical OS tokens.
///
/// Unknown systems come back lowercased so that [`resolve_platform_spec`]
/// can reject them with a useful message.
pub fn normalize_os_name(system: &str, mac_product_version: Option<&str>) -> String {
    let system = system.trim().to_lowercase();
    match system.as_str() {
        "darwin" | "macos" if mac_product_version.is_some_and(|v| !v.trim().is_empty()) => {
            "osx".to_string()
        }
        "windows" | "win32" => "win32".to_string(),
        "solaris" | "illumos" | "sunos" => "sunos5".to_string(),
        _ => system,
    }
}

fn host_system_name() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

fn mac_product_version() -> Option<String> {
    let output = std::process::Command::new("sw_vers")
        .arg("-productVersion")
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!version.is_empty()).then_some(version)
}

fn host_bits() -> u32 {
    if cfg!(target_pointer_width = "64") { 64 } else { 32 }
}

/// Linux distribution name (lowercase) and dotted version.
///
/// Both are `None` unless both are known.
pub fn resolve_dist_info() -> (Option<String>, Option<String>) {
    if !cfg!(target_os = "linux") {
        return (None, None);
    }
    match fs::read_to_string(OS_RELEASE_PATH) {
        Ok(contents) => parse_os_release(&contents),
        Err(e) => {
            debug!("Unable to read {}: {}", OS_RELEASE_PATH, e);
            (None, None)
        }
    }
}

/// Extract `ID` and `VERSION_ID` from an os-release document.
pub fn parse_os_release(contents: &str) -> (Option<String>, Option<String>) {
    let mut name = None;
    let mut version = None;

    for line in contents.lines() {
        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches(|c: char| c == '"' || c == '\'');
        match key.trim() {
            "ID" => name = Some(value.to_lowercase()),
            "VERSION_ID" => version = Some(value.to_string()),
            _ => {}
        }
    }

    match (name, version) {
        (Some(n), Some(v)) if !n.is_empty() && !v.is_empty() => (Some(n), Some(v)),
        _ => (None, None),
    }
}

/// Canonical platform spec for an OS token and word size.
///
/// 32-bit names follow the historical archive naming, including the bare
/// `i86pc` for Solaris.
pub fn resolve_platform_spec(os_name: &str, bits: u32) -> Result<String> {
    if !SUPPORTED_OS_NAMES.contains(&os_name) {
        return Err(FetchError::UnsupportedPlatform(os_name.to_string()));
    }

    if bits == 64 {
        return Ok(format!("{}-x86_64", os_name));
    }

    let spec = match os_name {
        "linux" => "linux-i686".to_string(),
        "osx" | "win32" => format!("{}-i386", os_name),
        _ => "i86pc".to_string(),
    };
    Ok(spec)
}
