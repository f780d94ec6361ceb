//! Host operating system facts
//!
//! Reads `/etc/os-release` and reduces it to the facter-style pair the
//! classifier expects: an `osfamily` and an `operatingsystem` name.
//!
//! # Integration
//!
//! Call `OsFacts::detect()` when the caller did not pass facts explicitly.
//! Parsing is split out into `OsFacts::from_os_release()` so it can be tested
//! without touching the host.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::os::{self, OsFamily};

/// Standard os-release locations, in lookup order
const OS_RELEASE_PATHS: &[&str] = &["/etc/os-release", "/usr/lib/os-release"];

/// Raw operating system facts as gathered from the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsFacts {
    /// Family fact, e.g. `debian` or `redhat`
    pub os_family: String,
    /// Distribution name fact, e.g. `Ubuntu` or `CentOS`
    pub os_name: String,
}

impl OsFacts {
    pub fn new(os_family: impl Into<String>, os_name: impl Into<String>) -> Self {
        Self {
            os_family: os_family.into(),
            os_name: os_name.into(),
        }
    }

    /// Classify these facts into a supported family
    pub fn classify(&self) -> crate::error::Result<OsFamily> {
        os::classify(&self.os_family, &self.os_name)
    }

    /// Detect facts from the running host's os-release file.
    pub fn detect() -> Result<Self> {
        let path = OS_RELEASE_PATHS
            .iter()
            .map(Path::new)
            .find(|p| p.exists())
            .context("No os-release file found (looked in /etc and /usr/lib)")?;

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let facts = Self::from_os_release(&contents);
        tracing::info!(path = %path.display(), %facts, "detected operating system facts");
        Ok(facts)
    }

    /// Build facts from os-release contents.
    ///
    /// `ID` picks the distribution name, `ID` plus `ID_LIKE` pick the family.
    /// Unknown distributions keep their `NAME` so that classification errors
    /// name something recognizable.
    pub fn from_os_release(contents: &str) -> Self {
        let fields = parse_os_release(contents);
        let id = fields.get("ID").map(|s| s.to_ascii_lowercase()).unwrap_or_default();
        let id_like = fields
            .get("ID_LIKE")
            .map(|s| s.to_ascii_lowercase())
            .unwrap_or_default();

        let os_name = match id.as_str() {
            "ubuntu" => "Ubuntu".to_string(),
            "debian" => "Debian".to_string(),
            "centos" => "CentOS".to_string(),
            "rhel" => "RedHat".to_string(),
            "fedora" => "Fedora".to_string(),
            "amzn" => "Amazon".to_string(),
            "scientific" => "Scientific".to_string(),
            _ => fields.get("NAME").cloned().unwrap_or_else(|| id.clone()),
        };

        let lineage: Vec<&str> = std::iter::once(id.as_str())
            .chain(id_like.split_whitespace())
            .collect();
        let os_family = if lineage.iter().any(|i| matches!(*i, "debian" | "ubuntu")) {
            "debian".to_string()
        } else if lineage
            .iter()
            .any(|i| matches!(*i, "rhel" | "fedora" | "centos"))
        {
            "redhat".to_string()
        } else {
            id
        };

        Self { os_family, os_name }
    }
}

impl fmt::Display for OsFacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os_family, self.os_name)
    }
}

/// Parse `KEY=value` lines, stripping optional single or double quotes.
fn parse_os_release(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
