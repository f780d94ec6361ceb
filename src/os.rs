//! Operating system classification
//!
//! Maps raw facter-style facts (`osfamily`, `operatingsystem`) onto the closed
//! set of families the agent packages are published for. Anything else is a
//! hard failure before any parameter is resolved.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::{AgentConfError, Result};

/// Operating system names shipped from the apt repository
pub const DEBIAN_OS: &[&str] = &["Debian", "Ubuntu"];

/// Operating system names shipped from the yum repository
pub const REDHAT_OS: &[&str] = &["RedHat", "CentOS", "Fedora", "Amazon", "Scientific"];

/// Supported operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum OsFamily {
    Debian,
    RedHat,
}

impl OsFamily {
    /// Package manager used to install the agent
    pub fn package_provider(&self) -> &'static str {
        match self {
            Self::Debian => "apt",
            Self::RedHat => "yum",
        }
    }

    /// Ruby headers package needed to build the dogapi gem
    pub fn rubydev_package(&self) -> &'static str {
        match self {
            Self::Debian => "ruby-dev",
            Self::RedHat => "ruby-devel",
        }
    }

    /// Operating system names known to belong to this family
    pub fn known_names(&self) -> &'static [&'static str] {
        match self {
            Self::Debian => DEBIAN_OS,
            Self::RedHat => REDHAT_OS,
        }
    }
}

/// Classify an operating system from its family and name facts.
///
/// The name is checked first against the known distributions; an unknown name
/// still classifies when the family fact is `debian` or `redhat`. Matching is
/// case-insensitive.
///
/// # Errors
///
/// `UnsupportedOperatingSystem` carrying `os_name` when neither matches.
pub fn classify(os_family: &str, os_name: &str) -> Result<OsFamily> {
    let name = os_name.trim();
    let by_name = |names: &[&str]| names.iter().any(|n| n.eq_ignore_ascii_case(name));

    let family = if by_name(DEBIAN_OS) {
        Some(OsFamily::Debian)
    } else if by_name(REDHAT_OS) {
        Some(OsFamily::RedHat)
    } else {
        os_family.trim().parse::<OsFamily>().ok()
    };

    match family {
        Some(family) => {
            tracing::debug!(os_family, os_name, %family, "classified operating system");
            Ok(family)
        }
        None => Err(AgentConfError::unsupported_os(os_name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_classify_known_names() {
        for name in DEBIAN_OS {
            assert_eq!(classify("debian", name).unwrap(), OsFamily::Debian);
        }
        for name in REDHAT_OS {
            assert_eq!(classify("redhat", name).unwrap(), OsFamily::RedHat);
        }
    }

    #[test]
    fn test_classify_name_wins_over_family() {
        // A stale family fact does not override a recognized name
        assert_eq!(classify("redhat", "Ubuntu").unwrap(), OsFamily::Debian);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify("", "ubuntu").unwrap(), OsFamily::Debian);
        assert_eq!(classify("", "CENTOS").unwrap(), OsFamily::RedHat);
    }

    #[test]
    fn test_classify_falls_back_to_family() {
        assert_eq!(classify("Debian", "LinuxMint").unwrap(), OsFamily::Debian);
        assert_eq!(classify("RedHat", "OracleLinux").unwrap(), OsFamily::RedHat);
    }

    #[test]
    fn test_classify_unsupported() {
        let err = classify("Solaris", "Nexenta").unwrap_err();
        assert_eq!(err, AgentConfError::UnsupportedOperatingSystem("Nexenta".into()));
        assert!(err.to_string().contains("Unsupported operatingsystem: Nexenta"));
    }

    #[test]
    fn test_classify_empty_facts() {
        assert!(classify("", "").is_err());
    }

    #[test]
    fn test_family_constants() {
        assert_eq!(OsFamily::Debian.package_provider(), "apt");
        assert_eq!(OsFamily::RedHat.package_provider(), "yum");
        assert_eq!(OsFamily::Debian.rubydev_package(), "ruby-dev");
        assert_eq!(OsFamily::RedHat.rubydev_package(), "ruby-devel");
    }

    #[test]
    fn test_every_family_has_names() {
        for family in OsFamily::iter() {
            assert!(!family.known_names().is_empty());
        }
    }
}
