//! Composer package records

use serde::{Deserialize, Serialize};
use std::fmt;

/// A package as reported by the Composer outdated snapshot.
///
/// Packages are ephemeral, re-derived on every run; `latest` is absent until
/// the outdated snapshot has been queried for this package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Package name in `vendor/name` shape
    pub name: String,
    /// Locked version
    pub version: String,
    /// Latest available version, if known
    #[serde(default)]
    pub latest: Option<String>,
}

impl Package {
    /// Creates a package without update information
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            latest: None,
        }
    }

    /// Creates a package with a known latest version
    pub fn with_latest(
        name: impl Into<String>,
        version: impl Into<String>,
        latest: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            latest: Some(latest.into()),
        }
    }

    /// True when a newer version than the locked one is known
    pub fn has_update(&self) -> bool {
        match &self.latest {
            Some(latest) => latest != &self.version,
            None => false,
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.latest {
            Some(latest) => write!(f, "{} {} (latest: {})", self.name, self.version, latest),
            None => write!(f, "{} {}", self.name, self.version),
        }
    }
}
