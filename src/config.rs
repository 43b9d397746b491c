//! Run configuration
//!
//! Loaded from an optional TOML file, then overridden by command-line
//! options. Typed deserialization is the validation layer: a recognized key
//! holding the wrong value type aborts the run before any external command
//! is executed.

use crate::cli::CliArgs;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Author identity used when none is configured
pub const DEFAULT_AUTHOR: &str = "Drupal <drupal@update-helper>";

/// Configuration file probed when none is given on the command line
pub const DEFAULT_CONFIG_FILE: &str = ".drupdater.toml";

/// Everything a run needs to know, resolved before the run starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Git author for every commit the run creates
    pub author: String,
    /// Drush aliases of the environments to update
    pub environments: Vec<String>,
    /// Only update packages with security advisories
    pub only_securities: bool,
    /// Only update main (non-dev) requirements
    pub no_dev: bool,
    /// Run the configuration consolidation phase before updating
    pub consolidate_configuration: bool,
    /// Explicit packages to update; bypasses checking and resolution
    pub packages: Vec<String>,
    /// Bound on the recursive ownership query, in seconds
    pub why_timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            author: DEFAULT_AUTHOR.to_string(),
            environments: vec!["@self".to_string()],
            only_securities: false,
            no_dev: false,
            consolidate_configuration: true,
            packages: Vec::new(),
            why_timeout: crate::composer::DEFAULT_WHY_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Parse a configuration file that must exist
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::not_found(path)
            } else {
                ConfigError::read_error(path, e)
            }
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::parse_error(path, e.to_string()))
    }

    /// Load the file when present, defaults otherwise
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply command-line overrides on top of the file values
    pub fn apply_cli(&mut self, args: &CliArgs) {
        if !args.environments.is_empty() {
            self.environments = args.environments.clone();
        }
        if let Some(author) = &args.author {
            self.author = author.clone();
        }
        if args.security {
            self.only_securities = true;
        }
        if args.no_dev {
            self.no_dev = true;
        }
        if !args.packages.is_empty() {
            self.packages = args.packages.clone();
        }
        if args.no_consolidation {
            self.consolidate_configuration = false;
        }
    }

    /// True when an explicit package list bypasses the checking phase
    pub fn has_explicit_packages(&self) -> bool {
        !self.packages.is_empty()
    }
}
