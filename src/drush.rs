//! Drush adapter
//!
//! Per-environment Drupal administration commands: cache rebuild,
//! configuration import/export, and database updates. Every command targets
//! one drush alias; callers iterate the configured environment list.

use crate::error::CommandError;
use crate::executor::CommandRunner;

/// Adapter over the drush CLI
pub struct Drush<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Drush<'a> {
    /// Create an adapter over the given command runner
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    fn run(&self, environment: &str, args: &[&str]) -> Result<(), CommandError> {
        let mut argv = vec!["drush", environment];
        argv.extend_from_slice(args);
        self.runner.run(&argv)?;
        Ok(())
    }

    /// Rebuild all caches on the environment
    pub fn cache_rebuild(&self, environment: &str) -> Result<(), CommandError> {
        self.run(environment, &["cr"])
    }

    /// Import pending configuration on the environment
    pub fn config_import(&self, environment: &str) -> Result<(), CommandError> {
        self.run(environment, &["cim", "-y"])
    }

    /// Export current configuration on the environment
    pub fn config_export(&self, environment: &str) -> Result<(), CommandError> {
        self.run(environment, &["cex", "-y"])
    }

    /// Apply pending database updates on the environment
    pub fn update_database(&self, environment: &str) -> Result<(), CommandError> {
        self.run(environment, &["updb", "-y"])
    }
}
