//! CLI argument parsing module for drupdater

use crate::config::DEFAULT_CONFIG_FILE;
use clap::Parser;
use std::path::PathBuf;

/// Automated Drupal composer package updater
#[derive(Parser, Debug, Clone)]
#[command(
    name = "drupdater",
    version,
    about = "Automated Drupal composer package updater",
    long_about = "Updates composer packages one at a time.\n\n\
        A run includes:\n\
        - Committing current configuration not yet exported (consolidation)\n\
        - Identifying updatable composer packages\n\
        - Updating and committing each package, restoring the previous state on failure\n\
        - A report of what happened"
)]
pub struct CliArgs {
    /// Project root containing composer.json (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Configuration file
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Comma separated list of drush aliases to update
    #[arg(long, value_delimiter = ',')]
    pub environments: Vec<String>,

    /// Git author for the commits
    #[arg(short, long)]
    pub author: Option<String>,

    /// Only update packages with security advisories
    #[arg(short = 's', long)]
    pub security: bool,

    /// Only update main requirements
    #[arg(long)]
    pub no_dev: bool,

    /// Comma separated list of packages to update
    #[arg(short, long, value_delimiter = ',')]
    pub packages: Vec<String>,

    /// Skip the configuration consolidation phase
    #[arg(long)]
    pub no_consolidation: bool,

    // Output options
    /// Output the report in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output - echo external commands as they run
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - no progress display
    #[arg(short, long)]
    pub quiet: bool,
}
