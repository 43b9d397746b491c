//! Lock-diff classification and commit message synthesis
//!
//! Builds the deterministic `UPDATE - <package>: <categories>` commit
//! subject from what actually changed during one update attempt: the
//! target package itself, other dependencies, exported configuration,
//! or none of those.

use crate::domain::LockDiff;
use std::fmt;

/// What an update attempt changed, in fixed evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeCategory {
    /// The target package itself moved to a new version
    Package,
    /// Other entries of the lock moved
    Dependencies,
    /// Exported configuration changed
    Configuration,
    /// The lock changed but none of the above applies
    Other,
}

impl ChangeCategory {
    /// Stable label used in commit subjects
    pub fn label(&self) -> &'static str {
        match self {
            ChangeCategory::Package => "package",
            ChangeCategory::Dependencies => "dependencies",
            ChangeCategory::Configuration => "configuration",
            ChangeCategory::Other => "other",
        }
    }
}

impl fmt::Display for ChangeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifier over one attempt's lock diff and configuration state
pub struct LockDiffAnalyzer;

impl LockDiffAnalyzer {
    /// Classify an update attempt.
    ///
    /// Categories are appended in fixed order (package, dependencies,
    /// configuration); an attempt matching none yields exactly `[Other]`.
    pub fn classify(
        package: &str,
        diff: &LockDiff,
        configuration_changed: bool,
    ) -> Vec<ChangeCategory> {
        let mut categories = Vec::new();

        if diff.change_for(package).is_some() {
            categories.push(ChangeCategory::Package);
        }
        if diff.has_other_changes(package) {
            categories.push(ChangeCategory::Dependencies);
        }
        if configuration_changed {
            categories.push(ChangeCategory::Configuration);
        }

        if categories.is_empty() {
            categories.push(ChangeCategory::Other);
        }
        categories
    }

    /// Synthesize the commit subject for an update attempt
    pub fn commit_subject(
        package: &str,
        diff: &LockDiff,
        configuration_changed: bool,
    ) -> String {
        let categories = Self::classify(package, diff, configuration_changed);
        let labels: Vec<&str> = categories.iter().map(ChangeCategory::label).collect();
        format!("UPDATE - {}: {}", package, labels.join(", "))
    }
}
