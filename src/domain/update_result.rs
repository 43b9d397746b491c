//! Per-package update results

use super::LockDiff;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage at which a caught failure happened.
///
/// Either way the manifest and lock files were rolled back to their
/// pre-attempt state before the result was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// The composer update command itself failed
    Update,
    /// The update applied but the extension post-processing failed
    Postprocess,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Update => write!(f, "update"),
            FailureStage::Postprocess => write!(f, "post-processing"),
        }
    }
}

/// Outcome of one package update attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// The lock did not change and no newer version is known
    NoChangeAvailable,
    /// A newer version exists but manifest constraints withheld it
    BlockedByConstraints {
        /// The version that could not be applied
        latest: String,
    },
    /// The lock changed and the update was committed
    Updated,
    /// The attempt failed and was rolled back
    Failed {
        stage: FailureStage,
        message: String,
    },
}

impl fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateOutcome::NoChangeAvailable => write!(f, "no update available"),
            UpdateOutcome::BlockedByConstraints { latest } => {
                write!(f, "blocked by constraints (latest: {})", latest)
            }
            UpdateOutcome::Updated => write!(f, "updated"),
            UpdateOutcome::Failed { stage, message } => {
                write!(f, "{} failed, rolled back: {}", stage, message)
            }
        }
    }
}

/// Result of processing a single package from the plan.
///
/// Created once by the orchestrator and never mutated afterwards;
/// `commit_message` is present only when a commit was actually made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResult {
    /// The package the plan targeted
    pub package: String,
    /// What happened
    pub outcome: UpdateOutcome,
    /// Lock delta for this attempt, empty unless the lock changed
    #[serde(default)]
    pub lock_diff: LockDiff,
    /// Commit subject, when a commit was made
    pub commit_message: Option<String>,
}

impl UpdateResult {
    /// Creates a no-change result
    pub fn no_change(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            outcome: UpdateOutcome::NoChangeAvailable,
            lock_diff: LockDiff::new(),
            commit_message: None,
        }
    }

    /// Creates a constraint-blocked result
    pub fn blocked(package: impl Into<String>, latest: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            outcome: UpdateOutcome::BlockedByConstraints {
                latest: latest.into(),
            },
            lock_diff: LockDiff::new(),
            commit_message: None,
        }
    }

    /// Creates a committed update result
    pub fn updated(
        package: impl Into<String>,
        lock_diff: LockDiff,
        commit_message: impl Into<String>,
    ) -> Self {
        Self {
            package: package.into(),
            outcome: UpdateOutcome::Updated,
            lock_diff,
            commit_message: Some(commit_message.into()),
        }
    }

    /// Creates a rolled-back failure result
    pub fn failed(
        package: impl Into<String>,
        stage: FailureStage,
        message: impl Into<String>,
    ) -> Self {
        Self {
            package: package.into(),
            outcome: UpdateOutcome::Failed {
                stage,
                message: message.into(),
            },
            lock_diff: LockDiff::new(),
            commit_message: None,
        }
    }

    /// True when the package was updated and committed
    pub fn is_updated(&self) -> bool {
        matches!(self.outcome, UpdateOutcome::Updated)
    }

    /// True when the attempt failed and was rolled back
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, UpdateOutcome::Failed { .. })
    }

    /// True when an update exists but constraints withheld it
    pub fn is_blocked(&self) -> bool {
        matches!(self.outcome, UpdateOutcome::BlockedByConstraints { .. })
    }
}

impl fmt::Display for UpdateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.package, self.outcome)
    }
}
