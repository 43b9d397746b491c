//! Core domain models for drupdater
//!
//! This module contains the fundamental types used throughout the application:
//! - Package records derived from the Composer outdated snapshot
//! - The ordered update plan produced by package resolution
//! - Lock-diff structures parsed from composer-lock-diff
//! - Per-package update results and outcomes

mod lock_diff;
mod package;
mod plan;
mod update_result;

pub use lock_diff::{LockDiff, VersionChange};
pub use package::Package;
pub use plan::UpdatePlan;
pub use update_result::{FailureStage, UpdateOutcome, UpdateResult};
