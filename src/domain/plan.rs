//! The ordered update plan

use serde::Serialize;

/// Ordered sequence of direct package names to update.
///
/// Insertion order is resolution order and determines update and commit
/// order; duplicates are dropped on insert. Fallbacks record transitive
/// candidates for which no direct ancestor could be found and that were
/// scheduled as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdatePlan {
    /// Packages to update, in order
    pub packages: Vec<String>,
    /// Candidates resolved to themselves for lack of a direct ancestor
    pub fallbacks: Vec<String>,
}

impl UpdatePlan {
    /// Creates an empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a plan from an explicit package list, deduplicated in order
    pub fn from_packages(packages: impl IntoIterator<Item = String>) -> Self {
        let mut plan = Self::new();
        for package in packages {
            plan.push(package);
        }
        plan
    }

    /// Appends a package unless it is already planned
    pub fn push(&mut self, package: String) {
        if !self.packages.contains(&package) {
            self.packages.push(package);
        }
    }

    /// Records a candidate that fell back to itself during resolution
    pub fn record_fallback(&mut self, candidate: String) {
        if !self.fallbacks.contains(&candidate) {
            self.fallbacks.push(candidate);
        }
    }

    /// Number of planned packages
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// True when nothing is planned
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Iterate planned package names in update order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.packages.iter().map(String::as_str)
    }

    /// True when the plan contains the package
    pub fn contains(&self, package: &str) -> bool {
        self.packages.iter().any(|p| p == package)
    }
}
