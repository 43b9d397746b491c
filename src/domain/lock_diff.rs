//! Lock-diff structures parsed from composer-lock-diff
//!
//! The JSON schema is two top-level maps, `changes` and `changes-dev`, of
//! package name to an array whose first two elements are the from/to
//! versions (a compare URL may follow). Entries are validated here, at the
//! parsing boundary; a record with fewer than two version fields is a schema
//! error, not an empty diff.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single package version transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>")]
pub struct VersionChange {
    /// Version before the update attempt
    pub from: String,
    /// Version after the update attempt
    pub to: String,
}

impl VersionChange {
    /// Creates a version change
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl TryFrom<Vec<String>> for VersionChange {
    type Error = String;

    fn try_from(fields: Vec<String>) -> Result<Self, Self::Error> {
        let mut fields = fields.into_iter();
        match (fields.next(), fields.next()) {
            (Some(from), Some(to)) => Ok(Self { from, to }),
            _ => Err("change entry needs at least a from and a to version".to_string()),
        }
    }
}

/// Structural delta between two lock snapshots.
///
/// Keys are unique package names; BTreeMap keeps iteration order
/// deterministic regardless of the order composer-lock-diff emitted them in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockDiff {
    /// Changed production requirements
    #[serde(default)]
    pub changes: BTreeMap<String, VersionChange>,
    /// Changed development requirements
    #[serde(default, rename = "changes-dev")]
    pub changes_dev: BTreeMap<String, VersionChange>,
}

impl LockDiff {
    /// Creates an empty diff
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the `composer-lock-diff --json` output
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json.trim())
    }

    /// True when neither map has entries
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.changes_dev.is_empty()
    }

    /// The change recorded for a package, in either map
    pub fn change_for(&self, package: &str) -> Option<&VersionChange> {
        self.changes
            .get(package)
            .or_else(|| self.changes_dev.get(package))
    }

    /// True when any package other than the given one changed
    pub fn has_other_changes(&self, package: &str) -> bool {
        self.changes.keys().any(|name| name != package)
            || self.changes_dev.keys().any(|name| name != package)
    }
}
