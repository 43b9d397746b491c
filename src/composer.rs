//! Composer adapter
//!
//! This module is the only place Composer (and composer-lock-diff) is
//! invoked and the only place its output is interpreted:
//! - Name-only package lists (outdated, direct) massaged into clean lists
//! - Security advisory extraction from `composer audit` plain output
//! - The JSON outdated snapshot
//! - `composer why` ownership queries, the recursive one wrapped in a
//!   bounded timeout
//! - Package type lookup for extension classification
//! - Lock diffs, structured and plain text
//!
//! Parsing is strict where structure matters (JSON snapshots, lock diffs)
//! and tolerant where Composer mixes noise into line output.

use crate::domain::{LockDiff, Package};
use crate::error::{AppError, CommandError, ParseError};
use crate::executor::{CommandOutput, CommandRunner};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

/// Default bound, in seconds, on the recursive ownership query
pub const DEFAULT_WHY_TIMEOUT_SECS: u64 = 2;

/// Package type prefix identifying Drupal extensions
const DRUPAL_TYPE_PREFIX: &str = "drupal";

/// The one Drupal package type that is not treated as an extension
const DRUPAL_LIBRARY_TYPE: &str = "drupal-library";

fn package_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$").expect("invalid package name pattern")
    })
}

/// Massage a newline-separated package list into clean names.
///
/// Drops blank lines, surrounding whitespace, and anything that is not
/// `vendor/name` shaped (Composer mixes warnings into name-only output).
pub fn massage_package_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| package_name_regex().is_match(line))
        .map(str::to_string)
        .collect()
}

/// Extract advisory package names from `composer audit --format=plain`.
///
/// Advisory blocks carry `Package: vendor/name` lines; the result is
/// sorted and deduplicated since one package can have several advisories.
fn parse_audit_packages(text: &str) -> Vec<String> {
    let mut names: Vec<String> = text
        .lines()
        .filter_map(|line| line.trim().strip_prefix("Package:"))
        .map(|name| name.trim().to_string())
        .filter(|name| package_name_regex().is_match(name))
        .collect();
    names.sort();
    names.dedup();
    names
}

/// First whitespace-separated token of every non-empty line
fn first_tokens(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Extract the `type` field from `composer show <package>` output
fn parse_show_type(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if key.trim() == "type" {
            Some(value.trim().to_string())
        } else {
            None
        }
    })
}

/// Shape of `composer show --locked --format=json` output
#[derive(Debug, Deserialize)]
struct LockedSnapshot {
    #[serde(default)]
    locked: Vec<Package>,
}

/// Adapter over the Composer CLI and composer-lock-diff
pub struct Composer<'a> {
    runner: &'a dyn CommandRunner,
    /// Restrict queries and updates to main requirements
    no_dev: bool,
    /// Bound on the recursive ownership query, in seconds
    why_timeout_secs: u64,
}

impl<'a> Composer<'a> {
    /// Create an adapter over the given command runner
    pub fn new(runner: &'a dyn CommandRunner, no_dev: bool) -> Self {
        Self {
            runner,
            no_dev,
            why_timeout_secs: DEFAULT_WHY_TIMEOUT_SECS,
        }
    }

    /// Override the recursive ownership query bound
    pub fn with_why_timeout(mut self, secs: u64) -> Self {
        self.why_timeout_secs = secs;
        self
    }

    fn run(&self, argv: &[&str]) -> Result<CommandOutput, CommandError> {
        self.runner.run(argv)
    }

    fn push_no_dev<'s>(&self, argv: &mut Vec<&'s str>) {
        if self.no_dev {
            argv.push("--no-dev");
        }
    }

    /// Names of all outdated locked packages
    pub fn outdated_names(&self) -> Result<Vec<String>, CommandError> {
        let mut argv = vec!["composer", "show", "--locked", "--outdated", "--name-only"];
        self.push_no_dev(&mut argv);
        let output = self.run(&argv)?;
        Ok(massage_package_list(&output.stdout))
    }

    /// Names of all direct locked packages
    pub fn direct_names(&self) -> Result<Vec<String>, CommandError> {
        let mut argv = vec!["composer", "show", "--locked", "--direct", "--name-only"];
        self.push_no_dev(&mut argv);
        let output = self.run(&argv)?;
        Ok(massage_package_list(&output.stdout))
    }

    /// Names of locked packages with outstanding security advisories.
    ///
    /// `composer audit` exits non-zero whenever advisories exist, so a
    /// failed exit still carries the list we are after.
    pub fn audit_names(&self) -> Result<Vec<String>, CommandError> {
        let mut argv = vec!["composer", "audit", "--locked", "--format=plain"];
        self.push_no_dev(&mut argv);
        match self.run(&argv) {
            Ok(output) => Ok(parse_audit_packages(&output.stdout)),
            Err(CommandError::Failed { stdout, .. }) => Ok(parse_audit_packages(&stdout)),
            Err(err) => Err(err),
        }
    }

    /// The full outdated snapshot with current and latest versions
    pub fn outdated_packages(&self) -> Result<Vec<Package>, AppError> {
        let mut argv = vec!["composer", "show", "--locked", "--outdated", "--format=json"];
        self.push_no_dev(&mut argv);
        let output = self.run(&argv)?;
        let snapshot: LockedSnapshot = serde_json::from_str(output.stdout.trim()).map_err(|e| {
            ParseError::schema("composer show --outdated --format=json", e.to_string())
        })?;
        Ok(snapshot.locked)
    }

    /// Direct dependents of a package (non-recursive ownership query)
    pub fn why(&self, package: &str) -> Result<Vec<String>, CommandError> {
        let output = self.run(&["composer", "why", package, "--locked"])?;
        Ok(first_tokens(&output.stdout))
    }

    /// Recursive dependents of a package, bounded by the timeout wrapper.
    ///
    /// Deep dependency graphs can make the recursive query explode; expiry
    /// surfaces as a Failed error with the timeout exit code, which callers
    /// treat as "no result".
    pub fn why_recursive(&self, package: &str) -> Result<Vec<String>, CommandError> {
        let timeout = self.why_timeout_secs.to_string();
        let output = self.run(&[
            "timeout",
            timeout.as_str(),
            "composer",
            "why",
            package,
            "--locked",
            "-r",
        ])?;
        Ok(first_tokens(&output.stdout))
    }

    /// The declared composer package type
    pub fn package_type(&self, package: &str) -> Result<Option<String>, CommandError> {
        let output = self.run(&["composer", "show", package])?;
        Ok(parse_show_type(&output.stdout))
    }

    /// True for Drupal module/theme/drush-command packages.
    ///
    /// Libraries carry no installable hooks or configuration, so they skip
    /// the extension post-processing.
    pub fn is_drupal_extension(&self, package: &str) -> Result<bool, CommandError> {
        let package_type = self.package_type(package)?;
        Ok(package_type.is_some_and(|t| {
            t.starts_with(DRUPAL_TYPE_PREFIX) && t != DRUPAL_LIBRARY_TYPE
        }))
    }

    /// Attempt the update for one package and its dependencies.
    ///
    /// The captured output is returned on success too; constraint-conflict
    /// detection scans it afterwards.
    pub fn update(&self, package: &str) -> Result<CommandOutput, CommandError> {
        let mut argv = vec!["composer", "update", package, "--with-dependencies"];
        self.push_no_dev(&mut argv);
        self.run(&argv)
    }

    /// Structured diff between the committed and working lock files
    pub fn lock_diff(&self) -> Result<LockDiff, AppError> {
        let output = self.run(&["composer-lock-diff", "--json"])?;
        LockDiff::from_json(&output.stdout)
            .map_err(|e| ParseError::schema("composer-lock-diff --json", e.to_string()).into())
    }

    /// Plain-text diff table between the committed and working lock files
    pub fn lock_diff_text(&self) -> Result<String, CommandError> {
        let output = self.run(&["composer-lock-diff"])?;
        Ok(output.stdout.trim().to_string())
    }

    /// Plain-text diff table between two explicit lock files
    pub fn lock_diff_between(&self, from: &str, to: &str) -> Result<String, CommandError> {
        let output = self.run(&["composer-lock-diff", "--from", from, "--to", to])?;
        Ok(output.stdout.trim().to_string())
    }

    /// Raw outdated listing restricted to direct packages, for the report
    pub fn outdated_direct_text(&self) -> Result<String, CommandError> {
        let output = self.run(&["composer", "show", "--locked", "--outdated", "--direct"])?;
        Ok(output.stdout.trim().to_string())
    }

    /// Raw outdated listing of all packages, for the report
    pub fn outdated_text(&self) -> Result<String, CommandError> {
        let output = self.run(&["composer", "show", "--locked", "--outdated"])?;
        Ok(output.stdout.trim().to_string())
    }
}
