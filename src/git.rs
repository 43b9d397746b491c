//! Git adapter
//!
//! Staging, status queries, commits with a forced author identity, and the
//! checkout-based rollback used by the per-package update protocol.

use crate::error::CommandError;
use crate::executor::CommandRunner;

/// Substring git prints when a commit has nothing staged
const NOTHING_TO_COMMIT: &str = "nothing to commit";

/// Adapter over the git CLI
pub struct Git<'a> {
    runner: &'a dyn CommandRunner,
    /// Author identity attached to every commit, `Name <email>` shape
    author: String,
}

impl<'a> Git<'a> {
    /// Create an adapter committing as the given author
    pub fn new(runner: &'a dyn CommandRunner, author: impl Into<String>) -> Self {
        Self {
            runner,
            author: author.into(),
        }
    }

    /// Number of changed paths under the given path, staged or not
    pub fn changed_count(&self, path: &str) -> Result<usize, CommandError> {
        let output = self
            .runner
            .run(&["git", "status", "--porcelain", path])?;
        Ok(output.stdout.lines().filter(|l| !l.trim().is_empty()).count())
    }

    /// True when anything under the path differs from HEAD
    pub fn has_changes(&self, path: &str) -> Result<bool, CommandError> {
        Ok(self.changed_count(path)? > 0)
    }

    /// Stage the given paths
    pub fn add(&self, paths: &[&str]) -> Result<(), CommandError> {
        let mut argv = vec!["git", "add"];
        argv.extend_from_slice(paths);
        self.runner.run(&argv)?;
        Ok(())
    }

    /// Restore the given paths to their last-committed state
    pub fn checkout(&self, paths: &[&str]) -> Result<(), CommandError> {
        let mut argv = vec!["git", "checkout", "--"];
        argv.extend_from_slice(paths);
        self.runner.run(&argv)?;
        Ok(())
    }

    /// Commit staged changes with the configured author.
    ///
    /// Returns false instead of failing when there was nothing to commit,
    /// so repeated runs over an unchanged tree stay clean. Hooks are
    /// bypassed; update commits must not depend on project hook state.
    pub fn commit(&self, subject: &str, body: Option<&str>) -> Result<bool, CommandError> {
        let author = format!("--author={}", self.author);
        let mut argv = vec!["git", "commit", "-m", subject];
        if let Some(body) = body {
            argv.push("-m");
            argv.push(body);
        }
        argv.push(&author);
        argv.push("--no-verify");

        match self.runner.run(&argv) {
            Ok(_) => Ok(true),
            Err(CommandError::Failed { stdout, stderr, .. })
                if stdout.contains(NOTHING_TO_COMMIT) || stderr.contains(NOTHING_TO_COMMIT) =>
            {
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}
