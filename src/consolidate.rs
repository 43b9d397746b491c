//! Configuration consolidation
//!
//! Precondition step run once before any package update: for every
//! configured environment, rebuild caches, import pending configuration,
//! export the runtime configuration, and commit whatever drifted under the
//! config path. After this, configuration deltas observed during package
//! updates are attributable to the update itself and not to pre-existing
//! drift.
//!
//! Command failures here are fatal; an installation whose baseline cannot
//! be established must not be updated.

use crate::drush::Drush;
use crate::error::CommandError;
use crate::git::Git;
use crate::project::CONFIG_PATH;
use serde::Serialize;

/// What consolidation did on one environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsolidationResult {
    /// The drush alias of the environment
    pub environment: String,
    /// Whether exported configuration differed from the committed state
    pub changed: bool,
    /// Whether a consolidation commit was created
    pub committed: bool,
}

/// The consolidation phase over a set of environments
pub struct ConsolidationPhase<'a> {
    git: &'a Git<'a>,
    drush: &'a Drush<'a>,
    environments: &'a [String],
}

impl<'a> ConsolidationPhase<'a> {
    /// Create the phase for the configured environments
    pub fn new(git: &'a Git<'a>, drush: &'a Drush<'a>, environments: &'a [String]) -> Self {
        Self {
            git,
            drush,
            environments,
        }
    }

    /// Consolidate every environment, in configuration order
    pub fn run(&self) -> Result<Vec<ConsolidationResult>, CommandError> {
        let mut results = Vec::with_capacity(self.environments.len());

        for environment in self.environments {
            self.drush.cache_rebuild(environment)?;
            self.drush.config_import(environment)?;
            self.drush.config_export(environment)?;

            let changed = self.git.has_changes(CONFIG_PATH)?;
            self.git.add(&[CONFIG_PATH])?;
            let committed = self.git.commit(
                &format!("Consolidate current configuration on {}", environment),
                None,
            )?;

            results.push(ConsolidationResult {
                environment: environment.clone(),
                changed,
                committed,
            });
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{CommandOutput, CommandRunner};
    use std::cell::RefCell;

    /// Runner that records calls and answers git status with scripted text
    struct ScriptedRunner {
        status_output: String,
        commit_fails_empty: bool,
        calls: RefCell<Vec<String>>,
    }

    impl ScriptedRunner {
        fn new(status_output: &str, commit_fails_empty: bool) -> Self {
            Self {
                status_output: status_output.to_string(),
                commit_fails_empty,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, argv: &[&str]) -> Result<CommandOutput, CommandError> {
            let command = argv.join(" ");
            self.calls.borrow_mut().push(command.clone());
            if command.starts_with("git status") {
                return Ok(CommandOutput::from_stdout(self.status_output.clone()));
            }
            if command.starts_with("git commit") && self.commit_fails_empty {
                return Err(CommandError::Failed {
                    command,
                    code: Some(1),
                    stdout: "nothing to commit, working tree clean\n".to_string(),
                    stderr: String::new(),
                });
            }
            Ok(CommandOutput::default())
        }
    }

    fn environments(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_consolidates_each_environment_in_order() {
        let runner = ScriptedRunner::new(" M config/system.site.yml\n", false);
        let git = Git::new(&runner, "Drupal <drupal@update-helper>");
        let drush = Drush::new(&runner);
        let envs = environments(&["@self", "@stage"]);

        let results = ConsolidationPhase::new(&git, &drush, &envs).run().unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.changed && r.committed));

        let calls = runner.calls();
        let expected_per_env = |env: &str| {
            vec![
                format!("drush {} cr", env),
                format!("drush {} cim -y", env),
                format!("drush {} cex -y", env),
                "git status --porcelain config".to_string(),
                "git add config".to_string(),
                format!(
                    "git commit -m Consolidate current configuration on {} \
                     --author=Drupal <drupal@update-helper> --no-verify",
                    env
                ),
            ]
        };
        let mut expected = expected_per_env("@self");
        expected.extend(expected_per_env("@stage"));
        assert_eq!(calls, expected);
    }

    #[test]
    fn test_clean_environment_commits_nothing() {
        let runner = ScriptedRunner::new("", true);
        let git = Git::new(&runner, "a <a@b>");
        let drush = Drush::new(&runner);
        let envs = environments(&["@self"]);

        let results = ConsolidationPhase::new(&git, &drush, &envs).run().unwrap();

        assert_eq!(results.len(), 1);
        assert!(!results[0].changed);
        assert!(!results[0].committed);
    }

    #[test]
    fn test_drush_failure_is_fatal() {
        struct FailingRunner;
        impl CommandRunner for FailingRunner {
            fn run(&self, argv: &[&str]) -> Result<CommandOutput, CommandError> {
                Err(CommandError::Failed {
                    command: argv.join(" "),
                    code: Some(1),
                    stdout: String::new(),
                    stderr: "cache rebuild failed".to_string(),
                })
            }
        }
        let runner = FailingRunner;
        let git = Git::new(&runner, "a <a@b>");
        let drush = Drush::new(&runner);
        let envs = environments(&["@self"]);

        assert!(ConsolidationPhase::new(&git, &drush, &envs).run().is_err());
    }

    #[test]
    fn test_no_environments_is_a_no_op() {
        let runner = ScriptedRunner::new("", false);
        let git = Git::new(&runner, "a <a@b>");
        let drush = Drush::new(&runner);
        let envs: Vec<String> = Vec::new();

        let results = ConsolidationPhase::new(&git, &drush, &envs).run().unwrap();
        assert!(results.is_empty());
        assert!(runner.calls().is_empty());
    }
}
