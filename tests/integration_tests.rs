//! Integration tests for drupdater
//!
//! These tests drive the orchestrator and resolver through the public API
//! with a scripted command runner, verifying:
//! - The full run sequence and its report
//! - Failure isolation and rollback behavior
//! - Resolver coverage over mixed candidate sets

use drupdater::config::Config;
use drupdater::domain::{FailureStage, UpdateOutcome};
use drupdater::error::CommandError;
use drupdater::executor::{CommandOutput, CommandRunner};
use drupdater::orchestrator::{RunReport, UpdateOrchestrator};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

/// Command runner that replays scripted responses per exact command line.
///
/// Unscripted commands succeed with empty output, matching quiet external
/// tools; commands are recorded for sequence assertions.
struct ScriptedRunner {
    responses: RefCell<HashMap<String, Vec<Result<CommandOutput, CommandError>>>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    fn new() -> Self {
        Self {
            responses: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn on_stdout(self, command: &str, stdout: &str) -> Self {
        self.responses
            .borrow_mut()
            .entry(command.to_string())
            .or_default()
            .push(Ok(CommandOutput {
                stdout: stdout.to_string(),
                stderr: String::new(),
            }));
        self
    }

    fn on_failure(self, command: &str, code: i32, stderr: &str) -> Self {
        self.responses
            .borrow_mut()
            .entry(command.to_string())
            .or_default()
            .push(Err(CommandError::Failed {
                command: command.to_string(),
                code: Some(code),
                stdout: String::new(),
                stderr: stderr.to_string(),
            }));
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn called(&self, command: &str) -> bool {
        self.calls.borrow().iter().any(|c| c == command)
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, argv: &[&str]) -> Result<CommandOutput, CommandError> {
        let command = argv.join(" ");
        self.calls.borrow_mut().push(command.clone());
        let mut responses = self.responses.borrow_mut();
        if let Some(queue) = responses.get_mut(&command) {
            if !queue.is_empty() {
                return queue.remove(0);
            }
        }
        Ok(CommandOutput::default())
    }
}

/// Project directory with the files a run snapshots
fn project_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    fs::write(dir.path().join("composer.json"), "{}").unwrap();
    fs::write(dir.path().join("composer.lock"), "{\"packages\": []}").unwrap();
    dir
}

fn run(config: &Config, runner: &ScriptedRunner, dir: &TempDir) -> RunReport {
    UpdateOrchestrator::new(config, runner, dir.path())
        .with_progress(false)
        .run()
        .expect("run failed")
}

mod full_run {
    use super::*;

    /// A complete run: consolidation, checking, one committed update, and
    /// the report sections
    #[test]
    fn test_full_cycle_with_extension_update() {
        let dir = project_dir();
        fs::create_dir(dir.path().join("web")).unwrap();
        let config = Config::default();

        let runner = ScriptedRunner::new()
            // consolidation on @self: config drifted, gets committed
            .on_stdout("git status --porcelain config", " M config/system.site.yml\n")
            // checking: one outdated package, already direct
            .on_stdout("composer show --locked --outdated --name-only", "drupal/token\n")
            .on_stdout(
                "composer show --locked --direct --name-only",
                "drupal/core\ndrupal/token\n",
            )
            // update applies
            .on_stdout("git status --porcelain composer.lock", " M composer.lock\n")
            .on_stdout("composer show drupal/token", "type     : drupal-module\n")
            .on_stdout(
                "composer-lock-diff --json",
                r#"{"changes": {"drupal/token": ["1.13.0", "1.15.0"]}, "changes-dev": {}}"#,
            )
            .on_stdout("composer-lock-diff", "| drupal/token | 1.13.0 | 1.15.0 |")
            // configuration changed during post-processing
            .on_stdout("git status --porcelain config", " M config/token.settings.yml\n")
            // report sections
            .on_stdout(
                "composer-lock-diff --from composer.drupdater.lock --to composer.lock",
                "| drupal/token | 1.13.0 | 1.15.0 |",
            )
            .on_stdout("composer show --locked --outdated --direct", "")
            .on_stdout("composer show --locked --outdated", "")
            .on_stdout("composer audit --locked --format=plain", "");

        let report = run(&config, &runner, &dir);

        // Consolidation committed the drifted configuration.
        assert_eq!(report.consolidations.len(), 1);
        assert!(report.consolidations[0].changed);
        assert!(report.consolidations[0].committed);

        // The update was committed with the synthesized message.
        assert_eq!(report.results.len(), 1);
        assert!(report.results[0].is_updated());
        assert_eq!(
            report.results[0].commit_message.as_deref(),
            Some("UPDATE - drupal/token: package, configuration")
        );

        // Extension post-processing ran in full.
        assert!(runner.called("git add web"));
        assert!(runner.called("drush @self cr"));
        assert!(runner.called("drush @self updb -y"));
        assert!(runner.called("drush @self cex -y"));

        // Report carries the overall diff and pending sections.
        assert!(report.overall_diff.contains("drupal/token"));
        assert!(report.pending.is_some());
        assert_eq!(report.updated_count(), 1);
        assert!(!report.has_failures());
    }

    /// The snapshot bracket: created before updates, diffed for the
    /// report, removed afterwards
    #[test]
    fn test_lock_snapshot_lifecycle() {
        let dir = project_dir();
        let config = Config {
            consolidate_configuration: false,
            packages: vec!["drupal/token".to_string()],
            ..Config::default()
        };
        let runner = ScriptedRunner::new()
            .on_stdout("git status --porcelain composer.lock", "")
            .on_stdout(
                "composer show --locked --outdated --format=json",
                r#"{"locked": []}"#,
            );

        run(&config, &runner, &dir);

        assert!(runner.called(
            "composer-lock-diff --from composer.drupdater.lock --to composer.lock"
        ));
        assert!(!dir.path().join("composer.drupdater.lock").exists());
    }

    /// Environments are consolidated in configuration order
    #[test]
    fn test_multi_environment_consolidation_order() {
        let dir = project_dir();
        let config = Config {
            environments: vec!["@self".to_string(), "@stage".to_string()],
            packages: vec!["drupal/token".to_string()],
            ..Config::default()
        };
        let runner = ScriptedRunner::new()
            .on_stdout("git status --porcelain composer.lock", "")
            .on_stdout(
                "composer show --locked --outdated --format=json",
                r#"{"locked": []}"#,
            );

        let report = run(&config, &runner, &dir);

        let environments: Vec<&str> = report
            .consolidations
            .iter()
            .map(|c| c.environment.as_str())
            .collect();
        assert_eq!(environments, vec!["@self", "@stage"]);

        let calls = runner.calls();
        let self_export = calls.iter().position(|c| c == "drush @self cex -y").unwrap();
        let stage_rebuild = calls.iter().position(|c| c == "drush @stage cr").unwrap();
        assert!(self_export < stage_rebuild);
    }
}

mod failure_isolation {
    use super::*;

    /// One failing package rolls back and the rest of the plan proceeds
    #[test]
    fn test_failure_does_not_abort_the_plan() {
        let dir = project_dir();
        let config = Config {
            consolidate_configuration: false,
            packages: vec![
                "drupal/first".to_string(),
                "drupal/broken".to_string(),
                "drupal/last".to_string(),
            ],
            ..Config::default()
        };
        let runner = ScriptedRunner::new()
            // first: no-op
            .on_stdout("git status --porcelain composer.lock", "")
            .on_stdout(
                "composer show --locked --outdated --format=json",
                r#"{"locked": []}"#,
            )
            // second: update command fails
            .on_failure(
                "composer update drupal/broken --with-dependencies",
                2,
                "Could not resolve dependencies",
            )
            // third: no-op (snapshot already cached)
            .on_stdout("git status --porcelain composer.lock", "");

        let report = run(&config, &runner, &dir);

        assert_eq!(report.results.len(), 3);
        assert_eq!(report.results[0].outcome, UpdateOutcome::NoChangeAvailable);
        assert!(matches!(
            report.results[1].outcome,
            UpdateOutcome::Failed {
                stage: FailureStage::Update,
                ..
            }
        ));
        assert_eq!(report.results[2].outcome, UpdateOutcome::NoChangeAvailable);

        // Rollback restored manifest and lock for the broken package.
        assert!(runner.called("git checkout -- composer.json composer.lock"));
        assert!(runner.called("composer update drupal/last --with-dependencies"));
    }

    /// A consolidation failure is outside the per-package boundary and fatal
    #[test]
    fn test_consolidation_failure_is_fatal() {
        let dir = project_dir();
        let config = Config::default();
        let runner = ScriptedRunner::new().on_failure("drush @self cr", 1, "bootstrap failed");

        let result = UpdateOrchestrator::new(&config, &runner, dir.path())
            .with_progress(false)
            .run();

        assert!(result.is_err());
        // No package was touched.
        assert!(!runner
            .calls()
            .iter()
            .any(|c| c.starts_with("composer update")));
    }
}

mod resolution {
    use super::*;

    /// Transitive candidates resolve to direct ancestors; unresolvable
    /// ones are scheduled directly and noted as fallbacks
    #[test]
    fn test_resolution_coverage_over_mixed_candidates() {
        let dir = project_dir();
        let config = Config {
            consolidate_configuration: false,
            ..Config::default()
        };
        let runner = ScriptedRunner::new()
            .on_stdout(
                "composer show --locked --outdated --name-only",
                "drupal/core\nsymfony/console\nvendor/orphan\n",
            )
            .on_stdout(
                "composer show --locked --direct --name-only",
                "drupal/core\ndrush/drush\n",
            )
            // symfony/console: non-recursive query finds a direct dependent
            .on_stdout(
                "composer why symfony/console --locked",
                "drush/drush 12.4 requires symfony/console\n",
            )
            // vendor/orphan: neither query yields a direct ancestor
            .on_stdout("composer why vendor/orphan --locked", "")
            .on_stdout("timeout 2 composer why vendor/orphan --locked -r", "")
            // all three updates are no-ops
            .on_stdout("git status --porcelain composer.lock", "")
            .on_stdout("git status --porcelain composer.lock", "")
            .on_stdout("git status --porcelain composer.lock", "")
            .on_stdout(
                "composer show --locked --outdated --format=json",
                r#"{"locked": []}"#,
            );

        let report = run(&config, &runner, &dir);

        // Every candidate is covered, |plan| <= |candidates|.
        assert_eq!(
            report.plan.packages,
            vec!["drupal/core", "drush/drush", "vendor/orphan"]
        );
        assert_eq!(report.plan.fallbacks, vec!["vendor/orphan"]);
        assert!(report.plan.packages.len() <= 3);
    }

    /// The deep-dependency scenario: recursive query output resolves to
    /// the first entry that is direct
    #[test]
    fn test_recursive_resolution_first_match() {
        let dir = project_dir();
        let config = Config {
            consolidate_configuration: false,
            ..Config::default()
        };
        let runner = ScriptedRunner::new()
            .on_stdout(
                "composer show --locked --outdated --name-only",
                "vendor/deep-dep\n",
            )
            .on_stdout("composer show --locked --direct --name-only", "vendor/top\n")
            .on_stdout("composer why vendor/deep-dep --locked", "")
            .on_stdout(
                "timeout 2 composer why vendor/deep-dep --locked -r",
                "vendor/mid 1.0 requires vendor/deep-dep\n\
                 vendor/top 2.0 requires vendor/mid\n",
            )
            .on_stdout("git status --porcelain composer.lock", "")
            .on_stdout(
                "composer show --locked --outdated --format=json",
                r#"{"locked": []}"#,
            );

        let report = run(&config, &runner, &dir);

        assert_eq!(report.plan.packages, vec!["vendor/top"]);
        assert!(report.plan.fallbacks.is_empty());
    }
}

mod report_output {
    use super::*;
    use drupdater::output::{create_formatter, OutputConfig};

    /// The JSON formatter emits the whole report as one parseable document
    #[test]
    fn test_json_report_is_machine_readable() {
        let dir = project_dir();
        let config = Config {
            consolidate_configuration: false,
            packages: vec!["drupal/token".to_string()],
            ..Config::default()
        };
        let runner = ScriptedRunner::new()
            .on_stdout("git status --porcelain composer.lock", "")
            .on_stdout(
                "composer show --locked --outdated --format=json",
                r#"{"locked": []}"#,
            );

        let report = run(&config, &runner, &dir);

        let formatter = create_formatter(OutputConfig::from_cli(true, false, false));
        let mut buffer = Vec::new();
        formatter.format(&report, &mut buffer).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["results"][0]["package"], "drupal/token");
        assert_eq!(
            value["results"][0]["outcome"]["type"],
            "no_change_available"
        );
    }
}
