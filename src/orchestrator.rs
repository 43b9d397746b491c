//! Update orchestrator driving the whole run
//!
//! This module provides:
//! - Run sequencing: lock snapshot → consolidation → checking → per-package
//!   updates → report data collection → cleanup
//! - The per-package transactional protocol with rollback on failure
//! - Failure isolation: one package failing never aborts the run
//!
//! The orchestrator owns the run-scoped context (the cached outdated
//! snapshot and the accumulated results) and discards it at run end;
//! nothing persists between invocations.

use crate::analyzer::LockDiffAnalyzer;
use crate::composer::Composer;
use crate::config::Config;
use crate::consolidate::{ConsolidationPhase, ConsolidationResult};
use crate::domain::{FailureStage, Package, UpdatePlan, UpdateResult};
use crate::drush::Drush;
use crate::error::{AppError, CommandError};
use crate::executor::CommandRunner;
use crate::git::Git;
use crate::progress::Progress;
use crate::project::{find_web_root, CONFIG_PATH, LOCK_FILE, LOCK_SNAPSHOT_FILE, MANIFEST_FILE};
use crate::resolver::PackageResolver;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Composer phrases that identify a constraint-conflict in update output
const CONSTRAINT_CONFLICT_PHRASES: [&str; 2] = [
    "but it conflicts with your root composer.json require",
    "Your requirements could not be resolved to an installable set of packages.",
];

/// Outstanding updates shown at the end of a full run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PendingUpdates {
    /// Not-updated direct packages listing, absent in securities-only mode
    pub direct: Option<String>,
    /// Not-updated listing across all packages, absent in securities-only mode
    pub all: Option<String>,
    /// Packages with outstanding security advisories
    pub securities: Vec<String>,
}

/// Everything one run produced, consumed by the output formatters
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// When the report was assembled
    pub generated_at: DateTime<Utc>,
    /// Per-environment consolidation results (empty when the phase was skipped)
    pub consolidations: Vec<ConsolidationResult>,
    /// The plan that was executed
    pub plan: UpdatePlan,
    /// One result per planned package, in plan order
    pub results: Vec<UpdateResult>,
    /// Whole-run lock diff table, from the pre-run snapshot
    pub overall_diff: String,
    /// Outstanding updates, absent when an explicit package list was given
    pub pending: Option<PendingUpdates>,
}

impl RunReport {
    /// Number of committed updates
    pub fn updated_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_updated()).count()
    }

    /// Number of rolled-back failures
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_failed()).count()
    }

    /// Number of constraint-blocked packages
    pub fn blocked_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_blocked()).count()
    }

    /// True when any package failed and was rolled back
    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }
}

/// Run-scoped mutable state, owned by the orchestrator for one run
struct RunContext {
    /// Outdated snapshot, fetched at most once per run
    outdated: Option<Vec<Package>>,
}

impl RunContext {
    fn new() -> Self {
        Self { outdated: None }
    }

    /// The snapshot entry proving a newer version exists for the package
    fn available_update(
        &mut self,
        composer: &Composer,
        package: &str,
    ) -> Result<Option<Package>, AppError> {
        if self.outdated.is_none() {
            self.outdated = Some(composer.outdated_packages()?);
        }
        let snapshot = self.outdated.get_or_insert_with(Vec::new);
        Ok(snapshot
            .iter()
            .find(|p| p.name == package && p.has_update())
            .cloned())
    }
}

/// Orchestrator for one update run over a project tree
pub struct UpdateOrchestrator<'a> {
    config: &'a Config,
    runner: &'a dyn CommandRunner,
    project_root: &'a Path,
    show_progress: bool,
}

impl<'a> UpdateOrchestrator<'a> {
    /// Create an orchestrator for the given project
    pub fn new(config: &'a Config, runner: &'a dyn CommandRunner, project_root: &'a Path) -> Self {
        Self {
            config,
            runner,
            project_root,
            show_progress: true,
        }
    }

    /// Enable or disable live progress display
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Run the whole update cycle and assemble the report.
    ///
    /// The lock snapshot is removed again even when the run fails midway.
    pub fn run(&self) -> Result<RunReport, AppError> {
        self.snapshot_lock()?;
        let report = self.run_phases();
        self.remove_snapshot();
        report
    }

    fn run_phases(&self) -> Result<RunReport, AppError> {
        let composer =
            Composer::new(self.runner, self.config.no_dev).with_why_timeout(self.config.why_timeout);
        let git = Git::new(self.runner, &self.config.author);
        let drush = Drush::new(self.runner);
        let mut progress = Progress::new(self.show_progress);
        let mut ctx = RunContext::new();

        let consolidations = if self.config.consolidate_configuration {
            progress.phase("1. Consolidating configuration");
            ConsolidationPhase::new(&git, &drush, &self.config.environments).run()?
        } else {
            Vec::new()
        };

        progress.phase("2. Checking packages");
        let plan = self.build_plan(&composer)?;

        progress.phase("3. Updating packages");
        let mut results = Vec::with_capacity(plan.len());
        for package in plan.iter() {
            progress.spinner(&format!("Updating {}", package));
            let result = self.update_package(&mut ctx, &composer, &git, &drush, package)?;
            results.push(result);
        }
        progress.finish_and_clear();

        progress.phase("4. Report");
        let overall_diff = composer.lock_diff_between(LOCK_SNAPSHOT_FILE, LOCK_FILE)?;
        let pending = if self.config.has_explicit_packages() {
            None
        } else {
            Some(self.collect_pending(&composer)?)
        };
        progress.finish_and_clear();

        Ok(RunReport {
            generated_at: Utc::now(),
            consolidations,
            plan,
            results,
            overall_diff,
            pending,
        })
    }

    /// Build the worklist: the explicit list verbatim, or check + resolve
    fn build_plan(&self, composer: &Composer) -> Result<UpdatePlan, AppError> {
        if self.config.has_explicit_packages() {
            return Ok(UpdatePlan::from_packages(self.config.packages.clone()));
        }

        let candidates = if self.config.only_securities {
            composer.audit_names()?
        } else {
            composer.outdated_names()?
        };
        if candidates.is_empty() {
            return Ok(UpdatePlan::new());
        }

        let direct = composer.direct_names()?;
        let plan = PackageResolver::new(composer).resolve(&candidates, &direct)?;
        Ok(plan)
    }

    /// Run the transactional protocol for one package.
    ///
    /// Command failures from the update attempt and the extension
    /// post-processing are caught here, rolled back, and reported as
    /// outcomes; everything else propagates and aborts the run.
    fn update_package(
        &self,
        ctx: &mut RunContext,
        composer: &Composer,
        git: &Git,
        drush: &Drush,
        package: &str,
    ) -> Result<UpdateResult, AppError> {
        let update_output = match composer.update(package) {
            Ok(output) => output,
            Err(err @ CommandError::Failed { .. }) => {
                git.checkout(&[MANIFEST_FILE, LOCK_FILE])?;
                return Ok(UpdateResult::failed(
                    package,
                    FailureStage::Update,
                    err.to_string(),
                ));
            }
            Err(err) => return Err(err.into()),
        };

        if !git.has_changes(LOCK_FILE)? {
            if let Some(available) = ctx.available_update(composer, package)? {
                if let Some(latest) = available.latest {
                    let output = update_output.combined();
                    if CONSTRAINT_CONFLICT_PHRASES
                        .iter()
                        .any(|phrase| output.contains(phrase))
                    {
                        return Ok(UpdateResult::blocked(package, latest));
                    }
                }
            }
            return Ok(UpdateResult::no_change(package));
        }

        git.add(&[MANIFEST_FILE, LOCK_FILE])?;

        if composer.is_drupal_extension(package)? {
            if let Err(err) = self.postprocess_extension(git, drush) {
                return match err {
                    AppError::Command(cmd_err @ CommandError::Failed { .. }) => {
                        // Partial staged configuration stays staged; the
                        // lock rollback makes the tree consistent with
                        // "no update applied".
                        git.checkout(&[MANIFEST_FILE, LOCK_FILE])?;
                        Ok(UpdateResult::failed(
                            package,
                            FailureStage::Postprocess,
                            cmd_err.to_string(),
                        ))
                    }
                    other => Err(other),
                };
            }
        }

        let lock_diff = composer.lock_diff()?;
        let diff_text = composer.lock_diff_text()?;
        let configuration_changed = git.has_changes(CONFIG_PATH)?;

        let subject = LockDiffAnalyzer::commit_subject(package, &lock_diff, configuration_changed);
        let body = if diff_text.is_empty() {
            None
        } else {
            Some(diff_text.as_str())
        };
        git.commit(&subject, body)?;

        Ok(UpdateResult::updated(package, lock_diff, subject))
    }

    /// Extension post-update steps: stage the web root, rebuild caches,
    /// apply database updates, re-export configuration, stage it
    fn postprocess_extension(&self, git: &Git, drush: &Drush) -> Result<(), AppError> {
        if let Some(web_root) = find_web_root(self.project_root) {
            git.add(&[web_root])?;
        }
        for environment in &self.config.environments {
            drush.cache_rebuild(environment)?;
        }
        for environment in &self.config.environments {
            drush.update_database(environment)?;
        }
        for environment in &self.config.environments {
            drush.config_export(environment)?;
        }
        git.add(&[CONFIG_PATH])?;
        Ok(())
    }

    /// Gather the outstanding-updates sections for the full report
    fn collect_pending(&self, composer: &Composer) -> Result<PendingUpdates, AppError> {
        if self.config.only_securities {
            return Ok(PendingUpdates {
                direct: None,
                all: None,
                securities: composer.audit_names()?,
            });
        }
        Ok(PendingUpdates {
            direct: Some(composer.outdated_direct_text()?),
            all: Some(composer.outdated_text()?),
            securities: composer.audit_names()?,
        })
    }

    fn snapshot_path(&self) -> PathBuf {
        self.project_root.join(LOCK_SNAPSHOT_FILE)
    }

    /// Copy the lock file aside so the report can diff the whole run
    fn snapshot_lock(&self) -> Result<(), AppError> {
        let lock = self.project_root.join(LOCK_FILE);
        std::fs::copy(&lock, self.snapshot_path())
            .map_err(|e| AppError::io(lock, e))?;
        Ok(())
    }

    /// Best-effort cleanup of the run-scoped snapshot
    fn remove_snapshot(&self) {
        let _ = std::fs::remove_file(self.snapshot_path());
    }
}
