//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Per-package outcome display with colors
//! - Semantic version change type indication (major/minor/patch)
//! - Consolidation, lock-diff, and pending-update sections
//! - Resolver fallback notes

use crate::domain::{UpdateOutcome, UpdateResult};
use crate::orchestrator::RunReport;
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Semantic version change type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionChangeType {
    /// Major version change (breaking)
    Major,
    /// Minor version change (features)
    Minor,
    /// Patch version change (fixes)
    Patch,
    /// Unknown or unparseable
    Unknown,
}

impl VersionChangeType {
    /// Determine the change type between two versions.
    ///
    /// Composer versions are not always clean semver (Drupal contrib uses
    /// forms like `8.x-1.5`), so anything unparseable stays Unknown rather
    /// than guessing.
    pub fn from_versions(old: &str, new: &str) -> Self {
        let parse = |v: &str| -> Option<(u64, u64, u64)> {
            let v = v.strip_prefix('v').unwrap_or(v);
            let parts: Vec<&str> = v.split(['.', '-']).collect();
            if parts.len() >= 3 {
                Some((
                    parts[0].parse().ok()?,
                    parts[1].parse().ok()?,
                    parts[2].parse().ok()?,
                ))
            } else if parts.len() == 2 {
                Some((parts[0].parse().ok()?, parts[1].parse().ok()?, 0))
            } else if parts.len() == 1 {
                Some((parts[0].parse().ok()?, 0, 0))
            } else {
                None
            }
        };

        match (parse(old), parse(new)) {
            (Some((old_major, old_minor, _)), Some((new_major, new_minor, _))) => {
                if new_major != old_major {
                    VersionChangeType::Major
                } else if new_minor != old_minor {
                    VersionChangeType::Minor
                } else {
                    VersionChangeType::Patch
                }
            }
            _ => VersionChangeType::Unknown,
        }
    }

    /// Get the display label with color
    pub fn colored_label(&self) -> String {
        match self {
            VersionChangeType::Major => "major".red().bold().to_string(),
            VersionChangeType::Minor => "minor".yellow().to_string(),
            VersionChangeType::Patch => "patch".green().to_string(),
            VersionChangeType::Unknown => "?".dimmed().to_string(),
        }
    }
}

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    fn header(&self, text: &str) -> String {
        format!("// {} //", text.to_uppercase()).cyan().bold().to_string()
    }

    fn outcome_line(&self, result: &UpdateResult) -> String {
        match &result.outcome {
            UpdateOutcome::Updated => {
                format!("{} {}", "✓".green(), result.package.bold())
            }
            UpdateOutcome::NoChangeAvailable => {
                format!("{} {} (no update available)", "∙".dimmed(), result.package)
            }
            UpdateOutcome::BlockedByConstraints { latest } => format!(
                "{} {} (blocked by composer.json constraints, latest: {})",
                "▲".yellow(),
                result.package,
                latest
            ),
            UpdateOutcome::Failed { stage, message } => format!(
                "{} {} ({} failed, rolled back: {})",
                "✗".red(),
                result.package.bold(),
                stage,
                message
            ),
        }
    }

    fn write_result(&self, result: &UpdateResult, writer: &mut dyn Write) -> std::io::Result<()> {
        writeln!(writer, "{}", self.outcome_line(result))?;

        if result.is_updated() {
            for (name, change) in result
                .lock_diff
                .changes
                .iter()
                .chain(result.lock_diff.changes_dev.iter())
            {
                let change_type = VersionChangeType::from_versions(&change.from, &change.to);
                writeln!(
                    writer,
                    "    {} {} → {} [{}]",
                    name,
                    change.from,
                    change.to.bold(),
                    change_type.colored_label()
                )?;
            }
            if let Some(message) = &result.commit_message {
                writeln!(writer, "    committed: {}", message.dimmed())?;
            }
        }
        Ok(())
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.verbosity == Verbosity::Quiet {
            // Quiet mode still surfaces failures; nothing else.
            for result in report.results.iter().filter(|r| r.is_failed()) {
                writeln!(writer, "{}", self.outcome_line(result))?;
            }
            return Ok(());
        }

        if !report.consolidations.is_empty() {
            writeln!(writer, "{}", self.header("Consolidation"))?;
            for consolidation in &report.consolidations {
                let state = if consolidation.committed {
                    "configuration committed".green().to_string()
                } else {
                    "clean".dimmed().to_string()
                };
                writeln!(writer, "  {}: {}", consolidation.environment, state)?;
            }
            writeln!(writer)?;
        }

        writeln!(writer, "{}", self.header("Updates"))?;
        if report.results.is_empty() {
            writeln!(writer, "No packages to update.")?;
        }
        for result in &report.results {
            self.write_result(result, writer)?;
        }
        for fallback in &report.plan.fallbacks {
            writeln!(
                writer,
                "{}",
                format!(
                    "note: no direct ancestor found for {}, updated directly",
                    fallback
                )
                .yellow()
            )?;
        }
        writeln!(writer)?;

        if !report.overall_diff.is_empty() {
            writeln!(writer, "{}", self.header("Updated packages"))?;
            writeln!(writer, "{}", report.overall_diff)?;
            writeln!(writer)?;
        } else {
            writeln!(writer, "No packages have been updated.")?;
            writeln!(writer)?;
        }

        if let Some(pending) = &report.pending {
            if let Some(direct) = pending.direct.as_deref().filter(|s| !s.is_empty()) {
                writeln!(writer, "{}", self.header("Not updated packages (direct)"))?;
                writeln!(writer, "{}", direct)?;
                writeln!(writer)?;
            }
            if let Some(all) = pending.all.as_deref().filter(|s| !s.is_empty()) {
                writeln!(writer, "{}", self.header("Not updated packages (all)"))?;
                writeln!(writer, "{}", all)?;
                writeln!(writer)?;
            }
            if !pending.securities.is_empty() {
                writeln!(writer, "{}", self.header("Not updated securities"))?;
                for package in &pending.securities {
                    writeln!(writer, "  {}", package)?;
                }
                writeln!(writer)?;
            }
        }

        writeln!(
            writer,
            "{} updated, {} blocked, {} failed",
            report.updated_count().to_string().green().bold(),
            report.blocked_count().to_string().yellow(),
            report.failed_count().to_string().red()
        )?;

        if self.verbosity == Verbosity::Verbose {
            writeln!(writer, "report generated at {}", report.generated_at)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FailureStage, LockDiff, UpdatePlan, VersionChange};
    use chrono::Utc;

    fn sample_report() -> RunReport {
        let mut diff = LockDiff::new();
        diff.changes
            .insert("drupal/token".to_string(), VersionChange::new("1.13.0", "1.15.0"));
        RunReport {
            generated_at: Utc::now(),
            consolidations: Vec::new(),
            plan: UpdatePlan::from_packages([
                "drupal/token".to_string(),
                "drupal/bad".to_string(),
            ]),
            results: vec![
                UpdateResult::updated("drupal/token", diff, "UPDATE - drupal/token: package"),
                UpdateResult::failed("drupal/bad", FailureStage::Update, "exit 2"),
            ],
            overall_diff: "| drupal/token | 1.13.0 | 1.15.0 |".to_string(),
            pending: None,
        }
    }

    fn render(report: &RunReport, verbosity: Verbosity) -> String {
        colored::control::set_override(false);
        let formatter = TextFormatter::new(verbosity);
        let mut buffer = Vec::new();
        formatter.format(report, &mut buffer).unwrap();
        colored::control::unset_override();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_version_change_type() {
        assert_eq!(
            VersionChangeType::from_versions("1.2.3", "2.0.0"),
            VersionChangeType::Major
        );
        assert_eq!(
            VersionChangeType::from_versions("1.2.3", "1.3.0"),
            VersionChangeType::Minor
        );
        assert_eq!(
            VersionChangeType::from_versions("1.2.3", "1.2.4"),
            VersionChangeType::Patch
        );
        assert_eq!(
            VersionChangeType::from_versions("8.x-1.5", "8.x-2.0"),
            VersionChangeType::Unknown
        );
    }

    #[test]
    fn test_version_change_type_v_prefix() {
        assert_eq!(
            VersionChangeType::from_versions("v6.4.0", "v6.4.2"),
            VersionChangeType::Patch
        );
    }

    #[test]
    fn test_format_shows_results_and_totals() {
        let output = render(&sample_report(), Verbosity::Normal);
        assert!(output.contains("drupal/token"));
        assert!(output.contains("1.13.0 → 1.15.0"));
        assert!(output.contains("UPDATE - drupal/token: package"));
        assert!(output.contains("rolled back"));
        assert!(output.contains("1 updated, 0 blocked, 1 failed"));
    }

    #[test]
    fn test_quiet_mode_shows_only_failures() {
        let output = render(&sample_report(), Verbosity::Quiet);
        assert!(output.contains("drupal/bad"));
        assert!(!output.contains("UPDATE - drupal/token"));
    }

    #[test]
    fn test_empty_run() {
        let report = RunReport {
            generated_at: Utc::now(),
            consolidations: Vec::new(),
            plan: UpdatePlan::new(),
            results: Vec::new(),
            overall_diff: String::new(),
            pending: None,
        };
        let output = render(&report, Verbosity::Normal);
        assert!(output.contains("No packages to update."));
        assert!(output.contains("No packages have been updated."));
    }

    #[test]
    fn test_fallback_note_rendered() {
        let mut report = sample_report();
        report.plan.record_fallback("vendor/orphan".to_string());
        let output = render(&report, Verbosity::Normal);
        assert!(output.contains("no direct ancestor found for vendor/orphan"));
    }
}
