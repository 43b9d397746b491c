//! External command execution
//!
//! This module provides:
//! - The CommandRunner trait, the seam every external tool adapter goes through
//! - ShellRunner, the real implementation backed by std::process
//! - Captured output with stdout/stderr separation
//!
//! Commands are argv vectors, never shell strings; all text parsing of tool
//! output happens in the adapters, not here.

use crate::error::CommandError;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Captured output of a successfully exited command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output from the command
    pub stdout: String,
    /// Standard error from the command
    pub stderr: String,
}

impl CommandOutput {
    /// Creates output from stdout text only
    pub fn from_stdout(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Both streams joined, for scanning diagnostics that may land on either
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Trait for running external commands
///
/// A non-zero exit status is an error carrying the exit code and both output
/// streams; callers that tolerate specific failures inspect the error.
pub trait CommandRunner {
    /// Run the command and capture its output
    fn run(&self, argv: &[&str]) -> Result<CommandOutput, CommandError>;
}

/// Command runner that executes real processes in a working directory
#[derive(Debug)]
pub struct ShellRunner {
    /// Directory every command runs in
    working_dir: PathBuf,
    /// Echo each command to stderr before running it
    echo: bool,
}

impl ShellRunner {
    /// Create a runner rooted at the given project directory
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            echo: false,
        }
    }

    /// Enable or disable command echoing (verbose mode)
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// The directory commands run in
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, argv: &[&str]) -> Result<CommandOutput, CommandError> {
        let command_str = argv.join(" ");

        let Some((program, args)) = argv.split_first() else {
            return Err(CommandError::Spawn {
                command: command_str,
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            });
        };

        if self.echo {
            eprintln!("$ {}", command_str);
        }

        let output = Command::new(program)
            .args(args)
            .current_dir(&self.working_dir)
            .output()
            .map_err(|e| CommandError::Spawn {
                command: command_str.clone(),
                source: e,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if output.status.success() {
            Ok(CommandOutput { stdout, stderr })
        } else {
            Err(CommandError::Failed {
                command: command_str,
                code: output.status.code(),
                stdout,
                stderr,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_output_combined() {
        let out = CommandOutput {
            stdout: "updated".to_string(),
            stderr: "warning".to_string(),
        };
        assert_eq!(out.combined(), "updated\nwarning");

        let stdout_only = CommandOutput::from_stdout("done");
        assert_eq!(stdout_only.combined(), "done");
    }

    #[test]
    fn test_shell_runner_success() {
        let runner = ShellRunner::new(".");
        let output = runner.run(&["echo", "hello"]).unwrap();
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[test]
    fn test_shell_runner_nonzero_exit() {
        let runner = ShellRunner::new(".");
        let err = runner.run(&["false"]).unwrap_err();
        match err {
            CommandError::Failed { command, code, .. } => {
                assert_eq!(command, "false");
                assert_eq!(code, Some(1));
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_shell_runner_missing_program() {
        let runner = ShellRunner::new(".");
        let err = runner
            .run(&["drupdater-no-such-program-here"])
            .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }

    #[test]
    fn test_shell_runner_empty_command() {
        let runner = ShellRunner::new(".");
        let err = runner.run(&[]).unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }

    #[test]
    fn test_shell_runner_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ShellRunner::new(dir.path());
        let output = runner.run(&["pwd"]).unwrap();
        // Canonicalize both sides since temp dirs may sit behind symlinks.
        let reported = std::fs::canonicalize(output.stdout.trim()).unwrap();
        let expected = std::fs::canonicalize(dir.path()).unwrap();
        assert_eq!(reported, expected);
    }
}
