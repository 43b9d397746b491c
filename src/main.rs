//! drupdater - Automated Drupal composer package updater CLI tool
//!
//! Establishes a clean configuration baseline, determines which composer
//! packages need updating, updates them one at a time with rollback on
//! failure, and reports the outcome. One commit per consolidated
//! environment and per updated package.

use clap::Parser;
use drupdater::cli::CliArgs;
use drupdater::config::Config;
use drupdater::executor::ShellRunner;
use drupdater::orchestrator::UpdateOrchestrator;
use drupdater::output::{create_formatter, OutputConfig};
use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    match run(args) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    // Resolve configuration: file first, CLI overrides on top
    let mut config = Config::load(&args.config)?;
    config.apply_cli(&args);

    if args.verbose {
        eprintln!("drupdater v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Project: {}", args.path.display());
        if args.config.exists() {
            eprintln!("Configuration file: {}", args.config.display());
        } else {
            eprintln!(
                "No configuration file at {}, using defaults and command line options",
                args.config.display()
            );
        }
        eprintln!("Environments: {}", config.environments.join(", "));
        eprintln!("Commits will be authored as: {}", config.author);
        if config.only_securities {
            eprintln!("Only security updates will be done");
        }
        if config.no_dev {
            eprintln!("Dev packages won't be updated");
        }
    }

    let runner = ShellRunner::new(&args.path).with_echo(args.verbose);
    let orchestrator =
        UpdateOrchestrator::new(&config, &runner, &args.path).with_progress(!args.quiet);
    let report = orchestrator.run()?;

    let output_config = OutputConfig::from_cli(args.json, args.verbose, args.quiet);
    let formatter = create_formatter(output_config);

    let mut stdout = io::stdout().lock();
    formatter.format(&report, &mut stdout)?;
    stdout.flush()?;

    // Per-package failures were rolled back and reported; they do not
    // fail the run. Only fatal errors above yield a failure exit.
    Ok(ExitCode::SUCCESS)
}
