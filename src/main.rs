use anyhow::Context;
use clap::Parser;
use dirsorter::cli::{self, Cli, DEBUG_ENV_VAR, SortOptions};
use dirsorter::config::SorterConfig;
use dirsorter::output::OutputFormatter;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    match sort(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            OutputFormatter::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when the run finished but some files could not be moved.
fn sort(args: &Cli) -> anyhow::Result<bool> {
    let config = SorterConfig::load(args.config.as_deref())?;
    let cwd = std::env::current_dir().context("cannot determine the current directory")?;
    let debug_env = std::env::var(DEBUG_ENV_VAR).ok();
    let options = SortOptions::resolve(args, &config, debug_env.as_deref(), &cwd)?;

    if options.dry_run {
        OutputFormatter::dry_run_notice(&format!("Analyzing {}", options.root.display()));
    } else {
        OutputFormatter::info(&format!("Sorting {}", options.root.display()));
    }

    let summary = cli::run(&options)?;
    cli::print_summary(&options, &summary);

    Ok(summary.failure_count() == 0)
}
