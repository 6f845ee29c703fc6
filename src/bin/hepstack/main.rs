//! hepstack CLI - recursive installer for HEP tool stacks

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hepstack::error::{InstallError, EXIT_USAGE};
use hepstack::util::fs as fsutil;

mod cli;
mod commands;

use cli::{Cli, Commands};

/// Lines of the install log surfaced on a build failure.
const LOG_TAIL_LINES: usize = 80;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Usage errors, `--help`, and a missing command share one code.
            let _ = e.print();
            std::process::exit(EXIT_USAGE);
        }
    };

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("hepstack=debug")
    } else {
        EnvFilter::new("hepstack=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let result = match cli.command {
        Commands::Install(args) => commands::install::execute(args),
        Commands::List(args) => commands::list::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    };

    if let Err(err) = result {
        report_failure(&err);
        std::process::exit(err.exit_code());
    }
}

/// Print the fatal condition and, where available, the install log tail.
fn report_failure(err: &InstallError) {
    eprintln!("error: {err}");

    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }

    if let Some(log) = err.log_path() {
        match fsutil::tail_lines(log, LOG_TAIL_LINES) {
            Some(tail) => {
                eprintln!("--- {} ---", log.display());
                eprintln!("{tail}");
            }
            None => {
                eprintln!("no additional information on the installation problem available");
            }
        }
    }
}
