//! Coppee command line
//!
//! Copies files inside a directory according to the rule file found there.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use coppee::{Config, RuleSet, WalkOptions, Walker};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "coppee")]
#[command(version = coppee::VERSION, about = "Copy files inside a directory by regex rules")]
struct Cli {
    /// Target directory. Must contain an instruction file named '.coppee'
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Overwrite existing target files
    #[arg(short, long)]
    overwrite: bool,

    /// Quiet mode, disable per-file reports
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Pretend to copy, only print what would be copied
    #[arg(short, long)]
    pretend: bool,

    /// Keep going after a failed copy instead of stopping
    #[arg(short, long)]
    keep_going: bool,

    /// Read rules from FILE instead of the directory's rule file
    #[arg(short, long, value_name = "FILE")]
    rules: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Validate and list the rules without copying anything
    #[arg(long)]
    check: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => e.exit(),
            _ => {
                let message = e.to_string();
                let line = message.lines().next().unwrap_or_default();
                println!("argument error: {}", line.trim_start_matches("error: "));
                return ExitCode::from(2);
            }
        },
    };

    let Some(dir) = cli.dir.clone() else {
        return match Cli::command().print_help() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                println!("usage error: {e}");
                ExitCode::FAILURE
            }
        };
    };

    match run(&cli, &dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, dir: &Path) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).context("config error")?;
    let general = &config.general;
    let quiet = cli.quiet || general.quiet;

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        general.log_level.as_str()
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("COPPEE_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    anyhow::ensure!(
        dir.is_dir(),
        "path error: '{}' is not a valid directory.",
        dir.display()
    );

    let rule_file = cli
        .rules
        .clone()
        .unwrap_or_else(|| config.rule_file_in(dir));
    let rules = RuleSet::load(&rule_file).context("rule parse error")?;

    if cli.check {
        println!("Rules in {}:", rule_file.display());
        print!("{rules}");
        println!("✓ {} rules", rules.len());
        return Ok(());
    }

    // Flags only switch behaviors on relative to the config
    let defaults = general.walk_options();
    let options = WalkOptions {
        overwrite: defaults.overwrite || cli.overwrite,
        verbose: !quiet,
        pretend: defaults.pretend || cli.pretend,
        collapse_on_error: defaults.collapse_on_error && !cli.keep_going,
    };

    let summary = Walker::new(dir, &rules, options)
        .walk()
        .context("copy error")?;

    info!(
        "Done: {} files, {} copied, {} skipped, {} failed ({} bytes)",
        summary.files_visited,
        summary.copied,
        summary.skipped,
        summary.failed,
        summary.bytes_copied
    );

    if options.pretend {
        println!("*** PRETEND MODE. NO FILES WERE COPIED. ***");
    }

    Ok(())
}
