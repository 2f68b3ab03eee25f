use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use site_rehost::{MigrationConfig, SiteMigrator};
use tracing::error;

/// Exit code when the run finished but at least one step failed.
const EXIT_STEP_FAILED: u8 = 3;

#[derive(Parser, Debug)]
#[command(name = "site-rehost")]
#[command(version, about = "Rehost an exported Gamma site under /sites/<name>/", long_about = None)]
struct Args {
  /// Site directory to migrate in place
  site: PathBuf,

  /// Name used in /sites/<name>/ (defaults to the site directory name)
  #[arg(long)]
  site_name: Option<String>,

  /// JSON file overriding layout defaults
  #[arg(long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Report what would change without renaming or writing files
  #[arg(long)]
  dry_run: bool,

  /// Print the migration report as JSON on stdout
  #[arg(long)]
  json: bool,

  /// Enable debug logging
  #[arg(short, long)]
  verbose: bool,
}

fn main() -> ExitCode {
  let args = Args::parse();

  let default_level = if args.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
    )
    .with_writer(std::io::stderr)
    .init();

  match run(&args) {
    Ok(true) => ExitCode::SUCCESS,
    Ok(false) => ExitCode::from(EXIT_STEP_FAILED),
    Err(err) => {
      error!("{err:#}");
      ExitCode::FAILURE
    }
  }
}

/// Returns `Ok(false)` when the migration ran but some step failed.
fn run(args: &Args) -> Result<bool> {
  let config = match &args.config {
    Some(path) => MigrationConfig::from_path(path)?,
    None => MigrationConfig::default(),
  };

  let report = SiteMigrator::for_site(config, &args.site, args.site_name.as_deref())?
    .dry_run(args.dry_run)
    .run();

  if args.json {
    let json = serde_json::to_string_pretty(&report).context("failed to serialise report")?;
    println!("{json}");
  }

  Ok(!report.has_failures())
}
