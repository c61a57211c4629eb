// ABOUTME: Handler for the import subcommand
// ABOUTME: Validates the target, then hands the staging directory to the scheduler

use crate::config::Config;
use crate::driver::DbSpec;
use crate::import::{self, RunReport};
use crate::process::{self, ShellInvoker};
use anyhow::{bail, Result};
use std::path::Path;

pub async fn import(
    config_path: &str,
    site_name: &str,
    from: &Path,
    concurrency: Option<i64>,
    yes: bool,
) -> Result<()> {
    let config = Config::load(config_path)?;
    let site = config.site(site_name)?;
    let spec = site.db_spec()?;

    confirm_overwrite(&spec, yes)?;
    process::check_client_tools(spec.driver)?;

    let concurrency = concurrency.unwrap_or(config.sync.concurrency);
    let invoker = ShellInvoker;
    let report = import::run(&invoker, &spec, from, concurrency).await?;

    finish(report, &spec)
}

pub fn confirm_overwrite(spec: &DbSpec, yes: bool) -> Result<()> {
    if !yes {
        bail!(
            "Importing will overwrite tables in database '{}'. Re-run with --yes to continue.",
            spec.database
        );
    }
    Ok(())
}

/// Log the aggregate outcome and turn a fatal failure into the run's error.
pub fn finish(report: RunReport, spec: &DbSpec) -> Result<()> {
    tracing::info!(
        "{} of {} table(s) imported into '{}'",
        report.success_count(),
        report.results.len(),
        spec.database
    );

    match report.fatal {
        None => {
            tracing::info!("✓ Import complete");
            Ok(())
        }
        Some(fatal) => Err(fatal.into()),
    }
}
