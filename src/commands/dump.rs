// ABOUTME: Handler for the dump subcommand
// ABOUTME: Resolves the site and staging path, then drives the dump director

use crate::config::Config;
use crate::dump;
use crate::process::{self, ShellInvoker};
use crate::staging;
use anyhow::Result;
use std::path::PathBuf;

pub async fn dump(config_path: &str, site_name: &str, staging_override: Option<String>) -> Result<()> {
    let config = Config::load(config_path)?;
    let site = config.site(site_name)?;
    let spec = site.db_spec()?;

    // Local dumps need the client tools here; remote dumps need them on the
    // remote machine and fail there with the command's own error.
    if spec.remote_host.is_none() {
        process::check_client_tools(spec.driver)?;
    }

    let invoker = ShellInvoker;
    let user_dir = staging_override
        .or_else(|| site.staging_dir.clone())
        .map(PathBuf::from);
    let staging_dir = staging::resolve(&invoker, &spec, user_dir.as_deref()).await;

    let files = dump::run_site(&invoker, site, &spec, &staging_dir).await?;

    tracing::info!(
        "✓ Dumped {} file(s) for site '{}' to {}",
        files.len(),
        site_name,
        staging_dir.display()
    );
    Ok(())
}
