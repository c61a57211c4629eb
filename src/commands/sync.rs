// ABOUTME: Handler for the sync subcommand
// ABOUTME: Dumps the source site, transfers the files, and imports into the target

use crate::config::Config;
use crate::driver::DbSpec;
use crate::dump;
use crate::import;
use crate::process::{self, ShellInvoker};
use crate::staging;
use crate::transfer;
use anyhow::{bail, Result};
use std::path::PathBuf;

use super::import::{confirm_overwrite, finish};

pub async fn sync(
    config_path: &str,
    source_name: &str,
    target_name: &str,
    concurrency: Option<i64>,
    yes: bool,
) -> Result<()> {
    let config = Config::load(config_path)?;
    let source = config.site(source_name)?;
    let target = config.site(target_name)?;
    let source_spec = source.db_spec()?;
    let target_spec = target.db_spec()?;

    validate_source_target_different(&source_spec, &target_spec)?;
    confirm_overwrite(&target_spec, yes)?;
    process::check_client_tools(target_spec.driver)?;
    if source_spec.remote_host.is_none() {
        process::check_client_tools(source_spec.driver)?;
    }

    let invoker = ShellInvoker;

    let user_dir = source.staging_dir.clone().map(PathBuf::from);
    let staging_dir = staging::resolve(&invoker, &source_spec, user_dir.as_deref()).await;

    tracing::info!("Syncing '{}' -> '{}'", source_name, target_name);
    dump::run_site(&invoker, source, &source_spec, &staging_dir).await?;

    // A remote dump lands on the remote machine; pull it down before
    // importing. The landing directory reuses the same base name so both
    // sides of the sync agree on the layout.
    let import_dir = match &source_spec.remote_host {
        Some(host) => {
            let local_dir = std::env::temp_dir()
                .join("syncdb")
                .join(staging::staging_base_name(&source_spec));
            transfer::pull_staging(&invoker, host, &staging_dir, &local_dir).await?;
            local_dir
        }
        None => staging_dir,
    };

    let concurrency = concurrency.unwrap_or(config.sync.concurrency);
    let report = import::run(&invoker, &target_spec, &import_dir, concurrency).await?;

    finish(report, &target_spec)?;
    tracing::info!("✓ Sync complete: '{}' -> '{}'", source_name, target_name);
    Ok(())
}

/// Refuse to sync a database onto itself; the import would overwrite the
/// tables the dump just came from.
fn validate_source_target_different(source: &DbSpec, target: &DbSpec) -> Result<()> {
    if source.host.eq_ignore_ascii_case(&target.host)
        && source.port == target.port
        && source.database == target.database
        && source.remote_host == target.remote_host
    {
        bail!(
            "Source and target point to the same database ({}:{}/{}).\n\
             Syncing a database onto itself would overwrite the data just dumped.",
            source.host,
            source.port,
            source.database
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Driver;

    fn spec(host: &str, port: u16, database: &str) -> DbSpec {
        DbSpec {
            driver: Driver::Mysql,
            database: database.to_string(),
            user: None,
            password: None,
            host: host.to_string(),
            port,
            remote_host: None,
        }
    }

    #[test]
    fn same_database_is_rejected() {
        let err = validate_source_target_different(
            &spec("db.internal", 3306, "app"),
            &spec("DB.INTERNAL", 3306, "app"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("same database"));
    }

    #[test]
    fn different_database_on_same_host_is_allowed() {
        assert!(validate_source_target_different(
            &spec("db.internal", 3306, "app"),
            &spec("db.internal", 3306, "app_dev"),
        )
        .is_ok());
    }

    #[test]
    fn same_database_name_on_different_hosts_is_allowed() {
        assert!(validate_source_target_different(
            &spec("prod.internal", 3306, "app"),
            &spec("localhost", 3306, "app"),
        )
        .is_ok());
    }

    #[test]
    fn remote_wrapping_distinguishes_otherwise_equal_specs() {
        let mut source = spec("localhost", 3306, "app");
        source.remote_host = Some("deploy@prod".to_string());
        let target = spec("localhost", 3306, "app");
        assert!(validate_source_target_different(&source, &target).is_ok());
    }
}
