// ABOUTME: Handlers for the tables and staging-path subcommands
// ABOUTME: Read-only inspection of what a dump run would do for a site

use crate::config::Config;
use crate::process::ShellInvoker;
use crate::staging;
use crate::tables::{self, TableSelection};
use anyhow::Result;
use std::path::PathBuf;

/// Print the classified table selection for a site.
pub async fn tables(config_path: &str, site_name: &str) -> Result<()> {
    let config = Config::load(config_path)?;
    let site = config.site(site_name)?;
    let spec = site.db_spec()?;

    let invoker = ShellInvoker;
    let all_tables = tables::list_tables(&invoker, &spec).await?;
    let selection = TableSelection::classify(
        &all_tables,
        site.data_tables.as_deref(),
        &site.structure_tables,
        &site.skip_tables,
    );

    print_section("Data tables", &selection.data);
    print_section("Structure-only tables", &selection.structure);
    print_section("Skipped tables", &selection.skip);
    Ok(())
}

fn print_section(title: &str, tables: &[String]) {
    println!("{} ({}):", title, tables.len());
    for table in tables {
        println!("  {}", table);
    }
}

/// Print the staging directory a dump of this site would use.
pub async fn staging_path(config_path: &str, site_name: &str) -> Result<()> {
    let config = Config::load(config_path)?;
    let site = config.site(site_name)?;
    let spec = site.db_spec()?;

    let invoker = ShellInvoker;
    let user_dir = site.staging_dir.clone().map(PathBuf::from);
    let path = staging::resolve(&invoker, &spec, user_dir.as_deref()).await;

    println!("{}", path.display());
    Ok(())
}
