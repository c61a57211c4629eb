// ABOUTME: Dump orchestration for a full per-table export
// ABOUTME: Exports structure first, then one data file per table, failing fast

use crate::config::SiteConfig;
use crate::driver::{self, DbSpec};
use crate::error::SyncError;
use crate::process::{wrap_remote, ProcessInvoker};
use crate::staging;
use crate::tables::{self, TableSelection};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Name of the aggregated schema-only file inside the staging directory.
pub const STRUCTURE_FILE: &str = "structure.sql";

/// Dump a site: discover its tables, classify them, and run the export.
pub async fn run_site<I: ProcessInvoker>(
    invoker: &I,
    site: &SiteConfig,
    spec: &DbSpec,
    staging_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let all_tables = tables::list_tables(invoker, spec).await?;
    let selection = TableSelection::classify(
        &all_tables,
        site.data_tables.as_deref(),
        &site.structure_tables,
        &site.skip_tables,
    );

    if !selection.skip.is_empty() {
        tracing::info!("Skipping {} table(s)", selection.skip.len());
    }

    run_dump(invoker, spec, &selection, staging_dir).await
}

/// Run the export for an already-classified selection.
///
/// The phase is strictly sequential and fail-fast: the structure dump must
/// succeed before any table dump starts, and the first failed table halts
/// the remaining loop. Returns the produced file paths in dump order.
pub async fn run_dump<I: ProcessInvoker>(
    invoker: &I,
    spec: &DbSpec,
    selection: &TableSelection,
    staging_dir: &Path,
) -> Result<Vec<PathBuf>> {
    staging::prepare_staging_dir(invoker, spec, staging_dir).await?;

    let mut produced = Vec::new();

    if selection.is_empty() {
        tracing::info!("No tables to dump for database '{}'", spec.database);
        return Ok(produced);
    }

    if !selection.structure.is_empty() {
        let output = staging_dir.join(STRUCTURE_FILE);
        let command = wrap_remote(
            spec.remote_host.as_deref(),
            &driver::structure_dump_command(spec, &selection.structure, &output),
        );

        tracing::info!(
            "Dumping structure for {} table(s)",
            selection.structure.len()
        );
        let result = invoker.execute(&command).await?;
        if !result.success {
            return Err(SyncError::StructureDumpFailed {
                detail: result.stderr.trim().to_string(),
            }
            .into());
        }

        tracing::info!("✓ {}", STRUCTURE_FILE);
        produced.push(output);
    }

    for table in &selection.data {
        let output = staging_dir.join(format!("{}.sql", table));
        let command = wrap_remote(
            spec.remote_host.as_deref(),
            &driver::data_dump_command(spec, table, &output),
        );

        let result = invoker.execute(&command).await?;
        if !result.success {
            return Err(SyncError::TableDumpFailed {
                table: table.clone(),
                detail: result.stderr.trim().to_string(),
            }
            .into());
        }

        tracing::info!("✓ {}.sql", table);
        produced.push(output);
    }

    tracing::info!(
        "Dump complete: {} file(s) in {}",
        produced.len(),
        staging_dir.display()
    );
    Ok(produced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Driver;
    use crate::process::CommandOutput;
    use anyhow::Result;
    use std::sync::Mutex;

    /// Invoker that records every command and fails those containing a
    /// configured marker.
    struct ScriptedInvoker {
        calls: Mutex<Vec<String>>,
        fail_on: Option<String>,
    }

    impl ScriptedInvoker {
        fn new(fail_on: Option<&str>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on: fail_on.map(String::from),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ProcessInvoker for ScriptedInvoker {
        async fn execute(&self, command: &str) -> Result<CommandOutput> {
            self.calls.lock().unwrap().push(command.to_string());
            let fail = self
                .fail_on
                .as_ref()
                .is_some_and(|marker| command.contains(marker));
            Ok(CommandOutput {
                success: !fail,
                code: Some(if fail { 1 } else { 0 }),
                stdout: String::new(),
                stderr: if fail { "dump blew up".to_string() } else { String::new() },
            })
        }
    }

    fn spec() -> DbSpec {
        DbSpec {
            driver: Driver::Mysql,
            database: "app".to_string(),
            user: None,
            password: None,
            host: "localhost".to_string(),
            port: 3306,
            remote_host: None,
        }
    }

    fn selection(data: &[&str], structure: &[&str]) -> TableSelection {
        TableSelection {
            data: data.iter().map(|s| s.to_string()).collect(),
            structure: structure.iter().map(|s| s.to_string()).collect(),
            skip: Vec::new(),
        }
    }

    #[tokio::test]
    async fn dumps_structure_before_tables() {
        let invoker = ScriptedInvoker::new(None);
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("app");

        let files = run_dump(
            &invoker,
            &spec(),
            &selection(&["users", "orders"], &["cache"]),
            &staging,
        )
        .await
        .unwrap();

        assert_eq!(
            files,
            vec![
                staging.join("structure.sql"),
                staging.join("users.sql"),
                staging.join("orders.sql"),
            ]
        );

        let calls = invoker.calls();
        assert!(calls[0].contains("--no-data"));
        assert!(calls[1].contains("users"));
        assert!(calls[2].contains("orders"));
    }

    #[tokio::test]
    async fn structure_failure_halts_before_any_table() {
        let invoker = ScriptedInvoker::new(Some("--no-data"));
        let dir = tempfile::tempdir().unwrap();

        let err = run_dump(
            &invoker,
            &spec(),
            &selection(&["users"], &["cache"]),
            &dir.path().join("app"),
        )
        .await
        .unwrap_err();

        let sync_err = err.downcast::<SyncError>().unwrap();
        assert!(matches!(sync_err, SyncError::StructureDumpFailed { .. }));
        // Only the structure command ran
        assert_eq!(invoker.calls().len(), 1);
    }

    #[tokio::test]
    async fn table_failure_halts_the_remaining_loop() {
        let invoker = ScriptedInvoker::new(Some("orders"));
        let dir = tempfile::tempdir().unwrap();

        let err = run_dump(
            &invoker,
            &spec(),
            &selection(&["users", "orders", "items"], &[]),
            &dir.path().join("app"),
        )
        .await
        .unwrap_err();

        match err.downcast::<SyncError>().unwrap() {
            SyncError::TableDumpFailed { table, detail } => {
                assert_eq!(table, "orders");
                assert_eq!(detail, "dump blew up");
            }
            other => panic!("unexpected error: {}", other),
        }
        // users + orders ran, items never attempted
        assert_eq!(invoker.calls().len(), 2);
    }

    #[tokio::test]
    async fn empty_selection_is_a_no_op_success() {
        let invoker = ScriptedInvoker::new(None);
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("app");

        let files = run_dump(&invoker, &spec(), &selection(&[], &[]), &staging)
            .await
            .unwrap();

        assert!(files.is_empty());
        assert!(staging.is_dir());
        assert!(invoker.calls().is_empty());
    }

    #[tokio::test]
    async fn staging_dir_is_recreated_empty() {
        let invoker = ScriptedInvoker::new(None);
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("app");

        std::fs::create_dir_all(&staging).unwrap();
        std::fs::write(staging.join("stale.sql"), "old dump").unwrap();

        run_dump(&invoker, &spec(), &selection(&["users"], &[]), &staging)
            .await
            .unwrap();

        assert!(!staging.join("stale.sql").exists());
    }
}
