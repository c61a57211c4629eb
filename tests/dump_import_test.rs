// ABOUTME: End-to-end dump and import flow against a scripted invoker
// ABOUTME: Exercises discovery, classification, staging layout, and re-import

use anyhow::Result;
use std::path::Path;
use std::sync::Mutex;
use syncdb::config::SiteConfig;
use syncdb::dump;
use syncdb::import::{self, Strategy};
use syncdb::process::{CommandOutput, ProcessInvoker};

/// Invoker that answers the table listing and materializes dump files the
/// way the real client tools would.
struct FakeDatabase {
    tables: Vec<&'static str>,
    calls: Mutex<Vec<String>>,
}

impl FakeDatabase {
    fn new(tables: Vec<&'static str>) -> Self {
        Self {
            tables,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ProcessInvoker for FakeDatabase {
    async fn execute(&self, command: &str) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(command.to_string());

        let mut stdout = String::new();
        if command.contains("SHOW TABLES") {
            for table in &self.tables {
                stdout.push_str(table);
                stdout.push('\n');
            }
        } else if let Some(rest) = command.split("--result-file=").nth(1) {
            let path = rest.split_whitespace().next().unwrap();
            std::fs::write(path, format!("-- dump via: {}\n", command)).unwrap();
        }

        Ok(CommandOutput {
            success: true,
            code: Some(0),
            stdout,
            stderr: String::new(),
        })
    }
}

fn site(staging_dir: &Path) -> SiteConfig {
    SiteConfig {
        driver: "mysql".to_string(),
        database: "app".to_string(),
        user: Some("deploy".to_string()),
        password: None,
        host: "localhost".to_string(),
        port: None,
        remote_host: None,
        data_tables: None,
        structure_tables: vec!["cache".to_string()],
        skip_tables: vec!["tmp_migrate".to_string()],
        staging_dir: Some(staging_dir.display().to_string()),
    }
}

#[tokio::test]
async fn dump_then_import_round_trips_the_staging_layout() {
    let dir = tempfile::tempdir().unwrap();
    let staging = dir.path().join("app");
    let site = site(&staging);
    let spec = site.db_spec().unwrap();

    let database = FakeDatabase::new(vec!["cache", "orders", "tmp_migrate", "users"]);

    // Dump: structure.sql for the cache table, one data file per data table,
    // nothing for the skipped table.
    let files = dump::run_site(&database, &site, &spec, &staging).await.unwrap();
    assert_eq!(
        files,
        vec![
            staging.join("structure.sql"),
            staging.join("orders.sql"),
            staging.join("users.sql"),
        ]
    );
    for file in &files {
        assert!(file.is_file());
    }
    assert!(!staging.join("tmp_migrate.sql").exists());

    // Import: every produced file becomes one job, in sorted order.
    let jobs = import::list_import_jobs(&staging).unwrap();
    let tables: Vec<&str> = jobs.iter().map(|j| j.table.as_str()).collect();
    assert_eq!(tables, vec!["orders", "structure", "users"]);

    let report = import::run_with_strategy(&database, &spec, &jobs, Strategy::Chunked, 30)
        .await
        .unwrap();
    assert!(report.succeeded());
    assert_eq!(report.success_count(), 3);

    // Each import command restores exactly one staged file
    let import_calls: Vec<String> = database
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("mysql ") && c.contains(" < "))
        .collect();
    assert_eq!(import_calls.len(), 3);
    for job in &jobs {
        assert!(import_calls
            .iter()
            .any(|c| c.ends_with(&format!("< {}", job.file.display()))));
    }
}

#[tokio::test]
async fn second_dump_replaces_the_first_without_mixing() {
    let dir = tempfile::tempdir().unwrap();
    let staging = dir.path().join("app");
    let mut site = site(&staging);
    let spec = site.db_spec().unwrap();

    let database = FakeDatabase::new(vec!["cache", "orders", "tmp_migrate", "users"]);
    dump::run_site(&database, &site, &spec, &staging).await.unwrap();
    assert!(staging.join("orders.sql").exists());

    // The orders table disappears before the second dump
    site.skip_tables.push("orders".to_string());
    dump::run_site(&database, &site, &spec, &staging).await.unwrap();

    assert!(staging.join("users.sql").exists());
    assert!(!staging.join("orders.sql").exists());
}
