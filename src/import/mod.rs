// ABOUTME: Import scheduling over a staging directory of per-table dumps
// ABOUTME: Picks the fan-out tool when available, otherwise chunked concurrency

pub mod chunked;
pub mod fanout;

pub use chunked::ChunkedConcurrency;

use crate::driver::DbSpec;
use crate::error::SyncError;
use crate::process::{self, ProcessInvoker};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// One discovered dump file. The table name is the file stem and is used
/// for reporting only.
#[derive(Debug, Clone)]
pub struct ImportJob {
    pub table: String,
    pub file: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Success,
    Failed,
}

#[derive(Debug)]
pub struct JobResult {
    pub job: ImportJob,
    pub status: JobStatus,
    pub detail: Option<String>,
}

/// Aggregated outcome of one import run. `results` is in listing order;
/// `fatal` is the first table-level failure when one occurred.
#[derive(Debug, Default)]
pub struct RunReport {
    pub results: Vec<JobResult>,
    pub fatal: Option<SyncError>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.fatal.is_none()
    }

    pub fn success_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == JobStatus::Success)
            .count()
    }
}

/// How the scheduler executes the job set. Selected once per run by probing
/// for the external fan-out tool; the run contract is identical either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    FanOut,
    Chunked,
}

impl Strategy {
    pub fn detect() -> Strategy {
        if process::fanout_available() {
            Strategy::FanOut
        } else {
            Strategy::Chunked
        }
    }
}

/// List the import jobs in a staging directory.
///
/// Hidden entries and entries without an extension are excluded; the result
/// is name-sorted so batch partitioning is stable across runs.
pub fn list_import_jobs(dir: &Path) -> Result<Vec<ImportJob>> {
    if !dir.is_dir() {
        return Err(SyncError::MissingStagingDirectory(dir.to_path_buf()).into());
    }

    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read staging directory {}", dir.display()))?;

    let mut jobs = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read entry in {}", dir.display()))?
            .path();

        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') || path.extension().is_none() {
            continue;
        }

        let table = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(name)
            .to_string();
        jobs.push(ImportJob { table, file: path });
    }

    jobs.sort_by(|a, b| a.file.cmp(&b.file));
    Ok(jobs)
}

/// Import every dump file in `staging_dir` into the database.
pub async fn run<I: ProcessInvoker>(
    invoker: &I,
    spec: &DbSpec,
    staging_dir: &Path,
    concurrency: i64,
) -> Result<RunReport> {
    let jobs = list_import_jobs(staging_dir)?;
    if jobs.is_empty() {
        tracing::info!("No dump files found in {}", staging_dir.display());
        return Ok(RunReport::default());
    }

    let strategy = Strategy::detect();
    run_with_strategy(invoker, spec, &jobs, strategy, concurrency).await
}

/// Run the job set with an explicitly chosen strategy.
pub async fn run_with_strategy<I: ProcessInvoker>(
    invoker: &I,
    spec: &DbSpec,
    jobs: &[ImportJob],
    strategy: Strategy,
    concurrency: i64,
) -> Result<RunReport> {
    // Concurrency is validated before any job is scheduled, even when the
    // fan-out tool ends up managing its own job count.
    let chunked = ChunkedConcurrency::new(concurrency)?;

    match strategy {
        Strategy::FanOut => {
            tracing::info!(
                "Importing {} file(s) via {}",
                jobs.len(),
                process::FANOUT_TOOL
            );
            fanout::run(invoker, spec, jobs).await
        }
        Strategy::Chunked => {
            tracing::info!(
                "Importing {} file(s) in batches of {}",
                jobs.len(),
                chunked.limit()
            );
            chunked.run(invoker, spec, jobs).await
        }
    }
}
