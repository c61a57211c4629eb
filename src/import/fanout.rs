// ABOUTME: Import strategy delegating to an external parallel-command runner
// ABOUTME: Feeds every dump file into one oversubscribed parallel invocation

use super::{ImportJob, JobResult, JobStatus, RunReport};
use crate::driver::{self, DbSpec};
use crate::error::SyncError;
use crate::process::{ProcessInvoker, FANOUT_TOOL};
use anyhow::Result;

/// Imports are I/O bound on the database side, so the tool gets roughly
/// twice the logical CPU count to keep it saturated.
fn oversubscribed_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() * 2)
        .unwrap_or(8)
}

/// Build the single invocation handed to the fan-out tool.
fn fanout_command(spec: &DbSpec, jobs: &[ImportJob], parallel_jobs: usize) -> String {
    let template = driver::import_invocation(spec, "{}");
    let files = jobs
        .iter()
        .map(|j| j.file.display().to_string())
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "{} --verbose --jobs {} \"{}\" ::: {}",
        FANOUT_TOOL, parallel_jobs, template, files
    )
}

/// Run the whole job set through the external tool as one atomic call.
///
/// The tool owns concurrency and per-item reporting; this strategy only sees
/// one exit status. On success every job is recorded successful (the tool
/// exits non-zero if any of its commands did); on failure the report carries
/// the tool's output and no per-table attribution.
pub async fn run<I: ProcessInvoker>(
    invoker: &I,
    spec: &DbSpec,
    jobs: &[ImportJob],
) -> Result<RunReport> {
    let command = fanout_command(spec, jobs, oversubscribed_jobs());
    let output = invoker.execute(&command).await?;

    let mut report = RunReport::default();
    if output.success {
        for job in jobs {
            tracing::info!("✓ imported {}", job.table);
            report.results.push(JobResult {
                job: job.clone(),
                status: JobStatus::Success,
                detail: None,
            });
        }
    } else {
        let detail = if output.stderr.trim().is_empty() {
            output.stdout.trim().to_string()
        } else {
            output.stderr.trim().to_string()
        };
        tracing::error!("{} run failed: {}", FANOUT_TOOL, detail);
        report.fatal = Some(SyncError::FanOutFailed { detail });
    }

    Ok(report)
}
