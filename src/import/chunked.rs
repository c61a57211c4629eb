// ABOUTME: Internal bounded-concurrency import strategy
// ABOUTME: Runs fixed-size batches of single-table imports with a barrier between batches

use super::{ImportJob, JobResult, JobStatus, RunReport};
use crate::driver::{self, DbSpec};
use crate::error::SyncError;
use crate::process::ProcessInvoker;
use anyhow::Result;
use futures::future::join_all;

pub const DEFAULT_CONCURRENCY: i64 = 30;

/// The internally engineered scheduler, used when no fan-out tool is
/// installed.
///
/// Jobs are partitioned into consecutive batches of at most the concurrency
/// limit, preserving listing order. Batches run strictly in sequence; the
/// jobs inside a batch run concurrently and the whole batch resolves before
/// the next one starts, so never more than `limit` imports are in flight.
#[derive(Debug, Clone, Copy)]
pub struct ChunkedConcurrency {
    limit: usize,
}

impl ChunkedConcurrency {
    /// Validates the limit up front: zero or negative is rejected before
    /// any job is scheduled.
    pub fn new(concurrency: i64) -> Result<Self, SyncError> {
        if concurrency < 1 {
            return Err(SyncError::InvalidConcurrency(concurrency));
        }
        Ok(Self {
            limit: concurrency as usize,
        })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn batch_count(&self, jobs: usize) -> usize {
        jobs.div_ceil(self.limit)
    }

    /// Run the job set to completion or to the first failing batch.
    ///
    /// A failed job does not interrupt jobs already dispatched in the same
    /// batch; they finish and every one of them gets a recorded result. No
    /// later batch starts after a failure. Table imports are often
    /// order-sensitive, so continuing past a known failure risks cascading
    /// errors that are harder to diagnose than the first one.
    pub async fn run<I: ProcessInvoker>(
        &self,
        invoker: &I,
        spec: &DbSpec,
        jobs: &[ImportJob],
    ) -> Result<RunReport> {
        let mut report = RunReport::default();

        for batch in jobs.chunks(self.limit) {
            let commands: Vec<String> = batch
                .iter()
                .map(|job| driver::import_command(spec, &job.file))
                .collect();

            let outcomes = join_all(commands.iter().map(|c| invoker.execute(c))).await;

            for (job, outcome) in batch.iter().zip(outcomes) {
                let failure = match outcome {
                    Ok(output) if output.success => None,
                    Ok(output) => Some(output.stderr.trim().to_string()),
                    Err(e) => Some(e.to_string()),
                };

                match failure {
                    None => {
                        tracing::info!("✓ imported {}", job.table);
                        report.results.push(JobResult {
                            job: job.clone(),
                            status: JobStatus::Success,
                            detail: None,
                        });
                    }
                    Some(detail) => {
                        tracing::error!("Import failed for table '{}': {}", job.table, detail);
                        if report.fatal.is_none() {
                            report.fatal = Some(SyncError::TableImportFailed {
                                table: job.table.clone(),
                                detail: detail.clone(),
                            });
                        }
                        report.results.push(JobResult {
                            job: job.clone(),
                            status: JobStatus::Failed,
                            detail: Some(detail),
                        });
                    }
                }
            }

            if report.fatal.is_some() {
                break;
            }
        }

        Ok(report)
    }
}
