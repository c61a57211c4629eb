// ABOUTME: Typed error kinds for dump and import failures
// ABOUTME: Separates up-front validation errors from per-table runtime failures

use std::path::PathBuf;
use thiserror::Error;

/// Error kinds the orchestration core distinguishes.
///
/// `UnsupportedDriver` and `InvalidConcurrency` are validation errors and
/// surface before any dump or import work starts. The remaining kinds carry
/// the specific table or file that failed plus the captured error output.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("unsupported database driver '{0}' (expected 'mysql' or 'postgres')")]
    UnsupportedDriver(String),

    #[error("structure dump failed: {detail}")]
    StructureDumpFailed { detail: String },

    #[error("dump failed for table '{table}': {detail}")]
    TableDumpFailed { table: String, detail: String },

    #[error("import failed for table '{table}': {detail}")]
    TableImportFailed { table: String, detail: String },

    #[error("staging directory {} does not exist or is not a directory", .0.display())]
    MissingStagingDirectory(PathBuf),

    #[error("concurrency limit must be at least 1, got {0}")]
    InvalidConcurrency(i64),

    #[error("parallel import run failed: {detail}")]
    FanOutFailed { detail: String },
}
