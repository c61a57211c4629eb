// ABOUTME: Table discovery and classification for a dump run
// ABOUTME: Splits the live table list into data, structure-only, and skipped sets

use crate::driver::{list_tables_command, DbSpec};
use crate::process::{wrap_remote, ProcessInvoker};
use anyhow::{bail, Result};

/// The resolved set of tables for one dump run.
///
/// Computed once per run and immutable afterwards. When no explicit data
/// list is configured, `data` is everything the database reports minus the
/// structure-only and skipped tables, so the three sets are disjoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSelection {
    pub data: Vec<String>,
    pub structure: Vec<String>,
    pub skip: Vec<String>,
}

impl TableSelection {
    /// Classify the live table list against the configured rules.
    ///
    /// An explicit `data` list is used verbatim; the caller owns keeping it
    /// disjoint from the other sets in that case.
    pub fn classify(
        all_tables: &[String],
        data: Option<&[String]>,
        structure: &[String],
        skip: &[String],
    ) -> TableSelection {
        let data = match data {
            Some(explicit) => explicit.to_vec(),
            None => all_tables
                .iter()
                .filter(|t| !structure.contains(t) && !skip.contains(t))
                .cloned()
                .collect(),
        };

        TableSelection {
            data,
            structure: structure.to_vec(),
            skip: skip.to_vec(),
        }
    }

    /// True when the run has nothing to dump. Treated as a no-op success.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.structure.is_empty()
    }
}

/// Query the live database for its full table list, one name per line.
pub async fn list_tables<I: ProcessInvoker>(invoker: &I, spec: &DbSpec) -> Result<Vec<String>> {
    let command = wrap_remote(spec.remote_host.as_deref(), &list_tables_command(spec));
    let output = invoker.execute(&command).await?;

    if !output.success {
        bail!(
            "Failed to list tables for database '{}': {}",
            spec.database,
            output.stderr.trim()
        );
    }

    Ok(output
        .stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}
