// ABOUTME: Staging directory resolution and lifecycle
// ABOUTME: Computes deterministic per-database dump paths with remote temp discovery

use crate::driver::DbSpec;
use crate::process::{wrap_remote, ProcessInvoker};
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory component separating syncdb staging trees from the rest of the
/// temp root. The layout below it is `<base>/<table>.sql` plus one
/// `structure.sql`; other tooling depends on those names.
const STAGING_SUBDIR: &str = "syncdb";

/// Base directory name for one database's staging tree.
///
/// Remote sites get a host prefix so two sites sharing a database name never
/// collide in the same temp root.
pub fn staging_base_name(spec: &DbSpec) -> String {
    match &spec.remote_host {
        Some(host) => format!("{}_{}", host, spec.database),
        None => spec.database.clone(),
    }
}

/// Resolve the staging directory from already-known inputs.
///
/// This is a pure function of its arguments: the same spec, override, and
/// discovered root always yield the same path, so the dump side and the
/// import side of a sync agree on the location independently.
///
/// Precedence: a user-supplied directory wins verbatim; a remote site uses
/// the discovered remote temp root, falling back to `/tmp` when discovery
/// produced nothing; a local site uses the local temp root.
pub fn resolve_staging_path(
    spec: &DbSpec,
    user_dir: Option<&Path>,
    discovered_tmp: Option<&Path>,
) -> PathBuf {
    if let Some(dir) = user_dir {
        return dir.to_path_buf();
    }

    let base = staging_base_name(spec);
    let root = if spec.remote_host.is_some() {
        discovered_tmp
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/tmp"))
    } else {
        std::env::temp_dir()
    };

    root.join(STAGING_SUBDIR).join(base)
}

/// Ask the remote machine for its temp root. Best-effort: any failure of the
/// round trip (unreachable host, missing shell, empty answer) returns None
/// and the caller falls back to a conventional path.
pub async fn discover_remote_tmp<I: ProcessInvoker>(invoker: &I, host: &str) -> Option<PathBuf> {
    let command = format!("ssh {} 'echo ${{TMPDIR:-/tmp}}'", host);

    match invoker.execute(&command).await {
        Ok(output) if output.success => {
            let line = output.stdout.lines().next().unwrap_or("").trim();
            if line.is_empty() {
                tracing::warn!("Remote temp discovery on {} returned nothing", host);
                None
            } else {
                Some(PathBuf::from(line))
            }
        }
        Ok(output) => {
            tracing::warn!(
                "Remote temp discovery on {} failed: {}",
                host,
                output.stderr.trim()
            );
            None
        }
        Err(e) => {
            tracing::warn!("Remote temp discovery on {} failed: {}", host, e);
            None
        }
    }
}

/// Resolve the staging directory for a site, running remote discovery when
/// needed. Always produces a path; resolution never fails a run.
pub async fn resolve<I: ProcessInvoker>(
    invoker: &I,
    spec: &DbSpec,
    user_dir: Option<&Path>,
) -> PathBuf {
    if user_dir.is_some() {
        return resolve_staging_path(spec, user_dir, None);
    }

    let discovered = match &spec.remote_host {
        Some(host) => discover_remote_tmp(invoker, host).await,
        None => None,
    };

    resolve_staging_path(spec, None, discovered.as_deref())
}

/// Delete any previous staging directory for this run and recreate it empty,
/// so dumping twice never mixes stale and fresh files.
pub async fn prepare_staging_dir<I: ProcessInvoker>(
    invoker: &I,
    spec: &DbSpec,
    path: &Path,
) -> Result<()> {
    match &spec.remote_host {
        Some(host) => {
            let command = wrap_remote(
                Some(host),
                &format!("rm -rf {dir} && mkdir -p {dir}", dir = path.display()),
            );
            let output = invoker.execute(&command).await?;
            if !output.success {
                bail!(
                    "Failed to prepare staging directory {} on {}: {}",
                    path.display(),
                    host,
                    output.stderr.trim()
                );
            }
        }
        None => {
            if path.exists() {
                fs::remove_dir_all(path).with_context(|| {
                    format!("Failed to remove old staging directory {}", path.display())
                })?;
            }
            fs::create_dir_all(path).with_context(|| {
                format!("Failed to create staging directory {}", path.display())
            })?;
        }
    }

    tracing::debug!("Staging directory ready: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Driver;

    fn local_spec() -> DbSpec {
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

    fn remote_spec() -> DbSpec {
        DbSpec {
            remote_host: Some("deploy@prod".to_string()),
            ..local_spec()
        }
    }

    #[test]
    fn base_name_prefixes_remote_host() {
        assert_eq!(staging_base_name(&local_spec()), "app");
        assert_eq!(staging_base_name(&remote_spec()), "deploy@prod_app");
    }

    #[test]
    fn user_supplied_dir_wins_verbatim() {
        let path = resolve_staging_path(
            &remote_spec(),
            Some(Path::new("/var/dumps/app")),
            Some(Path::new("/ignored")),
        );
        assert_eq!(path, PathBuf::from("/var/dumps/app"));
    }

    #[test]
    fn remote_site_uses_discovered_root() {
        let path = resolve_staging_path(&remote_spec(), None, Some(Path::new("/var/tmp")));
        assert_eq!(path, PathBuf::from("/var/tmp/syncdb/deploy@prod_app"));
    }

    #[test]
    fn remote_site_falls_back_to_tmp_without_discovery() {
        let path = resolve_staging_path(&remote_spec(), None, None);
        assert_eq!(path, PathBuf::from("/tmp/syncdb/deploy@prod_app"));
    }

    #[test]
    fn local_site_uses_local_temp_root() {
        let path = resolve_staging_path(&local_spec(), None, None);
        assert_eq!(path, std::env::temp_dir().join("syncdb").join("app"));
    }

    #[test]
    fn resolution_is_deterministic() {
        let first = resolve_staging_path(&remote_spec(), None, Some(Path::new("/var/tmp")));
        let second = resolve_staging_path(&remote_spec(), None, Some(Path::new("/var/tmp")));
        assert_eq!(first, second);
    }
}
