// ABOUTME: Subprocess invocation boundary for all external commands
// ABOUTME: Provides the shell invoker, ssh wrapping, and client tool probing

use crate::driver::Driver;
use anyhow::{bail, Context, Result};
use std::future::Future;
use tokio::process::Command;
use which::which;

/// External parallel-command runner the import scheduler prefers when it is
/// installed.
pub const FANOUT_TOOL: &str = "parallel";

/// Captured outcome of one external command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Boundary for running external commands.
///
/// Every dump, import, and discovery round trip goes through this trait, so
/// tests substitute a scripted invoker and never touch real databases.
pub trait ProcessInvoker: Send + Sync {
    fn execute(&self, command: &str) -> impl Future<Output = Result<CommandOutput>> + Send;
}

/// Production invoker: runs the command string through `sh -c` and captures
/// both output streams.
pub struct ShellInvoker;

impl ProcessInvoker for ShellInvoker {
    async fn execute(&self, command: &str) -> Result<CommandOutput> {
        tracing::debug!("Running: {}", command);

        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .output()
            .await
            .with_context(|| format!("Failed to spawn shell for: {}", command))?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Wrap a command for execution on a remote machine when a host is given.
///
/// Single quotes inside the command are escaped so the wrapped string
/// survives the remote shell intact.
pub fn wrap_remote(remote_host: Option<&str>, command: &str) -> String {
    match remote_host {
        Some(host) => format!("ssh {} '{}'", host, command.replace('\'', r"'\''")),
        None => command.to_string(),
    }
}

/// Check that the client binaries for this driver are available in PATH.
///
/// Runs before any dump or import so a missing tool fails the run with
/// installation instructions instead of a mid-run command error.
pub fn check_client_tools(driver: Driver) -> Result<()> {
    let mut missing = Vec::new();

    for tool in driver.client_tools() {
        if which(tool).is_err() {
            missing.push(*tool);
        }
    }

    if !missing.is_empty() {
        let install_hint = match driver {
            Driver::Mysql => {
                "- Ubuntu/Debian: sudo apt-get install mysql-client\n\
                 - macOS: brew install mysql-client\n\
                 - RHEL/CentOS: sudo yum install mysql"
            }
            Driver::Postgres => {
                "- Ubuntu/Debian: sudo apt-get install postgresql-client\n\
                 - macOS: brew install postgresql\n\
                 - RHEL/CentOS: sudo yum install postgresql"
            }
        };
        bail!(
            "Missing required {} client tools: {}\n\
             \n\
             Please install them:\n\
             {}",
            driver,
            missing.join(", "),
            install_hint
        );
    }

    Ok(())
}

/// Probe for the external fan-out tool.
pub fn fanout_available() -> bool {
    which(FANOUT_TOOL).is_ok()
}
