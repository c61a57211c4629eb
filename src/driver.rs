// ABOUTME: Closed driver dispatch for dump and restore command generation
// ABOUTME: Renders mysql and postgres client invocations for each table operation

use crate::error::SyncError;
use std::fmt;
use std::path::Path;

/// Database engine family. Dispatch over this enum is closed: adding an
/// engine means adding a variant and its command shapes here, never an
/// open-ended lookup elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    Mysql,
    Postgres,
}

impl Driver {
    /// Resolve a driver identifier from configuration.
    ///
    /// Anything outside the closed set fails with `UnsupportedDriver` so the
    /// caller can reject the configuration before any work starts.
    pub fn from_name(name: &str) -> Result<Driver, SyncError> {
        match name {
            "mysql" => Ok(Driver::Mysql),
            "postgres" | "postgresql" | "pgsql" => Ok(Driver::Postgres),
            other => Err(SyncError::UnsupportedDriver(other.to_string())),
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Driver::Mysql => 3306,
            Driver::Postgres => 5432,
        }
    }

    /// Client binaries a run needs in PATH for this driver.
    pub fn client_tools(&self) -> &'static [&'static str] {
        match self {
            Driver::Mysql => &["mysqldump", "mysql"],
            Driver::Postgres => &["pg_dump", "psql"],
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Driver::Mysql => write!(f, "mysql"),
            Driver::Postgres => write!(f, "postgres"),
        }
    }
}

/// Connection identity for one database, resolved once per run from the
/// named site in the configuration file.
#[derive(Debug, Clone)]
pub struct DbSpec {
    pub driver: Driver,
    pub database: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: String,
    pub port: u16,
    /// SSH destination when the site lives on another machine. Dump and
    /// introspection commands are wrapped in `ssh <host> '...'` and the
    /// `host` field above is then resolved from that machine.
    pub remote_host: Option<String>,
}

impl DbSpec {
    fn mysql_credentials(&self) -> String {
        let mut fragment = format!("--host={} --port={}", self.host, self.port);
        if let Some(user) = &self.user {
            fragment.push_str(&format!(" --user={}", user));
        }
        if let Some(password) = &self.password {
            fragment.push_str(&format!(" --password={}", password));
        }
        fragment
    }

    fn postgres_credentials(&self) -> String {
        let mut fragment = format!("--host={} --port={}", self.host, self.port);
        if let Some(user) = &self.user {
            fragment.push_str(&format!(" --username={}", user));
        }
        fragment
    }

    // The password lands in the command string's environment prefix. The
    // whole command is logged as-is; see the staging/command exposure note
    // in the README.
    fn postgres_env(&self) -> String {
        match &self.password {
            Some(password) => format!("PGPASSWORD='{}' ", password),
            None => String::new(),
        }
    }
}

/// Build the single command that dumps schema (no row data) for every
/// structure-only table into one file.
pub fn structure_dump_command(spec: &DbSpec, tables: &[String], output: &Path) -> String {
    match spec.driver {
        Driver::Mysql => format!(
            "mysqldump {} --no-data --result-file={} {} {}",
            spec.mysql_credentials(),
            output.display(),
            spec.database,
            tables.join(" ")
        ),
        Driver::Postgres => {
            let table_flags = tables
                .iter()
                .map(|t| format!("--table={}", t))
                .collect::<Vec<_>>()
                .join(" ");
            format!(
                "{}pg_dump {} --clean --schema-only {} --file={} {}",
                spec.postgres_env(),
                spec.postgres_credentials(),
                table_flags,
                output.display(),
                spec.database
            )
        }
    }
}

/// Build the command that dumps schema and data for one table into
/// `<table>.sql` inside the staging directory.
pub fn data_dump_command(spec: &DbSpec, table: &str, output: &Path) -> String {
    match spec.driver {
        Driver::Mysql => format!(
            "mysqldump {} --result-file={} {} {}",
            spec.mysql_credentials(),
            output.display(),
            spec.database,
            table
        ),
        Driver::Postgres => format!(
            "{}pg_dump {} --clean --table={} --file={} {}",
            spec.postgres_env(),
            spec.postgres_credentials(),
            table,
            output.display(),
            spec.database
        ),
    }
}

/// Build the command that restores a single dump file into the database.
pub fn import_command(spec: &DbSpec, file: &Path) -> String {
    import_invocation(spec, &file.display().to_string())
}

/// Same as [`import_command`] but with a caller-provided file argument, so
/// the fan-out strategy can substitute its own `{}` placeholder.
pub fn import_invocation(spec: &DbSpec, file_arg: &str) -> String {
    match spec.driver {
        Driver::Mysql => format!(
            "mysql {} {} < {}",
            spec.mysql_credentials(),
            spec.database,
            file_arg
        ),
        Driver::Postgres => format!(
            "{}psql {} --quiet --set=ON_ERROR_STOP=1 --dbname={} --file={}",
            spec.postgres_env(),
            spec.postgres_credentials(),
            spec.database,
            file_arg
        ),
    }
}

/// Build the command that lists every user table, one name per line.
pub fn list_tables_command(spec: &DbSpec) -> String {
    match spec.driver {
        Driver::Mysql => format!(
            "mysql {} --batch --skip-column-names --execute='SHOW TABLES' {}",
            spec.mysql_credentials(),
            spec.database
        ),
        Driver::Postgres => format!(
            "{}psql {} --tuples-only --no-align --dbname={} \
             --command=\"SELECT tablename FROM pg_catalog.pg_tables \
             WHERE schemaname NOT IN ('pg_catalog', 'information_schema') \
             ORDER BY tablename\"",
            spec.postgres_env(),
            spec.postgres_credentials(),
            spec.database
        ),
    }
}
