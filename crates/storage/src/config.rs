//! Database configuration from the environment and pool construction.

use std::fmt;
use std::time::Duration;

use pipeline_sync_core::env_config::{is_truthy, parse_with_default};
use pipeline_sync_core::{
    DEFAULT_PG_PORT, DEFAULT_SCHEMA, PG_POOL_ACQUIRE_TIMEOUT_SECS, PG_POOL_IDLE_TIMEOUT_SECS,
    PG_POOL_MAX_CONNECTIONS, validate_identifier,
};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};

use crate::error::StorageError;

/// Target schema: `explicit` when given, else a non-blank `DB_SCHEMA` (trimmed),
/// else the default. The result is always a validated identifier.
pub fn resolve_schema<F>(explicit: Option<&str>, lookup: F) -> Result<String, StorageError>
where
    F: Fn(&str) -> Option<String>,
{
    let schema = match explicit {
        Some(schema) => schema.to_owned(),
        None => lookup("DB_SCHEMA")
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SCHEMA.to_owned()),
    };
    validate_identifier(&schema)?;
    Ok(schema)
}

/// Where to connect.
#[derive(Clone, PartialEq, Eq)]
pub enum DbTarget {
    /// Full connection string from `DATABASE_URL`.
    Url(String),
    /// Discrete `DB_HOST` / `DB_PORT` / `DB_NAME` / `DB_USER` / `DB_PASSWORD`.
    Parts { host: String, port: u16, database: String, user: String, password: String },
}

// Manual impl keeps credentials out of logs.
impl fmt::Debug for DbTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(_) => f.write_str("Url(<redacted>)"),
            Self::Parts { host, port, database, user, .. } => f
                .debug_struct("Parts")
                .field("host", host)
                .field("port", port)
                .field("database", database)
                .field("user", user)
                .finish_non_exhaustive(),
        }
    }
}

/// Connection and schema settings for one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub target: DbTarget,
    pub ssl: bool,
    pub schema: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DbConfig {
    pub fn from_env() -> Result<Self, StorageError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source. `DATABASE_URL` wins; otherwise every
    /// discrete `DB_*` variable except `DB_PORT` is required, and all missing
    /// names are reported together.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StorageError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let target = if let Some(url) = get("DATABASE_URL") {
            DbTarget::Url(url)
        } else {
            let required = ["DB_HOST", "DB_NAME", "DB_USER", "DB_PASSWORD"];
            let missing: Vec<&str> = required.iter().copied().filter(|k| get(*k).is_none()).collect();
            if !missing.is_empty() {
                return Err(StorageError::Config(format!(
                    "DATABASE_URL is not set and discrete settings are missing: {}",
                    missing.join(", ")
                )));
            }
            let port = match get("DB_PORT") {
                Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                    StorageError::Config(format!("DB_PORT is not a valid port: {raw}"))
                })?,
                None => DEFAULT_PG_PORT,
            };
            DbTarget::Parts {
                host: get("DB_HOST").unwrap_or_default(),
                port,
                database: get("DB_NAME").unwrap_or_default(),
                user: get("DB_USER").unwrap_or_default(),
                password: get("DB_PASSWORD").unwrap_or_default(),
            }
        };

        let schema = resolve_schema(None, &lookup)?;

        Ok(Self {
            target,
            ssl: is_truthy(get("DB_SSL").as_deref()),
            schema,
            max_connections: parse_with_default(
                "PIPELINE_PG_MAX_CONNECTIONS",
                get("PIPELINE_PG_MAX_CONNECTIONS"),
                PG_POOL_MAX_CONNECTIONS,
            )
            .max(1),
            acquire_timeout: Duration::from_secs(parse_with_default(
                "PIPELINE_PG_ACQUIRE_TIMEOUT_SECS",
                get("PIPELINE_PG_ACQUIRE_TIMEOUT_SECS"),
                PG_POOL_ACQUIRE_TIMEOUT_SECS,
            )),
        })
    }

    /// Replace the schema, e.g. from a CLI flag.
    pub fn with_schema(mut self, schema: &str) -> Result<Self, StorageError> {
        self.schema = validate_identifier(schema)?.to_owned();
        Ok(self)
    }

    pub fn connect_options(&self) -> Result<PgConnectOptions, StorageError> {
        let options = match &self.target {
            DbTarget::Url(url) => url
                .parse::<PgConnectOptions>()
                .map_err(|e| StorageError::Config(format!("invalid DATABASE_URL: {e}")))?,
            DbTarget::Parts { host, port, database, user, password } => PgConnectOptions::new()
                .host(host)
                .port(*port)
                .database(database)
                .username(user)
                .password(password),
        };
        Ok(if self.ssl { options.ssl_mode(PgSslMode::Require) } else { options })
    }

    /// Create a pool without opening a connection yet. Connection failures
    /// surface on first acquire, where the runner can report them.
    pub fn lazy_pool(&self) -> Result<PgPool, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(Duration::from_secs(PG_POOL_IDLE_TIMEOUT_SECS))
            .test_before_acquire(true)
            .connect_lazy_with(self.connect_options()?);
        tracing::debug!(db = ?self.target, schema = %self.schema, "PostgreSQL pool configured");
        Ok(pool)
    }
}
