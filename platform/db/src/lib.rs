//! Database primitives: pool settings, connection setup and health probes.

use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Shared pooled connection handle.
pub type DbPool = DatabaseConnection;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database url missing (set {0})")]
    MissingUrl(String),
    #[error("invalid value `{value}` for {key}")]
    InvalidSetting { key: String, value: String },
    #[error("failed to connect to database")]
    Connect(#[source] DbErr),
    #[error("database query failed")]
    Query(#[source] DbErr),
    #[error("health probe returned no rows")]
    EmptyProbe,
    #[error("health probe returned {0}, expected 1")]
    UnexpectedPing(i32),
}

pub type DbResult<T> = Result<T, DbError>;

const DEFAULT_URL_KEY: &str = "DATABASE_URL";

/// Pool settings, read from the environment by [`DatabaseSettings::from_env`].
#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_url_key")]
    pub url_key: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub acquire_timeout_secs: u64,
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    #[serde(default)]
    pub sql_logging: bool,
}

fn default_url_key() -> String {
    DEFAULT_URL_KEY.to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_timeout_secs() -> u64 {
    8
}

fn default_idle_timeout_secs() -> u64 {
    300
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url_key: default_url_key(),
            url: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_timeout_secs(),
            acquire_timeout_secs: default_timeout_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
            sql_logging: false,
        }
    }
}

impl DatabaseSettings {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn from_env() -> DbResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup (the process environment
    /// in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> DbResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let url = lookup(&defaults.url_key).filter(|value| !value.trim().is_empty());
        Ok(Self {
            url,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections)?,
            min_connections: parse_or(&lookup, "DB_MIN_CONNECTIONS", defaults.min_connections)?,
            connect_timeout_secs: parse_or(
                &lookup,
                "DB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            )?,
            acquire_timeout_secs: parse_or(
                &lookup,
                "DB_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout_secs,
            )?,
            idle_timeout_secs: parse_or(
                &lookup,
                "DB_IDLE_TIMEOUT_SECS",
                defaults.idle_timeout_secs,
            )?,
            sql_logging: lookup("DB_SQL_LOGGING")
                .map(|val| matches!(val.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.sql_logging),
            ..defaults
        })
    }

    pub fn database_url(&self) -> DbResult<&str> {
        self.url
            .as_deref()
            .ok_or_else(|| DbError::MissingUrl(self.url_key.clone()))
    }

    pub fn is_in_memory(&self) -> bool {
        self.url
            .as_deref()
            .is_some_and(|url| url.contains(":memory:") || url.contains("mode=memory"))
    }

    pub fn connect_options(&self) -> DbResult<ConnectOptions> {
        if self.min_connections > self.max_connections {
            return Err(DbError::InvalidSetting {
                key: "DB_MIN_CONNECTIONS".into(),
                value: self.min_connections.to_string(),
            });
        }
        let mut options = ConnectOptions::new(self.database_url()?.to_string());
        options
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .sqlx_logging(self.sql_logging);
        // Every pooled connection to an in-memory sqlite url opens its own
        // empty database, so those pools are pinned to a single connection.
        if self.is_in_memory() {
            options.max_connections(1).min_connections(1);
        } else {
            options
                .max_connections(self.max_connections)
                .min_connections(self.min_connections)
                .idle_timeout(Duration::from_secs(self.idle_timeout_secs));
        }
        Ok(options)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> DbResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| DbError::InvalidSetting {
            key: key.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}

/// Open the shared pool described by `settings`.
pub async fn connect(settings: &DatabaseSettings) -> DbResult<DbPool> {
    let options = settings.connect_options()?;
    let pool = Database::connect(options).await.map_err(DbError::Connect)?;
    info!(
        kind = ?pool_kind(&pool),
        max_connections = settings.max_connections,
        "database pool ready"
    );
    Ok(pool)
}

/// Run `SELECT 1` on a pooled connection and return the value.
pub async fn ping(pool: &DbPool) -> DbResult<i32> {
    let backend = pool.get_database_backend();
    let row = pool
        .query_one(Statement::from_string(backend, "SELECT 1 AS probe"))
        .await
        .map_err(DbError::Query)?
        .ok_or(DbError::EmptyProbe)?;
    let value: i32 = row.try_get("", "probe").map_err(DbError::Query)?;
    debug!(value, "database probe");
    Ok(value)
}

/// Like [`ping`], but fails unless the probe returned exactly 1.
pub async fn check(pool: &DbPool) -> DbResult<()> {
    match ping(pool).await? {
        1 => Ok(()),
        other => Err(DbError::UnexpectedPing(other)),
    }
}

/// The sqlx pool implementation behind a connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolKind {
    Postgres,
    Sqlite,
    Disconnected,
    Other,
}

pub fn pool_kind(pool: &DbPool) -> PoolKind {
    match pool {
        DatabaseConnection::SqlxPostgresPoolConnection(_) => PoolKind::Postgres,
        DatabaseConnection::SqlxSqlitePoolConnection(_) => PoolKind::Sqlite,
        DatabaseConnection::Disconnected => PoolKind::Disconnected,
        #[allow(unreachable_patterns)]
        _ => PoolKind::Other,
    }
}

/// Live pool occupancy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolStatus {
    pub size: u32,
    pub idle: usize,
}

pub fn pool_status(pool: &DbPool) -> Option<PoolStatus> {
    match pool_kind(pool) {
        PoolKind::Postgres => {
            let inner = pool.get_postgres_connection_pool();
            Some(PoolStatus {
                size: inner.size(),
                idle: inner.num_idle(),
            })
        }
        PoolKind::Sqlite => {
            let inner = pool.get_sqlite_connection_pool();
            Some(PoolStatus {
                size: inner.size(),
                idle: inner.num_idle(),
            })
        }
        PoolKind::Disconnected | PoolKind::Other => None,
    }
}
