//! Configuration loading and representation.
//!
//! Values come from environment variables. `from_lookup` accepts any key →
//! value function so tests can supply a map instead of mutating process env.

use std::net::SocketAddr;

use sqlx::postgres::PgConnectOptions;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Connection settings for the PostgreSQL product store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Full connection URL; takes precedence over the individual parts.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Connection options, parsed from `url` or built from the parts.
    ///
    /// Parts are passed through as-is, so credentials need no URL escaping.
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        match &self.url {
            Some(url) => url.parse().map_err(|e: sqlx::Error| ConfigError::Invalid {
                key: "DATABASE_URL",
                value: "<redacted>".to_string(),
                reason: e.to_string(),
            }),
            None => Ok(PgConnectOptions::new()
                .host(&self.host)
                .port(self.port)
                .username(&self.user)
                .password(&self.password)
                .database(&self.name)),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            name: "stockroom".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// `true` selects PostgreSQL, otherwise products live in memory.
    pub use_persistent_stores: bool,
    pub database: DatabaseConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            use_persistent_stores: false,
            database: DatabaseConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();
        let db = defaults.database;

        let database = DatabaseConfig {
            url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            host: lookup("DB_HOST").unwrap_or(db.host),
            port: parse_or(&lookup, "DB_PORT", db.port)?,
            user: lookup("DB_USER").unwrap_or(db.user),
            password: lookup("DB_PASS").unwrap_or(db.password),
            name: lookup("DB_NAME").unwrap_or(db.name),
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", db.max_connections)?,
        };

        Ok(AppConfig {
            bind_addr: parse_or(&lookup, "BIND_ADDR", defaults.bind_addr)?,
            use_persistent_stores: parse_or(
                &lookup,
                "USE_PERSISTENT_STORES",
                defaults.use_persistent_stores,
            )?,
            database,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
