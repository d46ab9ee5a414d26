//! Store configuration read from the environment.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Default size of the PostgreSQL connection pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Errors raised while reading store configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("{0} environment variable must be set")]
    Missing(&'static str),

    /// A variable is set to an unusable value.
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        /// The variable name.
        name: &'static str,
        /// The rejected value.
        value: String,
        /// What the value should look like.
        expected: &'static str,
    },

    /// The database could not be reached.
    #[error("failed to connect to database: {0}")]
    Connect(#[from] sqlx::Error),
}

/// Connection settings for the PostgreSQL lock store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// `DATABASE_URL`.
    pub database_url: String,
    /// `DATABASE_MAX_CONNECTIONS`, default [`DEFAULT_MAX_CONNECTIONS`].
    pub max_connections: u32,
}

impl StoreConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if `DATABASE_URL` is unset and
    /// `ConfigError::Invalid` if `DATABASE_MAX_CONNECTIONS` is not a positive
    /// integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// a variable if it is set.
    ///
    /// # Errors
    ///
    /// Same as [`StoreConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "DATABASE_MAX_CONNECTIONS",
                        value: raw,
                        expected: "a positive integer",
                    });
                }
            },
        };
        Ok(Self {
            database_url,
            max_connections,
        })
    }

    /// Opens a connection pool.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Connect` if the database cannot be reached.
    pub async fn connect(&self) -> Result<PgPool, ConfigError> {
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .connect(&self.database_url)
            .await?;
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_pool_size() {
        let config = StoreConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://db/scenes")]))
            .unwrap();

        assert_eq!(config.database_url, "postgres://db/scenes");
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
    }

    #[test]
    fn test_reads_pool_size() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/scenes"),
            ("DATABASE_MAX_CONNECTIONS", "25"),
        ]))
        .unwrap();

        assert_eq!(config.max_connections, 25);
    }

    #[test]
    fn test_requires_database_url() {
        let result = StoreConfig::from_lookup(lookup(&[]));

        assert!(matches!(result, Err(ConfigError::Missing("DATABASE_URL"))));
    }

    #[test]
    fn test_rejects_bad_pool_size() {
        for bad in ["0", "-1", "many"] {
            let result = StoreConfig::from_lookup(lookup(&[
                ("DATABASE_URL", "postgres://db/scenes"),
                ("DATABASE_MAX_CONNECTIONS", bad),
            ]));

            assert!(
                matches!(
                    result,
                    Err(ConfigError::Invalid { name: "DATABASE_MAX_CONNECTIONS", .. })
                ),
                "{bad} should be rejected"
            );
        }
    }
}
