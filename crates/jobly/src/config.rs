//! Environment-driven configuration and connection bootstrap.
//!
//! | Variable                 | Meaning                                  |
//! |--------------------------|------------------------------------------|
//! | `DATABASE_URL`           | Postgres connection string (required)    |
//! | `TEST_DATABASE_URL`      | Overrides `DATABASE_URL` in [`Config::test`] |
//! | `JOBLY_QUERY_TIMEOUT_MS` | Per-statement timeout in milliseconds    |
//!
//! A `.env` file in the working directory is loaded first when present.

use crate::client::TimeoutClient;
use crate::error::{JoblyError, JoblyResult};
use std::time::Duration;
use tokio_postgres::{Client, NoTls};

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Postgres connection string.
    pub database_url: String,
    /// Query timeout duration.
    pub query_timeout: Option<Duration>,
}

impl Config {
    /// Create a configuration for `database_url` with no timeout.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            query_timeout: None,
        }
    }

    /// Set query timeout.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.query_timeout = Some(duration);
        self
    }

    /// Load from the process environment (and `.env`).
    pub fn from_env() -> JoblyResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration used by database-backed tests.
    ///
    /// `TEST_DATABASE_URL` wins over `DATABASE_URL`.
    pub fn test() -> JoblyResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| match key {
            "DATABASE_URL" => std::env::var("TEST_DATABASE_URL")
                .or_else(|_| std::env::var("DATABASE_URL"))
                .ok(),
            _ => std::env::var(key).ok(),
        })
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> JoblyResult<Self> {
        let database_url = lookup("DATABASE_URL")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| JoblyError::Config("DATABASE_URL is not set".to_string()))?;

        let query_timeout = match lookup("JOBLY_QUERY_TIMEOUT_MS") {
            None => None,
            Some(raw) => {
                let ms: u64 = raw.trim().parse().map_err(|_| {
                    JoblyError::Config(format!("JOBLY_QUERY_TIMEOUT_MS is not a number: {raw}"))
                })?;
                Some(Duration::from_millis(ms))
            }
        };

        Ok(Self {
            database_url,
            query_timeout,
        })
    }

    /// Open a single connection and spawn its driver task.
    ///
    /// Must be called inside a Tokio runtime.
    pub async fn connect(&self) -> JoblyResult<TimeoutClient<Client>> {
        let (client, connection) = tokio_postgres::connect(&self.database_url, NoTls)
            .await
            .map_err(|e| JoblyError::Connection(e.to_string()))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(target: "jobly.db", error = %e, "connection error");
            }
        });

        tracing::debug!(
            target: "jobly.db",
            timeout = ?self.query_timeout,
            "connected"
        );
        Ok(TimeoutClient::new(client, self.query_timeout))
    }
}
