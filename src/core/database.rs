use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::core::config::DatabaseConfig;
use crate::modules::storage::{PostgresStore, RowStore, SqliteStore};

/// Relational backend, selected from the database URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Sqlite,
}

impl Backend {
    pub fn from_url(url: &str) -> Result<Self, String> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(Backend::Postgres)
        } else if url.starts_with("sqlite:") {
            Ok(Backend::Sqlite)
        } else {
            Err(format!("Unsupported DATABASE_URL scheme: {}", url))
        }
    }
}

/// Connect to the configured backend and hand it back behind the row-store
/// seam.
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn RowStore>> {
    let query_timeout = Duration::from_secs(config.query_timeout_secs);

    match Backend::from_url(&config.url).map_err(|e| anyhow::anyhow!(e))? {
        Backend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .min_connections(config.min_connections)
                .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
                .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
                .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
                .connect(&config.url)
                .await?;
            Ok(Arc::new(PostgresStore::new(pool, query_timeout)))
        }
        Backend::Sqlite => {
            let options = config
                .url
                .parse::<SqliteConnectOptions>()?
                .create_if_missing(true);
            let pool = SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
                .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
                .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
                .connect_with(options)
                .await?;
            Ok(Arc::new(SqliteStore::new(pool, query_timeout)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_is_selected_from_the_url_scheme() {
        assert_eq!(
            Backend::from_url("postgres://user:pw@localhost/db").unwrap(),
            Backend::Postgres
        );
        assert_eq!(
            Backend::from_url("postgresql://user:pw@localhost/db").unwrap(),
            Backend::Postgres
        );
        assert_eq!(
            Backend::from_url("sqlite://vault.db").unwrap(),
            Backend::Sqlite
        );
        assert_eq!(
            Backend::from_url("sqlite::memory:").unwrap(),
            Backend::Sqlite
        );
    }

    #[test]
    fn unknown_scheme_is_rejected() {
        assert!(Backend::from_url("mysql://localhost/db").is_err());
    }
}
