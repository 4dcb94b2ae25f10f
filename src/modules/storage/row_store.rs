use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::features::auth::model::User;
use crate::features::files::models::FileRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (e.g. two concurrent first
    /// logins for the same identity).
    #[error("unique constraint violated")]
    UniqueViolation(#[source] sqlx::Error),

    /// The query did not complete within the configured bound.
    #[error("row store query timed out")]
    Timeout,

    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),
}

/// Parameterized-query access to the `users` and `files` tables.
///
/// Implementations differ only in engine and SQL dialect; callers never learn
/// which backend they are talking to. Zero rows is `Ok`, never an error.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Create the `users` and `files` tables if absent. Idempotent.
    async fn ensure_schema(&self) -> Result<(), StoreError>;

    async fn find_user_by_provider_id(
        &self,
        provider_id: &str,
    ) -> Result<Option<User>, StoreError>;

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn insert_user(&self, email: &str, provider_id: &str) -> Result<User, StoreError>;

    async fn insert_file(
        &self,
        name: &str,
        content: &str,
        owner_id: Option<i64>,
    ) -> Result<FileRecord, StoreError>;

    async fn list_files(&self) -> Result<Vec<FileRecord>, StoreError>;

    async fn count_files(&self) -> Result<i64, StoreError>;

    /// Case-sensitive substring match against `name`.
    async fn search_files_by_name(&self, query: &str) -> Result<Vec<FileRecord>, StoreError>;
}

/// Bound a query future so a hung store call fails its request instead of
/// hanging it.
pub(crate) async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, sqlx::Error>> + Send,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(classify(err)),
        Err(_) => Err(StoreError::Timeout),
    }
}

pub(crate) fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db) = err {
        if db.is_unique_violation() {
            return StoreError::UniqueViolation(err);
        }
    }
    StoreError::Query(err)
}
