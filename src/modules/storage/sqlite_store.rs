use std::time::Duration;

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::features::auth::model::User;
use crate::features::files::models::FileRecord;

use super::row_store::{bounded, RowStore, StoreError};

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    provider_id TEXT NOT NULL UNIQUE
)
"#;

const CREATE_FILES: &str = r#"
CREATE TABLE IF NOT EXISTS files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    content TEXT NOT NULL,
    owner_id INTEGER REFERENCES users(id)
)
"#;

/// Row store over SQLite.
pub struct SqliteStore {
    pool: SqlitePool,
    query_timeout: Duration,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }
}

#[async_trait]
impl RowStore for SqliteStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        // users first: files carries the FK
        bounded(self.query_timeout, async {
            sqlx::query(CREATE_USERS).execute(&self.pool).await?;
            sqlx::query(CREATE_FILES).execute(&self.pool).await?;
            Ok(())
        })
        .await
    }

    async fn find_user_by_provider_id(
        &self,
        provider_id: &str,
    ) -> Result<Option<User>, StoreError> {
        bounded(
            self.query_timeout,
            sqlx::query_as::<_, User>(
                "SELECT id, email, provider_id FROM users WHERE provider_id = ?1",
            )
            .bind(provider_id)
            .fetch_optional(&self.pool),
        )
        .await
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        bounded(
            self.query_timeout,
            sqlx::query_as::<_, User>("SELECT id, email, provider_id FROM users WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn insert_user(&self, email: &str, provider_id: &str) -> Result<User, StoreError> {
        bounded(
            self.query_timeout,
            sqlx::query_as::<_, User>(
                "INSERT INTO users (email, provider_id) VALUES (?1, ?2) \
                 RETURNING id, email, provider_id",
            )
            .bind(email)
            .bind(provider_id)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn insert_file(
        &self,
        name: &str,
        content: &str,
        owner_id: Option<i64>,
    ) -> Result<FileRecord, StoreError> {
        bounded(
            self.query_timeout,
            sqlx::query_as::<_, FileRecord>(
                "INSERT INTO files (name, content, owner_id) VALUES (?1, ?2, ?3) \
                 RETURNING id, name, content, owner_id",
            )
            .bind(name)
            .bind(content)
            .bind(owner_id)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn list_files(&self) -> Result<Vec<FileRecord>, StoreError> {
        bounded(
            self.query_timeout,
            sqlx::query_as::<_, FileRecord>(
                "SELECT id, name, content, owner_id FROM files ORDER BY id",
            )
            .fetch_all(&self.pool),
        )
        .await
    }

    async fn count_files(&self) -> Result<i64, StoreError> {
        bounded(
            self.query_timeout,
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM files").fetch_one(&self.pool),
        )
        .await
    }

    async fn search_files_by_name(&self, query: &str) -> Result<Vec<FileRecord>, StoreError> {
        // instr() keeps the match case-sensitive (SQLite LIKE folds ASCII
        // case) and treats the query as a literal substring.
        bounded(
            self.query_timeout,
            sqlx::query_as::<_, FileRecord>(
                "SELECT id, name, content, owner_id FROM files \
                 WHERE instr(name, ?1) > 0 ORDER BY id",
            )
            .bind(query)
            .fetch_all(&self.pool),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::modules::storage::StoreError;
    use crate::shared::test_helpers::sqlite_store;

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let store = sqlite_store().await;
        // A second run against an existing schema must be a no-op.
        store.ensure_schema().await.unwrap();
        store.ensure_schema().await.unwrap();
    }

    #[tokio::test]
    async fn missing_user_is_none_not_an_error() {
        let store = sqlite_store().await;
        assert!(store
            .find_user_by_provider_id("no-such-subject")
            .await
            .unwrap()
            .is_none());
        assert!(store.find_user_by_id(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_provider_id_is_a_unique_violation() {
        let store = sqlite_store().await;
        store.insert_user("a@example.com", "subject-1").await.unwrap();

        let err = store
            .insert_user("b@example.com", "subject-1")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn search_is_case_sensitive() {
        let store = sqlite_store().await;
        store.insert_file("text", "lower", None).await.unwrap();
        store.insert_file("Text", "upper", None).await.unwrap();

        let hits = store.search_files_by_name("text").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "lower");
    }

    #[tokio::test]
    async fn search_treats_wildcards_as_literals() {
        let store = sqlite_store().await;
        store.insert_file("text", "plain", None).await.unwrap();
        store.insert_file("100%text", "percent", None).await.unwrap();

        let hits = store.search_files_by_name("%").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "percent");

        assert!(store.search_files_by_name("zzz").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn count_tracks_inserts() {
        let store = sqlite_store().await;
        assert_eq!(store.count_files().await.unwrap(), 0);
        store.insert_file("text", "one", None).await.unwrap();
        store.insert_file("text", "two", None).await.unwrap();
        assert_eq!(store.count_files().await.unwrap(), 2);
    }
}
