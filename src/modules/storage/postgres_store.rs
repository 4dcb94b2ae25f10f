use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::features::auth::model::User;
use crate::features::files::models::FileRecord;

use super::row_store::{bounded, RowStore, StoreError};

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id BIGSERIAL PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    provider_id TEXT NOT NULL UNIQUE
)
"#;

const CREATE_FILES: &str = r#"
CREATE TABLE IF NOT EXISTS files (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    content TEXT NOT NULL,
    owner_id BIGINT REFERENCES users(id)
)
"#;

/// Row store over PostgreSQL.
pub struct PostgresStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PostgresStore {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }
}

#[async_trait]
impl RowStore for PostgresStore {
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
                "SELECT id, email, provider_id FROM users WHERE provider_id = $1",
            )
            .bind(provider_id)
            .fetch_optional(&self.pool),
        )
        .await
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        bounded(
            self.query_timeout,
            sqlx::query_as::<_, User>("SELECT id, email, provider_id FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn insert_user(&self, email: &str, provider_id: &str) -> Result<User, StoreError> {
        bounded(
            self.query_timeout,
            sqlx::query_as::<_, User>(
                "INSERT INTO users (email, provider_id) VALUES ($1, $2) \
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
                "INSERT INTO files (name, content, owner_id) VALUES ($1, $2, $3) \
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
        // strpos() keeps the match case-sensitive and treats the query as a
        // literal substring, not a LIKE pattern.
        bounded(
            self.query_timeout,
            sqlx::query_as::<_, FileRecord>(
                "SELECT id, name, content, owner_id FROM files \
                 WHERE strpos(name, $1) > 0 ORDER BY id",
            )
            .bind(query)
            .fetch_all(&self.pool),
        )
        .await
    }
}
