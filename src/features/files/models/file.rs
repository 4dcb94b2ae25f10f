use sqlx::FromRow;

/// Database model for stored text files.
#[derive(Debug, Clone, FromRow)]
pub struct FileRecord {
    pub id: i64,
    pub name: String,
    pub content: String,
    /// Weak reference to `users.id`; absent when uploads are unattributed.
    pub owner_id: Option<i64>,
}
