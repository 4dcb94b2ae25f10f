use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::files::dtos::FileRecordDto;
use crate::modules::storage::RowStore;
use crate::shared::constants::TEXT_UPLOAD_NAME;

/// Service for text-file operations over the row store.
pub struct FileService {
    store: Arc<dyn RowStore>,
    attribute_owner: bool,
}

impl FileService {
    pub fn new(store: Arc<dyn RowStore>, attribute_owner: bool) -> Self {
        Self {
            store,
            attribute_owner,
        }
    }

    /// Insert a text upload under the fixed name `"text"`.
    ///
    /// The owner column is populated only when attribution is enabled and a
    /// principal is present.
    pub async fn create_text(&self, text: &str, owner: Option<i64>) -> Result<FileRecordDto> {
        let owner_id = if self.attribute_owner { owner } else { None };
        let record = self
            .store
            .insert_file(TEXT_UPLOAD_NAME, text, owner_id)
            .await?;

        tracing::info!("Text inserted: id={}, owner={:?}", record.id, record.owner_id);
        Ok(record.into())
    }

    /// Every stored file, materialized.
    pub async fn list_all(&self) -> Result<Vec<FileRecordDto>> {
        let records = self.store.list_files().await?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    /// Total number of stored files, from a dedicated count query.
    pub async fn count_all(&self) -> Result<i64> {
        Ok(self.store.count_files().await?)
    }

    /// Case-sensitive substring search over stored names.
    ///
    /// Zero matches is the distinct not-found outcome, not an empty 200.
    pub async fn search_by_name(&self, query: &str) -> Result<Vec<FileRecordDto>> {
        let records = self.store.search_files_by_name(query).await?;
        if records.is_empty() {
            return Err(AppError::NotFound("No files found".to_string()));
        }
        Ok(records.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::sqlite_store;

    #[tokio::test]
    async fn create_then_list_contains_the_record() {
        let service = FileService::new(sqlite_store().await, false);

        let created = service.create_text("hello", None).await.unwrap();
        assert_eq!(created.name, "text");
        assert_eq!(created.content, "hello");
        assert_eq!(created.owner_id, None);

        let all = service.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].content, "hello");
    }

    #[tokio::test]
    async fn empty_text_is_accepted() {
        let service = FileService::new(sqlite_store().await, false);
        let created = service.create_text("", None).await.unwrap();
        assert_eq!(created.content, "");
        assert_eq!(service.count_all().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn count_matches_list_length() {
        let service = FileService::new(sqlite_store().await, false);
        for content in ["one", "two", "three"] {
            service.create_text(content, None).await.unwrap();
        }
        let all = service.list_all().await.unwrap();
        assert_eq!(service.count_all().await.unwrap(), all.len() as i64);
    }

    #[tokio::test]
    async fn owner_is_dropped_unless_attribution_is_enabled() {
        let store = sqlite_store().await;
        let user = store.insert_user("o@example.com", "subject-o").await.unwrap();

        let unattributed = FileService::new(Arc::clone(&store), false);
        let record = unattributed.create_text("a", Some(user.id)).await.unwrap();
        assert_eq!(record.owner_id, None);

        let attributed = FileService::new(store, true);
        let record = attributed.create_text("b", Some(user.id)).await.unwrap();
        assert_eq!(record.owner_id, Some(user.id));
    }

    #[tokio::test]
    async fn search_matches_substrings_of_stored_names() {
        let store = sqlite_store().await;
        store.insert_file("text", "a", None).await.unwrap();
        store.insert_file("context", "b", None).await.unwrap();
        store.insert_file("notes", "c", None).await.unwrap();

        let service = FileService::new(store, false);
        let hits = service.search_by_name("text").await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|f| f.name.contains("text")));
    }

    #[tokio::test]
    async fn search_with_no_match_is_not_found() {
        let service = FileService::new(sqlite_store().await, false);
        service.create_text("hello", None).await.unwrap();

        let err = service.search_by_name("nomatch").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == "No files found"));
    }
}
