use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::model::CurrentUser;
use crate::features::files::dtos::{
    CreateTextDto, FileCountResponseDto, FileListResponseDto, SearchQueryDto, UploadResponseDto,
};
use crate::features::files::services::FileService;

/// Upload a text file
#[utoipa::path(
    post,
    path = "/text",
    tag = "files",
    request_body = CreateTextDto,
    responses(
        (status = 200, description = "Text inserted successfully", body = UploadResponseDto),
        (status = 400, description = "Validation failure"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn create_text(
    State(service): State<Arc<FileService>>,
    user: CurrentUser,
    AppJson(dto): AppJson<CreateTextDto>,
) -> Result<Json<UploadResponseDto>> {
    let text = dto.into_text()?;
    service.create_text(&text, user.id()).await?;

    Ok(Json(UploadResponseDto {
        message: "Text inserted successfully".to_string(),
    }))
}

/// Get all text files
#[utoipa::path(
    get,
    path = "/text/all",
    tag = "files",
    responses(
        (status = 200, description = "Every stored file", body = FileListResponseDto),
        (status = 500, description = "Store failure")
    )
)]
pub async fn list_all(
    State(service): State<Arc<FileService>>,
) -> Result<Json<FileListResponseDto>> {
    let files = service.list_all().await?;
    Ok(Json(FileListResponseDto { files }))
}

/// Get the total number of files
#[utoipa::path(
    get,
    path = "/text/count",
    tag = "files",
    responses(
        (status = 200, description = "Total number of stored files", body = FileCountResponseDto),
        (status = 500, description = "Store failure")
    )
)]
pub async fn count_all(
    State(service): State<Arc<FileService>>,
) -> Result<Json<FileCountResponseDto>> {
    let total_files = service.count_all().await?;
    Ok(Json(FileCountResponseDto { total_files }))
}

/// Search files by name
#[utoipa::path(
    get,
    path = "/text/search",
    tag = "files",
    params(SearchQueryDto),
    responses(
        (status = 200, description = "Matching files", body = FileListResponseDto),
        (status = 400, description = "Missing or empty name"),
        (status = 404, description = "No files found"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn search_files(
    State(service): State<Arc<FileService>>,
    Query(query): Query<SearchQueryDto>,
) -> Result<Json<FileListResponseDto>> {
    query.validate()?;

    let files = service.search_by_name(&query.name).await?;
    Ok(Json(FileListResponseDto { files }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use crate::shared::test_helpers::{files_app, sqlite_store, with_session_user};

    #[tokio::test]
    async fn upload_then_list_round_trips() {
        let server = TestServer::new(files_app(sqlite_store().await, false)).unwrap();

        let res = server.post("/text").json(&json!({ "text": "hello" })).await;
        res.assert_status_ok();
        res.assert_json(&json!({ "message": "Text inserted successfully" }));

        let res = server.get("/text/all").await;
        res.assert_status_ok();
        let body: Value = res.json();
        let files = body["files"].as_array().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0]["name"], "text");
        assert_eq!(files[0]["content"], "hello");
        assert_eq!(files[0]["ownerId"], Value::Null);
    }

    #[tokio::test]
    async fn non_string_text_is_rejected_with_field_errors() {
        let server = TestServer::new(files_app(sqlite_store().await, false)).unwrap();

        let res = server.post("/text").json(&json!({ "text": 5 })).await;
        res.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = res.json();
        let errors = body["errors"].as_array().unwrap();
        assert!(!errors.is_empty());

        // The failed upload must not insert anything.
        let res = server.get("/text/count").await;
        res.assert_json(&json!({ "totalFiles": 0 }));
    }

    #[tokio::test]
    async fn missing_text_is_rejected() {
        let server = TestServer::new(files_app(sqlite_store().await, false)).unwrap();

        let res = server.post("/text").json(&json!({})).await;
        res.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = res.json();
        assert!(!body["errors"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn count_reports_the_total() {
        let server = TestServer::new(files_app(sqlite_store().await, false)).unwrap();

        for content in ["one", "two"] {
            server
                .post("/text")
                .json(&json!({ "text": content }))
                .await
                .assert_status_ok();
        }

        let res = server.get("/text/count").await;
        res.assert_status_ok();
        res.assert_json(&json!({ "totalFiles": 2 }));
    }

    #[tokio::test]
    async fn search_finds_substring_matches() {
        let server = TestServer::new(files_app(sqlite_store().await, false)).unwrap();
        server
            .post("/text")
            .json(&json!({ "text": "hello" }))
            .await
            .assert_status_ok();

        // Uploads are stored under the fixed name "text"; "ex" is a substring.
        let res = server.get("/text/search").add_query_param("name", "ex").await;
        res.assert_status_ok();
        let body: Value = res.json();
        assert_eq!(body["files"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn search_with_no_match_is_a_404() {
        let server = TestServer::new(files_app(sqlite_store().await, false)).unwrap();

        let res = server
            .get("/text/search")
            .add_query_param("name", "nomatch")
            .await;
        res.assert_status(StatusCode::NOT_FOUND);
        res.assert_json(&json!({ "message": "No files found" }));
    }

    #[tokio::test]
    async fn search_without_a_name_is_rejected() {
        let server = TestServer::new(files_app(sqlite_store().await, false)).unwrap();

        let res = server.get("/text/search").await;
        res.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn root_reports_online() {
        let server = TestServer::new(files_app(sqlite_store().await, false)).unwrap();

        let res = server.get("/").await;
        res.assert_status_ok();
        res.assert_text("Server is online");
    }

    #[tokio::test]
    async fn attributed_upload_records_the_session_owner() {
        let store = sqlite_store().await;
        let user = store.insert_user("me@example.com", "subject-me").await.unwrap();

        let app = with_session_user(files_app(Arc::clone(&store), true), user.clone());
        let server = TestServer::new(app).unwrap();

        server
            .post("/text")
            .json(&json!({ "text": "mine" }))
            .await
            .assert_status_ok();

        let files = store.list_files().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].owner_id, Some(user.id));
    }
}
