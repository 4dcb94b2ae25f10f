use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::core::error::{AppError, FieldError};
use crate::features::files::models::FileRecord;

/// Upload request body.
///
/// `text` is kept loosely typed so a wrong type is reported as a field-level
/// validation failure rather than a body parse error.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTextDto {
    #[schema(value_type = Option<String>, example = "hello")]
    pub text: Option<serde_json::Value>,
}

impl CreateTextDto {
    /// The upload contract: `text` must be present and be a string. The
    /// empty string is accepted.
    pub fn into_text(self) -> Result<String, AppError> {
        match self.text {
            Some(serde_json::Value::String(text)) => Ok(text),
            Some(_) => Err(AppError::Validation(vec![FieldError::new(
                "text",
                "Text must be a string",
            )])),
            None => Err(AppError::Validation(vec![FieldError::new(
                "text",
                "Text is required",
            )])),
        }
    }
}

/// Wire representation of a stored file.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileRecordDto {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub owner_id: Option<i64>,
}

impl From<FileRecord> for FileRecordDto {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            content: record.content,
            owner_id: record.owner_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponseDto {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FileListResponseDto {
    pub files: Vec<FileRecordDto>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileCountResponseDto {
    pub total_files: i64,
}

/// Query parameters for name search.
#[derive(Debug, Deserialize, Validate, IntoParams)]
pub struct SearchQueryDto {
    /// Substring to match against stored names (case-sensitive).
    #[serde(default)]
    #[validate(length(min = 1, message = "Search name must not be empty"))]
    pub name: String,
}
