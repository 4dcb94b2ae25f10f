use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::modules::storage::StoreError;
use crate::shared::constants::LOGIN_FAILURE_PATH;

/// A single field-level validation failure.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// The identity provider denied or failed the handshake.
    #[error("upstream auth error: {0}")]
    UpstreamAuth(String),

    /// The row store was unreachable while resolving an identity.
    #[error("identity backend error: {0}")]
    IdentityBackend(String),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter()
                    .map(|err| {
                        let message = err
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("{} is invalid", field));
                        FieldError::new(field.to_string(), message)
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        AppError::Validation(fields)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "errors": errors })),
            )
                .into_response(),
            AppError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "message": message })),
            )
                .into_response(),
            AppError::Storage(ref err) => {
                tracing::error!("Row store failure: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": err.to_string() })),
                )
                    .into_response()
            }
            // The sign-in flow is browser-facing: failures land on the login
            // page, never a JSON error body.
            AppError::UpstreamAuth(ref reason) => {
                tracing::warn!("Sign-in rejected upstream: {}", reason);
                redirect_found(LOGIN_FAILURE_PATH)
            }
            AppError::IdentityBackend(ref reason) => {
                tracing::error!("Row store unreachable during sign-in: {}", reason);
                redirect_found(LOGIN_FAILURE_PATH)
            }
        }
    }
}

/// A literal `302 Found`. axum's `Redirect::to` answers 303, which is not the
/// documented contract of this flow.
pub fn redirect_found(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}

pub type Result<T> = std::result::Result<T, AppError>;
