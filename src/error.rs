use axum::{
    response::{IntoResponse, Response},
    Json,
    http::StatusCode,
};
use serde::Serialize;
use tracing::error;

#[derive(Serialize)]
pub struct ErrorResponse {
    success: bool,
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<FieldError>,
}

/// A single rejected request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
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

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed: {}", summarize_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    NotFound(String),

    #[error("No content captured: {0}")]
    Extraction(String),

    #[error("Failed to fetch data: {0}")]
    Fetch(String),

    #[error("LLM processing error: {0}")]
    Llm(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Too many requests, please try again later.")]
    RateLimited,

    #[error("Request processing timed out")]
    Timeout,
}

fn summarize_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl AppError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(field, message)])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Fetch(_) => StatusCode::BAD_GATEWAY,
            AppError::Llm(_) | AppError::Storage(_) | AppError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let (error, message, details) = match self {
            AppError::Validation(details) => (
                "Validation Failed",
                summarize_fields(&details),
                details,
            ),
            AppError::NotFound(msg) => ("Not Found", msg, Vec::new()),
            AppError::Extraction(msg) => ("Unprocessable Content", msg, Vec::new()),
            AppError::Fetch(msg) => ("Bad Gateway", msg, Vec::new()),
            // Operational failures stay generic; the detail is in the logs.
            AppError::Llm(_) | AppError::Storage(_) | AppError::Config(_) => (
                "Internal Server Error",
                "The request could not be completed".to_string(),
                Vec::new(),
            ),
            err @ (AppError::RateLimited | AppError::Timeout) => {
                let error = if matches!(err, AppError::RateLimited) {
                    "Too Many Requests"
                } else {
                    "Request Timeout"
                };
                (error, err.to_string(), Vec::new())
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            error: error.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Fetch(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_list_every_field() {
        let err = AppError::Validation(vec![
            FieldError::new("url", "Invalid or missing URL"),
            FieldError::new("content", "Content is too short"),
        ]);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "Validation failed: url: Invalid or missing URL, content: Content is too short"
        );
    }

    #[test]
    fn not_found_is_distinct_from_validation() {
        assert_eq!(
            AppError::NotFound("Capture not found".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::invalid("id", "Invalid ID").status(), StatusCode::BAD_REQUEST);
    }
}
