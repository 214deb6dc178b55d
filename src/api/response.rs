use serde::Serialize;
use axum::Json;
use axum::http::StatusCode;
use chrono::Utc;

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: Option<T>,
    pub meta: ResponseMeta,
}

#[derive(Serialize)]
pub struct ResponseMeta {
    pub status_code: u16,
    pub timestamp: String,
}

pub fn with_status<T: Serialize>(
    status: StatusCode,
    message: Option<&str>,
    data: T,
) -> (StatusCode, Json<ApiResponse<T>>) {
    let meta = ResponseMeta {
        status_code: status.as_u16(),
        timestamp: Utc::now().to_rfc3339(),
    };

    (
        status,
        Json(ApiResponse {
            success: true,
            message: message.map(str::to_string),
            data: Some(data),
            meta,
        }),
    )
}

pub fn success<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    with_status(StatusCode::OK, None, data)
}

pub fn success_with<T: Serialize>(message: &str, data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    with_status(StatusCode::OK, Some(message), data)
}

pub fn created<T: Serialize>(message: &str, data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    with_status(StatusCode::CREATED, Some(message), data)
}
