use axum::{
    routing::get,
    routing::post,
    Router,
    extract::{Json, Path, Query, State},
    extract::rejection::JsonRejection,
    middleware::from_fn_with_state,
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::middleware::{cors_layer, rate_limit, request_timeout};
use crate::api::models::{
    parse_id, AdHocSummary, CaptureCreated, CaptureList, CaptureListItem, CaptureRequest,
    DeletedCapture, ListQuery, SummarizeRequest, SummaryResponse,
};
use crate::api::response;
use crate::error::{AppError, Result};
use crate::summary::{decide, CacheDecision};
use crate::text::char_count;
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    let api = Router::new()
        .route("/capture", post(capture_handler))
        .route("/captures", get(list_handler))
        .route("/capture/:id", get(get_handler).delete(delete_handler))
        .route("/summarize/:id", get(summarize_capture_handler))
        .route("/summarize", post(summarize_content_handler))
        .layer(from_fn_with_state(app_state.clone(), rate_limit));

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .nest("/api", api)
        .fallback(not_found_handler)
        .layer(from_fn_with_state(app_state.clone(), request_timeout))
        .layer(cors_layer(app_state.config.allowed_origins.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::invalid("body", rejection.body_text()))
}

async fn capture_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CaptureRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let capture = body(payload)?.validate()?;
    let page = state.store.create(capture).await?;

    info!(
        id = %page.id,
        url = %page.url,
        word_count = page.word_count,
        timestamp = %page.captured_at,
        "captured content"
    );
    Ok(response::created("Content captured successfully", CaptureCreated::from(&page)))
}

async fn list_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let limit = state.config.recent_limit;
    let pages = match query.url.as_deref().map(str::trim) {
        Some(pattern) if !pattern.is_empty() => state.store.find_by_url(pattern, limit).await?,
        _ => state.store.find_recent(limit).await?,
    };

    let captures: Vec<CaptureListItem> = pages.into_iter().map(CaptureListItem::from).collect();
    Ok(response::success(CaptureList {
        count: captures.len(),
        captures,
    }))
}

async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id)?;
    let page = state
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(capture_not_found)?;
    Ok(response::success(page))
}

async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id)?;
    let page = state.store.delete(id).await?.ok_or_else(capture_not_found)?;

    info!(id = %page.id, url = %page.url, "deleted capture");
    Ok(response::success_with(
        "Capture deleted successfully",
        DeletedCapture {
            id: page.id,
            url: page.url,
            title: page.title,
        },
    ))
}

async fn summarize_capture_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id)?;
    let page = state
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(capture_not_found)?;

    if page.content.trim().is_empty() {
        return Err(AppError::invalid("content", "No content available for summarization"));
    }

    if decide(&page, Utc::now()) == CacheDecision::Reuse {
        info!(id = %page.id, "using cached summary");
        return Ok(response::success_with(
            "Using cached summary",
            SummaryResponse::from_page(page, true),
        ));
    }

    info!(id = %page.id, url = %page.url, "generating summary");
    let summary = state
        .summarizer
        .generate_summary(&page.content, &page.url, &page.title)
        .await;
    if let Some(reason) = &summary.error {
        warn!(id = %page.id, reason = %reason, "storing degraded summary");
    }

    // The response is built from the stored record so both always agree.
    let updated = state
        .store
        .update_summary(page.id, summary, Utc::now())
        .await?
        .ok_or_else(capture_not_found)?;

    Ok(response::success_with(
        "Summary generated successfully",
        SummaryResponse::from_page(updated, false),
    ))
}

async fn summarize_content_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let request = body(payload)?.validate()?;

    info!(chars = char_count(&request.content), "generating summary for custom content");
    let summary = state
        .summarizer
        .generate_summary(&request.content, &request.url, &request.title)
        .await;

    Ok(response::success_with(
        "Summary generated successfully",
        AdHocSummary {
            summary,
            generated_at: Utc::now(),
        },
    ))
}

async fn health_handler() -> impl IntoResponse {
    axum::Json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339(),
        "service": "page-digest",
    }))
}

async fn index_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(json!({
        "message": "page-digest API",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.summarizer.model(),
        "endpoints": {
            "health": "/health",
            "capture": "/api/capture",
            "captures": "/api/captures",
            "summarize": "/api/summarize/:id",
        }
    }))
}

async fn not_found_handler(uri: axum::http::Uri) -> AppError {
    AppError::NotFound(format!("Route {} not found", uri.path()))
}

fn capture_not_found() -> AppError {
    AppError::NotFound("Capture not found".to_string())
}
