//! API routes for chatd, all under `/chat`

use crate::error::ApiError;
use crate::server::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chat_common::{
    AddFaqRequest, ChatRequest, ChatResponse, FaqListResponse, HealthResponse, LogsResponse,
    MessageResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

type AppStateArc = Arc<AppState>;

/// Logs returned when `limit` is not given
pub const DEFAULT_LOG_LIMIT: usize = 10;

// ============================================================================
// Chat Routes
// ============================================================================

pub fn chat_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/chat", post(chat))
        .route("/chat/", post(chat))
        .route("/chat/health", get(health_check))
}

async fn chat(
    State(state): State<AppStateArc>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = payload?;
    let response = state.orchestrator.answer(&req.message).await?;
    Ok(Json(response))
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "Chat service is running".to_string(),
    })
}

// ============================================================================
// FAQ Routes
// ============================================================================

pub fn faq_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/chat/faqs", get(list_faqs).post(add_faq))
        .route("/chat/faqs/reload", post(reload_faqs))
}

async fn list_faqs(State(state): State<AppStateArc>) -> Json<FaqListResponse> {
    let faqs = state.faq.list_all();
    Json(FaqListResponse {
        count: faqs.len(),
        faqs,
    })
}

fn required(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.trim().is_empty())
}

async fn add_faq(
    State(state): State<AppStateArc>,
    payload: Result<Json<AddFaqRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = payload?;

    let (Some(question), Some(answer)) = (required(req.question), required(req.answer)) else {
        return Err(ApiError::BadRequest(
            "Question and answer are required".to_string(),
        ));
    };

    let faq = state.faq.clone();
    let added = tokio::task::spawn_blocking(move || faq.add(&question, &answer)).await?;
    if !added {
        return Err(ApiError::PersistFailed);
    }

    Ok(Json(MessageResponse {
        message: "FAQ added successfully".to_string(),
        count: None,
    }))
}

async fn reload_faqs(State(state): State<AppStateArc>) -> Result<Json<MessageResponse>, ApiError> {
    let faq = state.faq.clone();
    let count = tokio::task::spawn_blocking(move || {
        faq.reload();
        faq.len()
    })
    .await?;
    info!("Reloaded {} FAQs", count);

    Ok(Json(MessageResponse {
        message: "FAQs reloaded".to_string(),
        count: Some(count),
    }))
}

// ============================================================================
// Fallback Log Routes
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<usize>,
}

pub fn log_routes() -> Router<AppStateArc> {
    Router::new().route("/chat/logs", get(fallback_logs))
}

async fn fallback_logs(
    State(state): State<AppStateArc>,
    query: Result<Query<LogsQuery>, QueryRejection>,
) -> Result<Json<LogsResponse>, ApiError> {
    let Query(query) = query?;
    let logs = state
        .fallback
        .get_logs(query.limit.unwrap_or(DEFAULT_LOG_LIMIT));
    Ok(Json(LogsResponse {
        count: logs.len(),
        logs,
    }))
}
