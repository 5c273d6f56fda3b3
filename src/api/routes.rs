//! HTTP routes
//!
//! - `GET /sentiment/:symbol` (also under `/api/v1`)
//! - `GET /api/v1/health`
//! - `GET /api/v1/trending`
//! - `GET /api/v1/history/:symbol?limit=N`

use super::response::{ApiError, SentimentResponse};
use super::state::AppState;
use crate::aggregator::{trending, TrendingEntry};
use crate::history::SentimentRecord;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, Method};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

const DEFAULT_HISTORY_LIMIT: usize = 20;
const MAX_SYMBOL_LEN: usize = 20;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub sources: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TrendingResponse {
    pub trending: Vec<TrendingEntry>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub symbol: String,
    pub records: Vec<SentimentRecord>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/health", get(health_check))
        .route("/sentiment/:symbol", get(get_sentiment))
        .route("/trending", get(get_trending))
        .route("/history/:symbol", get(get_history));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/sentiment/:symbol", get(get_sentiment))
        .nest("/api/v1", api)
        .layer(cors)
        .with_state(state)
}

/// Symbols are 1-20 ASCII letters or digits; they end up in upstream URLs
fn clean_symbol(raw: &str) -> Result<String, ApiError> {
    let symbol = raw.trim();
    if symbol.is_empty()
        || symbol.len() > MAX_SYMBOL_LEN
        || !symbol.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(ApiError::BadRequest(format!("Invalid symbol: '{}'", raw)));
    }
    Ok(symbol.to_string())
}

fn path_symbol(path: Result<Path<String>, PathRejection>) -> Result<String, ApiError> {
    let Path(raw) = path.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    clean_symbol(&raw)
}

/// GET /api/v1/health
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        sources: state.enabled_list(),
        timestamp: Utc::now(),
    })
}

/// GET /sentiment/:symbol
async fn get_sentiment(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<SentimentResponse>, ApiError> {
    let symbol = path_symbol(path)?;
    log::debug!("Sentiment requested for {}", symbol);

    let result = state
        .aggregator
        .aggregate(&symbol, &state.enabled_sources)
        .await?;

    if let Some(history) = &state.history {
        if let Err(e) = history.record(&result).await {
            log::warn!("⚠️  Failed to record sentiment history for {}: {}", symbol, e);
        }
    }

    Ok(Json(SentimentResponse::from(&result)))
}

/// GET /api/v1/trending
async fn get_trending(State(state): State<Arc<AppState>>) -> Json<TrendingResponse> {
    let entries = trending(
        &state.aggregator,
        &state.trending_symbols,
        &state.enabled_sources,
    )
    .await;

    Json(TrendingResponse {
        trending: entries,
        timestamp: Utc::now(),
    })
}

/// GET /api/v1/history/:symbol
async fn get_history(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let symbol = path_symbol(path)?;
    let Query(params) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let history = state.history.as_ref().ok_or(ApiError::HistoryDisabled)?;

    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let records = history.recent(&symbol, limit).await?;

    Ok(Json(HistoryResponse { symbol, records }))
}
