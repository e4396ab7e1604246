//! REST API Server for the Financial Graph Agent
//!
//! Exposes single-shot translation, multi-hop retrieval, and entity
//! extraction over HTTP.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::agent::MultiHopAgent;
use crate::extraction::EntityExtractor;
use crate::graph::GraphQueryPort;
use crate::translator::CypherTranslator;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct MultiHopRequest {
    pub question: String,
    pub max_hops: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub text: String,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<MultiHopAgent>,
    pub translator: Arc<CypherTranslator>,
    pub extractor: Arc<EntityExtractor>,
    pub graph: Arc<dyn GraphQueryPort>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Single-shot Query Endpoint
/// =============================

async fn run_query(
    State(state): State<ApiState>,
    Json(req): Json<QueryRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    info!("Received single-shot query: {}", req.question);

    let translation = state.translator.translate(&req.question).await;
    if let Some(err) = &translation.error {
        return (
            StatusCode::BAD_GATEWAY,
            Json(ApiResponse::error(format!(
                "Cypher generation failed: {}",
                err
            ))),
        );
    }

    match state.graph.execute(&translation.cypher_query).await {
        Ok(results) => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({
                "cypher_query": translation.cypher_query,
                "reasoning": translation.reasoning,
                "query_kind": translation.query_kind,
                "time_context": translation.time_context,
                "execution_time": translation.execution_time,
                "nodes": results.entities,
                "edges": results.relationships,
            }))),
        ),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(ApiResponse::error(format!("Graph query failed: {}", e))),
        ),
    }
}

/// =============================
/// Multi-hop Endpoint
/// =============================

async fn run_multi_hop(
    State(state): State<ApiState>,
    Json(req): Json<MultiHopRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    info!("Received multi-hop request: {}", req.question);

    // The agent always hands back a structured result; failures ride
    // inside it rather than as an HTTP error.
    let result = state.agent.run(&req.question, req.max_hops).await;
    (StatusCode::OK, Json(ApiResponse::success(result)))
}

/// =============================
/// Extraction Endpoint
/// =============================

async fn run_extraction(
    State(state): State<ApiState>,
    Json(req): Json<ExtractRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    info!("Received extraction request ({} chars)", req.text.len());

    match state.extractor.extract(&req.text).await {
        Ok(records) => (StatusCode::OK, Json(ApiResponse::success(records))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(format!("Extraction failed: {}", e))),
        ),
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/query", post(run_query))
        .route("/api/multi-hop", post(run_multi_hop))
        .route("/api/extract", post(run_extraction))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    state: ApiState,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
