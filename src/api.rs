//! # API Server Module
//!
//! ## Purpose
//! REST API server exposing the statute retrieval engine to the complaint-intake
//! workflow, plus health and monitoring endpoints.
//!
//! ## Input/Output Specification
//! - **Input**: HTTP requests with narrative text and optional result count
//! - **Output**: JSON responses with ranked statute sections, system status
//! - **Endpoints**: Search, health, stats, corpus reload
//!
//! ## Key Features
//! - Structured error responses (400 for caller errors, 503 while not ready)
//! - Degraded encoding reported as an ordinary empty result list
//! - CORS support for web frontends
//! - Per-request correlation ids in logs

use crate::errors::{Result, SearchError};
use crate::search::RankedResult;
use crate::utils::{TextUtils, Timer};
use actix_cors::Cors;
use actix_web::middleware::Condition;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// API server over the shared application state
pub struct ApiServer {
    app_state: crate::AppState,
}

/// Search request payload
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Raw incident narrative
    pub query: String,
    /// Number of results; server default when omitted
    pub k: Option<usize>,
}

/// Search response payload
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<RankedResult>,
    pub total_results: usize,
    pub query_time_ms: u64,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub corpus_size: usize,
}

impl ApiServer {
    /// Create new API server
    pub fn new(app_state: crate::AppState) -> Self {
        Self { app_state }
    }

    /// Run the API server
    pub async fn run(self) -> Result<()> {
        let bind_addr = format!(
            "{}:{}",
            self.app_state.config.server.host, self.app_state.config.server.port
        );
        let cors_enabled = self.app_state.config.server.enable_cors;

        tracing::info!("Starting API server on {}", bind_addr);

        HttpServer::new(move || {
            App::new()
                .wrap(Condition::new(cors_enabled, Cors::permissive()))
                .app_data(web::Data::new(self.app_state.clone()))
                .route("/search", web::post().to(search_handler))
                .route("/health", web::get().to(health_handler))
                .route("/stats", web::get().to(stats_handler))
                .route("/reload", web::post().to(reload_handler))
        })
        .bind(&bind_addr)
        .map_err(|e| SearchError::Internal {
            message: format!("Failed to bind server to {}: {}", bind_addr, e),
        })?
        .run()
        .await
        .map_err(|e| SearchError::Internal {
            message: format!("Server error: {}", e),
        })?;

        Ok(())
    }
}

/// Search endpoint handler
async fn search_handler(
    app_state: web::Data<crate::AppState>,
    request: web::Json<SearchRequest>,
) -> ActixResult<HttpResponse> {
    let query_id = Uuid::new_v4();
    let timer = Timer::new("search_request");

    tracing::debug!(
        "Search request {}: '{}' (k: {:?})",
        query_id,
        TextUtils::truncate(&request.query, 80),
        request.k
    );

    match app_state.engine.search(&request.query, request.k).await {
        Ok(results) => {
            let query_time_ms = timer.stop();
            let total_results = results.len();
            tracing::info!(
                "Search request {} returned {} results in {}ms",
                query_id,
                total_results,
                query_time_ms
            );

            Ok(HttpResponse::Ok().json(SearchResponse {
                results,
                total_results,
                query_time_ms,
            }))
        }
        Err(e @ SearchError::InvalidQuery { .. }) => {
            Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Invalid query",
                "message": e.to_string(),
            })))
        }
        Err(e @ SearchError::NotReady { .. }) => {
            Ok(HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "error": "Service not ready",
                "message": e.to_string(),
            })))
        }
        Err(e) => {
            tracing::error!(
                "Search request {} failed ({}): {}",
                query_id,
                e.category(),
                e
            );
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Search failed",
                "message": e.to_string(),
            })))
        }
    }
}

/// Health check endpoint handler
async fn health_handler(app_state: web::Data<crate::AppState>) -> ActixResult<HttpResponse> {
    let stats = app_state.engine.stats();
    let status = if stats.ready { "ready" } else { "not_ready" };

    let response = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        corpus_size: stats.corpus_size,
    };

    if stats.ready {
        Ok(HttpResponse::Ok().json(response))
    } else {
        Ok(HttpResponse::ServiceUnavailable().json(response))
    }
}

/// Statistics endpoint handler
async fn stats_handler(app_state: web::Data<crate::AppState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(app_state.engine.stats()))
}

/// Corpus reload endpoint handler: re-load the artifact from disk and swap
/// the active pairing
async fn reload_handler(app_state: web::Data<crate::AppState>) -> ActixResult<HttpResponse> {
    let artifact_path = &app_state.config.corpus.artifact_path;
    tracing::info!("Reload requested from {:?}", artifact_path);

    match app_state.engine.load_artifact(artifact_path) {
        Ok(()) => {
            let stats = app_state.engine.stats();
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "status": "reloaded",
                "corpus_size": stats.corpus_size,
            })))
        }
        Err(e) => {
            tracing::error!("Reload failed ({}): {}", e.category(), e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Reload failed",
                "message": e.to_string(),
            })))
        }
    }
}
