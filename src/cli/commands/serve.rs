//! HTTP API server for submitting URLs from other systems.
//!
//! Analyses run in the background; results land in the analysis store.

use crate::analysis::AnalysisService;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Credentials, Settings};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared application state.
struct AppState {
    service: AnalysisService,
}

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    let credentials = Credentials::from_env();
    if let Err(e) = preflight::check(Operation::Serve, &credentials) {
        Output::warning(&format!("{} (requests will fail until this is fixed)", e));
    }

    let service = AnalysisService::from_settings(&settings, &credentials)?;
    let store_name = service
        .store()
        .map(|s| s.backend())
        .unwrap_or("disabled");

    let app = router(service);

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or_else(|| settings.server_port(&credentials));
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Video Fact-Checker API");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    Output::kv("Analysis store", store_name);
    println!();
    println!("Endpoints:");
    Output::kv("Status", "GET  /");
    Output::kv("Health", "GET  /health");
    Output::kv("Analyze", "POST /analyze");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the API router.
pub fn router(service: AnalysisService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .layer(cors)
        .with_state(Arc::new(AppState { service }))
}

#[derive(Deserialize)]
struct AnalyzeRequest {
    url: String,
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Video Fact-Checker API is running",
        "endpoints": {
            "/analyze": "POST - Submit URL for analysis",
            "/health": "GET - Health check"
        }
    }))
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let supabase = state
        .service
        .store()
        .is_some_and(|s| s.backend() == "supabase");

    Json(serde_json::json!({ "status": "healthy", "supabase": supabase }))
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    info!("Received analysis request for: {}", req.url);

    let service = state.service.clone();
    let url = req.url.clone();
    tokio::spawn(async move {
        service.process(&url).await;
    });

    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "status": "accepted",
            "message": "Processing started. Results will be available in the database.",
            "url": req.url
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Pipeline;
    use crate::error::Result;
    use crate::store::{AnalysisStatus, AnalysisStore, MemoryStore};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use std::time::Duration;
    use tower::ServiceExt;

    struct EchoPipeline;

    #[async_trait]
    impl Pipeline for EchoPipeline {
        async fn run(&self, url: &str) -> Result<String> {
            Ok(format!("# Report for {}", url))
        }
    }

    fn app(store: Arc<MemoryStore>) -> Router {
        router(AnalysisService::new(Arc::new(EchoPipeline), Some(store)))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root() {
        let response = app(Arc::new(MemoryStore::new()))
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["message"], "Video Fact-Checker API is running");
        assert!(json["endpoints"]["/analyze"].is_string());
    }

    #[tokio::test]
    async fn test_health_reports_supabase_flag() {
        let response = app(Arc::new(MemoryStore::new()))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json, serde_json::json!({ "status": "healthy", "supabase": false }));
    }

    #[tokio::test]
    async fn test_analyze_accepts_and_processes_in_background() {
        let store = Arc::new(MemoryStore::new());
        let response = app(store.clone())
            .oneshot(
                Request::post("/analyze")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"url": "https://youtu.be/dQw4w9WgXcQ"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let json = body_json(response).await;
        assert_eq!(json["status"], "accepted");
        assert_eq!(json["url"], "https://youtu.be/dQw4w9WgXcQ");

        let mut status = None;
        for _ in 0..50 {
            let records = store.recent(1).await.unwrap();
            status = records.first().map(|r| r.url_status);
            if status == Some(AnalysisStatus::Completed) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(status, Some(AnalysisStatus::Completed));
    }

    #[tokio::test]
    async fn test_analyze_rejects_missing_url() {
        let response = app(Arc::new(MemoryStore::new()))
            .oneshot(
                Request::post("/analyze")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let response = app(Arc::new(MemoryStore::new()))
            .oneshot(
                Request::get("/health")
                    .header("origin", "https://frontend.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }
}
