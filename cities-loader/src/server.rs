//! Serveur HTTP
//!
//! - `GET /health` : toujours `200 {"status":"ok"}`
//! - `POST /process` : charge l'objet `{"bucket", "key"}` dans la table

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::pipeline::Pipeline;

/// Message d'erreur quand `bucket` ou `key` manque
pub const MISSING_FIELDS: &str = "bucket and key are required";

/// État partagé du serveur
pub struct AppState {
    pub pipeline: Pipeline,
}

/// Réponse de `/health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Réponse de `/process`
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inserted: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessResponse {
    pub fn ok(inserted: usize) -> Self {
        Self {
            status: "ok",
            inserted: Some(inserted),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            status: "error",
            inserted: None,
            error: Some(message),
        }
    }
}

/// Réponse d'une requête invalide
#[derive(Debug, Serialize)]
pub struct BadRequestResponse {
    pub error: &'static str,
}

/// Extrait `bucket` et `key` du corps de la requête
///
/// Corps illisible, champ absent, vide ou non-chaîne : `None`.
pub fn parse_process_request(body: &[u8]) -> Option<(String, String)> {
    let payload: JsonValue = serde_json::from_slice(body).ok()?;
    let field = |name: &str| {
        payload
            .get(name)
            .and_then(JsonValue::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    Some((field("bucket")?, field("key")?))
}

/// GET /health
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// POST /process
async fn process_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let Some((bucket, key)) = parse_process_request(&body) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(BadRequestResponse {
                error: MISSING_FIELDS,
            }),
        )
            .into_response();
    };

    match state.pipeline.process(&bucket, &key).await {
        Ok(report) => {
            info!(
                source = %report.source,
                inserted = report.rows_inserted,
                duration_secs = report.duration_secs,
                "Object processed"
            );
            (StatusCode::OK, Json(ProcessResponse::ok(report.rows_inserted))).into_response()
        }
        Err(e) => {
            error!(
                bucket = %bucket,
                key = %key,
                stage = e.stage(),
                error = ?e,
                "Error processing geojson"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProcessResponse::error(e.to_string())),
            )
                .into_response()
        }
    }
}

/// Construit le routeur HTTP
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/process", post(process_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Démarre le serveur HTTP (arrêt propre sur Ctrl-C)
pub async fn start_server(pipeline: Pipeline, config: &ServerConfig) -> anyhow::Result<()> {
    let app = build_router(Arc::new(AppState { pipeline }));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(addr = %addr, "Starting cities-loader HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_process_request() {
        assert_eq!(
            parse_process_request(br#"{"bucket":"b","key":"k"}"#),
            Some(("b".to_string(), "k".to_string()))
        );
        assert_eq!(parse_process_request(br#"{"bucket":"b"}"#), None);
        assert_eq!(parse_process_request(br#"{"key":"k"}"#), None);
        assert_eq!(parse_process_request(br#"{"bucket":"","key":"k"}"#), None);
        assert_eq!(parse_process_request(br#"{"bucket":1,"key":"k"}"#), None);
        assert_eq!(parse_process_request(b""), None);
        assert_eq!(parse_process_request(b"not json"), None);
        assert_eq!(parse_process_request(b"[]"), None);
    }

    #[test]
    fn test_process_response_serialization() {
        let ok = serde_json::to_value(ProcessResponse::ok(3)).unwrap();
        assert_eq!(ok, serde_json::json!({"status": "ok", "inserted": 3}));

        let err = serde_json::to_value(ProcessResponse::error("boom".into())).unwrap();
        assert_eq!(err, serde_json::json!({"status": "error", "error": "boom"}));
    }
}
