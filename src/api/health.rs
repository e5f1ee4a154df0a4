//! Health check endpoints for container probes

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use super::state::AppState;
use crate::api::types::Json;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthResponse {
    fn new(status: HealthStatus) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            checks: None,
            latency_ms: None,
        }
    }
}

/// Always 200 while the process is up
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse::new(HealthStatus::Healthy)))
}

pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Backend reachability and knowledge-base size.
///
/// A degraded service still answers chats (with remediation text or without
/// context), so readiness stays 200.
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let checks = vec![
        check_backend(&state).await,
        check_knowledge_base(&state).await,
    ];

    let status = if checks.iter().all(|c| c.status == HealthStatus::Healthy) {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    let response = HealthResponse {
        checks: Some(checks),
        latency_ms: Some(start.elapsed().as_millis() as u64),
        ..HealthResponse::new(status)
    };

    (StatusCode::OK, Json(response))
}

async fn check_backend(state: &AppState) -> HealthCheck {
    let provider = state.chat_engine.provider();
    let name = format!("llm:{}", provider.provider_name());

    if provider.is_available().await {
        HealthCheck {
            name,
            status: HealthStatus::Healthy,
            message: Some(provider.model().to_string()),
        }
    } else {
        HealthCheck {
            name,
            status: HealthStatus::Degraded,
            message: Some("backend unreachable".to_string()),
        }
    }
}

async fn check_knowledge_base(state: &AppState) -> HealthCheck {
    match state.chat_engine.index_size().await {
        Some(documents) if documents > 0 => HealthCheck {
            name: "knowledge_base".to_string(),
            status: HealthStatus::Healthy,
            message: Some(format!("{} documents", documents)),
        },
        _ => HealthCheck {
            name: "knowledge_base".to_string(),
            status: HealthStatus::Degraded,
            message: Some("not loaded, answering without context".to_string()),
        },
    }
}
