use std::collections::HashMap;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::server::MailServer;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub checks: HashMap<String, String>,
}

/// Health check handler; 503 once the dispatcher is not running.
pub async fn health_check(State(server): State<MailServer>) -> (StatusCode, Json<HealthResponse>) {
    let mut checks = HashMap::new();

    let dispatcher_running = server.engine.is_running();
    checks.insert(
        "dispatcher".to_string(),
        if dispatcher_running { "running" } else { "stopped" }.to_string(),
    );

    let nats = match &server.broker {
        Some(broker) if broker.is_connected() => "connected",
        Some(_) => "disconnected",
        None => "disabled",
    };
    checks.insert("nats".to_string(), nats.to_string());

    let (status_code, status) = if dispatcher_running {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    let response = HealthResponse {
        status: status.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks,
    };

    (status_code, Json(response))
}
