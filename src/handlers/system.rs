use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - Service information
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "sitecms-api",
        "version": version,
        "description": "Content API for the business site and its admin dashboard",
        "endpoints": {
            "auth": "/api/auth/{register,login,logout,check} (public), /api/auth/users[/:id] (admin)",
            "clients": "/api/clients[/:id] (reads public, writes need a session)",
            "projects": "/api/projects[/:id] (reads public, writes need a session)",
            "contacts": "/api/contacts[/:id] (POST public, rest needs a session)",
            "subscribers": "/api/subscribers[/:id] (POST public, rest needs a session)",
            "uploads": "/uploads/:file (public)",
            "health": "/health (public)"
        }
    }))
}

/// GET /health - Document store ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
