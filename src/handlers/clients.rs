use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::Value;

use crate::database::models::Client;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{ClientInput, ClientService};
use crate::state::AppState;

/// GET /api/clients - All clients in insertion order
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Client>> {
    let clients = ClientService::new(&state).list().await?;
    Ok(ApiResponse::success(clients))
}

/// GET /api/clients/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Client> {
    let client = ClientService::new(&state).get(&id).await?;
    Ok(ApiResponse::success(client))
}

/// POST /api/clients - JSON body; `image` is an inline data URL
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<ClientInput>, JsonRejection>,
) -> ApiResult<Client> {
    let Json(input) = body?;
    let client = ClientService::new(&state).create(input).await?;
    Ok(ApiResponse::created(client))
}

/// PUT /api/clients/:id - Partial update; image replaced only when supplied
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ClientInput>, JsonRejection>,
) -> ApiResult<Client> {
    let Json(input) = body?;
    let client = ClientService::new(&state).update(&id, input).await?;
    Ok(ApiResponse::success(client))
}

/// DELETE /api/clients/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    ClientService::new(&state).delete(&id).await?;
    Ok(ApiResponse::message("Client deleted"))
}
