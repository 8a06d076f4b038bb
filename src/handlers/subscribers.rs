use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::Value;

use crate::database::models::Subscriber;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{SubscriberInput, SubscriberService};
use crate::state::AppState;

/// POST /api/subscribers - Newsletter signup; duplicate addresses are 409
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<SubscriberInput>, JsonRejection>,
) -> ApiResult<Subscriber> {
    let Json(input) = body?;
    let subscriber = SubscriberService::new(&state).create(input).await?;
    Ok(ApiResponse::created(subscriber))
}

/// GET /api/subscribers
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Subscriber>> {
    let subscribers = SubscriberService::new(&state).list().await?;
    Ok(ApiResponse::success(subscribers))
}

/// GET /api/subscribers/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Subscriber> {
    let subscriber = SubscriberService::new(&state).get(&id).await?;
    Ok(ApiResponse::success(subscriber))
}

/// PUT /api/subscribers/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<SubscriberInput>, JsonRejection>,
) -> ApiResult<Subscriber> {
    let Json(input) = body?;
    let subscriber = SubscriberService::new(&state).update(&id, input).await?;
    Ok(ApiResponse::success(subscriber))
}

/// DELETE /api/subscribers/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    SubscriberService::new(&state).delete(&id).await?;
    Ok(ApiResponse::message("Subscriber deleted"))
}
