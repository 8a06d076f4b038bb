use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::Value;

use crate::database::models::Contact;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{ContactInput, ContactService};
use crate::state::AppState;

/// POST /api/contacts - Public contact form
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<ContactInput>, JsonRejection>,
) -> ApiResult<Contact> {
    let Json(input) = body?;
    let contact = ContactService::new(&state).create(input).await?;
    Ok(ApiResponse::created(contact))
}

/// GET /api/contacts
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Contact>> {
    let contacts = ContactService::new(&state).list().await?;
    Ok(ApiResponse::success(contacts))
}

/// GET /api/contacts/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Contact> {
    let contact = ContactService::new(&state).get(&id).await?;
    Ok(ApiResponse::success(contact))
}

/// PUT /api/contacts/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ContactInput>, JsonRejection>,
) -> ApiResult<Contact> {
    let Json(input) = body?;
    let contact = ContactService::new(&state).update(&id, input).await?;
    Ok(ApiResponse::success(contact))
}

/// DELETE /api/contacts/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    ContactService::new(&state).delete(&id).await?;
    Ok(ApiResponse::message("Contact deleted"))
}
