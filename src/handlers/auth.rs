use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap},
    response::{AppendHeaders, IntoResponse},
    Json,
};
use serde_json::{json, Value};

use crate::auth::cookie::{clear_cookie, session_cookie};
use crate::database::models::{PublicUser, Role};
use crate::error::ApiError;
use crate::middleware::{session_token, ApiResponse, ApiResult};
use crate::services::{AuthService, LoginInput, RegisterInput, Registrar, UserUpdateInput};
use crate::state::AppState;

fn cookie_error(e: header::InvalidHeaderValue) -> ApiError {
    tracing::error!("Failed to build session cookie: {}", e);
    ApiError::internal_server_error("Failed to establish session")
}

/// POST /api/auth/register - Create a user account. Only an admin session
/// may choose the role; everyone else gets `editor`.
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<RegisterInput>, JsonRejection>,
) -> ApiResult<PublicUser> {
    let Json(input) = body?;
    let service = AuthService::new(&state);

    let token = session_token(&state, &headers);
    let registrar = match service.check(token.as_deref()).await {
        Ok(session_user) if session_user.user.role == Role::Admin => Registrar::Admin,
        _ => Registrar::Public,
    };

    let user = service.register(input, registrar).await?;
    Ok(ApiResponse::created(user))
}

/// POST /api/auth/login - Verify credentials and set the session cookie
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = body?;
    let (user, token) = AuthService::new(&state).login(input).await?;
    let cookie = session_cookie(&state.config.session, &token).map_err(cookie_error)?;

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        ApiResponse::success(json!({ "message": "Logged in", "user": user })),
    ))
}

/// POST /api/auth/logout - Close the session and clear the cookie
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = session_token(&state, &headers);
    AuthService::new(&state).logout(token.as_deref()).await?;
    let cookie = clear_cookie(&state.config.session).map_err(cookie_error)?;

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        ApiResponse::message("Logged out"),
    ))
}

/// GET /api/auth/check - Report the logged-in user, 401 otherwise
pub async fn check(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Value> {
    let token = session_token(&state, &headers);
    let session_user = AuthService::new(&state).check(token.as_deref()).await?;
    let user = PublicUser::from(session_user.user);
    Ok(ApiResponse::success(json!({ "authenticated": true, "user": user })))
}

/// GET /api/auth/users - List every user
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<PublicUser>> {
    let users = AuthService::new(&state).list_users().await?;
    Ok(ApiResponse::success(users))
}

/// GET /api/auth/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<PublicUser> {
    let user = AuthService::new(&state).get_user(&id).await?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/auth/users/:id - Change username, password or role
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UserUpdateInput>, JsonRejection>,
) -> ApiResult<PublicUser> {
    let Json(input) = body?;
    let user = AuthService::new(&state).update_user(&id, input).await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /api/auth/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    AuthService::new(&state).delete_user(&id).await?;
    Ok(ApiResponse::message("User deleted"))
}
