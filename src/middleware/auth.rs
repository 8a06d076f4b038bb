use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::auth::cookie::read_cookie;
use crate::database::models::Role;
use crate::error::ApiError;
use crate::services::{AuthService, SessionUser};
use crate::state::AppState;

/// Authenticated user context resolved from the session cookie
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
    pub session_id: Uuid,
}

impl From<SessionUser> for AuthUser {
    fn from(session_user: SessionUser) -> Self {
        Self {
            user_id: session_user.user.id,
            username: session_user.user.username,
            role: session_user.user.role,
            session_id: session_user.session.id,
        }
    }
}

/// Extract the session token from the configured cookie
pub fn session_token(state: &AppState, headers: &HeaderMap) -> Option<String> {
    read_cookie(headers, &state.config.session.cookie_name)
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let token = session_token(state, headers);
    let session_user = AuthService::new(state).check(token.as_deref()).await?;
    Ok(AuthUser::from(session_user))
}

/// Session gate: rejects requests without a live session and injects `AuthUser`
pub async fn require_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, &headers).await {
        Ok(auth_user) => {
            tracing::debug!("Session {} accepted for '{}'", auth_user.session_id, auth_user.username);
            request.extensions_mut().insert(auth_user);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
            e.into_response()
        }
    }
}

/// Admin gate: a live session whose user holds the `admin` role
pub async fn require_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_user = match authenticate(&state, &headers).await {
        Ok(auth_user) => auth_user,
        Err(e) => return e.into_response(),
    };

    if auth_user.role != Role::Admin {
        tracing::debug!("User '{}' lacks admin role for {}", auth_user.username, request.uri().path());
        return ApiError::forbidden("Admin role required").into_response();
    }

    request.extensions_mut().insert(auth_user);
    next.run(request).await
}
