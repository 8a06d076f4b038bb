use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::password::{
    hash_password, validate_password_strength, verify_dummy_password, verify_password,
};
use crate::auth::{sign_session, verify_session, SessionClaims};
use crate::config::AppConfig;
use crate::database::models::{NewSession, NewUser, PublicUser, Role, Session, User, UserPatch};
use crate::database::{DatabaseError, DocumentStore, Repository};
use crate::error::ApiError;
use crate::state::AppState;

use super::validation::{parse_id, FieldCheck};

const BAD_CREDENTIALS: &str = "Invalid username or password";
const NOT_AUTHENTICATED: &str = "Not authenticated";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterInput {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginInput {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdateInput {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Who is asking for a new account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registrar {
    /// No admin session; the account is always created as `editor`
    Public,
    /// An admin session or the CLI; the requested role is honoured
    Admin,
}

/// A user with a live session behind the presented cookie
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user: User,
    pub session: Session,
}

pub struct AuthService {
    users: Repository<User>,
    sessions: Repository<Session>,
    config: Arc<AppConfig>,
}

fn username_taken(err: DatabaseError) -> ApiError {
    match err {
        DatabaseError::Conflict(_) => ApiError::conflict("Username is already taken"),
        other => other.into(),
    }
}

fn parse_role(check: &mut FieldCheck, value: Option<String>) -> Option<Role> {
    let value = value?;
    match value.parse::<Role>() {
        Ok(role) => Some(role),
        Err(_) => {
            check.reject("role", "must be 'admin' or 'editor'");
            None
        }
    }
}

impl AuthService {
    pub fn new(state: &AppState) -> Self {
        Self::with_store(state.store.clone(), state.config.clone())
    }

    /// Construct without the rest of the app state, as the CLI does
    pub fn with_store(store: Arc<dyn DocumentStore>, config: Arc<AppConfig>) -> Self {
        Self {
            users: Repository::new(store.clone()),
            sessions: Repository::new(store),
            config,
        }
    }

    fn check_password(&self, check: &mut FieldCheck, password: &str) {
        if let Err(problem) =
            validate_password_strength(password, self.config.security.min_password_length)
        {
            check.reject("password", problem);
        }
    }

    pub async fn register(
        &self,
        input: RegisterInput,
        registrar: Registrar,
    ) -> Result<PublicUser, ApiError> {
        let mut check = FieldCheck::new();
        let username = check.required("username", input.username);
        let password = match input.password.filter(|p| !p.is_empty()) {
            Some(password) => {
                self.check_password(&mut check, &password);
                password
            }
            None => {
                check.reject("password", "is required");
                String::new()
            }
        };
        let role = match registrar {
            Registrar::Admin => parse_role(&mut check, input.role).unwrap_or_default(),
            Registrar::Public => {
                if input.role.is_some() {
                    tracing::debug!("Ignoring role requested by public registration");
                }
                Role::Editor
            }
        };
        check.finish()?;

        if self.users.select_by("username", &username).await?.is_some() {
            return Err(ApiError::conflict("Username is already taken"));
        }

        let new_user = NewUser {
            username,
            password_hash: hash_password(&password)?,
            role,
        };
        let user = self.users.create(&new_user).await.map_err(username_taken)?;
        tracing::info!("Registered user {} ({}) with role {}", user.username, user.id, user.role);
        Ok(user.into())
    }

    /// Verify credentials and open a session. Returns the user and the signed
    /// token to place in the session cookie.
    pub async fn login(&self, input: LoginInput) -> Result<(PublicUser, String), ApiError> {
        let mut check = FieldCheck::new();
        let username = check.required("username", input.username);
        let password = input.password.unwrap_or_default();
        if password.is_empty() {
            check.reject("password", "is required");
        }
        check.finish()?;

        let Some(user) = self.users.select_by("username", &username).await? else {
            verify_dummy_password(&password);
            tracing::warn!("Login failed for unknown user '{}'", username);
            return Err(ApiError::unauthorized(BAD_CREDENTIALS));
        };

        if !verify_password(&password, &user.password_hash)? {
            tracing::warn!("Login failed for user '{}': wrong password", username);
            return Err(ApiError::unauthorized(BAD_CREDENTIALS));
        }

        if let Err(e) = self.purge_expired_sessions().await {
            tracing::warn!("Failed to purge expired sessions: {}", e);
        }

        let session = self
            .sessions
            .create(&NewSession {
                user_id: user.id,
                expires_at: Utc::now() + self.config.session.ttl(),
            })
            .await?;

        let claims = SessionClaims::new(session.id, user.id, session.expires_at);
        let token = sign_session(&claims, &self.config.session.secret)?;

        tracing::info!("User '{}' logged in", user.username);
        Ok((user.into(), token))
    }

    /// Resolve a session token to its user. Every failure is `Unauthenticated`.
    pub async fn check(&self, token: Option<&str>) -> Result<SessionUser, ApiError> {
        let token = token.ok_or_else(|| ApiError::unauthenticated(NOT_AUTHENTICATED))?;
        let claims = verify_session(token, &self.config.session.secret)?;

        let session = self
            .sessions
            .select_one(claims.sid)
            .await?
            .filter(|s| s.user_id == claims.sub)
            .ok_or_else(|| ApiError::unauthenticated(NOT_AUTHENTICATED))?;

        if session.is_expired(Utc::now()) {
            if let Err(e) = self.sessions.delete_404(session.id).await {
                tracing::debug!("Expired session {} already gone: {}", session.id, e);
            }
            return Err(ApiError::unauthenticated("Session expired"));
        }

        let user = self
            .users
            .select_one(session.user_id)
            .await?
            .ok_or_else(|| ApiError::unauthenticated(NOT_AUTHENTICATED))?;

        Ok(SessionUser { user, session })
    }

    /// Delete every session past its expiry. Returns how many were removed.
    pub async fn purge_expired_sessions(&self) -> Result<usize, ApiError> {
        let now = Utc::now();
        let mut purged = 0;
        for session in self.sessions.select_all().await? {
            if !session.is_expired(now) {
                continue;
            }
            match self.sessions.delete_404(session.id).await {
                Ok(()) => purged += 1,
                Err(DatabaseError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        if purged > 0 {
            tracing::info!("Purged {} expired sessions", purged);
        }
        Ok(purged)
    }

    /// Drop the server-side session if the token names one. Idempotent.
    pub async fn logout(&self, token: Option<&str>) -> Result<(), ApiError> {
        let Some(token) = token else {
            return Ok(());
        };
        let Ok(claims) = verify_session(token, &self.config.session.secret) else {
            return Ok(());
        };
        match self.sessions.delete_404(claims.sid).await {
            Ok(()) => {
                tracing::info!("Session {} closed", claims.sid);
                Ok(())
            }
            Err(DatabaseError::NotFound(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_users(&self) -> Result<Vec<PublicUser>, ApiError> {
        let users = self.users.select_all().await?;
        Ok(users.into_iter().map(PublicUser::from).collect())
    }

    pub async fn get_user(&self, id: &str) -> Result<PublicUser, ApiError> {
        let id = parse_id::<User>(id)?;
        Ok(self.users.select_404(id).await?.into())
    }

    pub async fn update_user(&self, id: &str, input: UserUpdateInput) -> Result<PublicUser, ApiError> {
        let id = parse_id::<User>(id)?;
        self.users.select_404(id).await?;

        let mut check = FieldCheck::new();
        let username = check.provided("username", input.username);
        let password = match input.password {
            Some(p) if p.is_empty() => {
                check.reject("password", "must not be empty");
                None
            }
            Some(p) => {
                self.check_password(&mut check, &p);
                Some(p)
            }
            None => None,
        };
        let role = parse_role(&mut check, input.role);
        check.finish()?;

        if let Some(username) = &username {
            if let Some(other) = self.users.select_by("username", username).await? {
                if other.id != id {
                    return Err(ApiError::conflict("Username is already taken"));
                }
            }
        }

        let patch = UserPatch {
            username,
            password_hash: password.as_deref().map(hash_password).transpose()?,
            role,
        };
        let user = self.users.update_404(id, &patch).await.map_err(username_taken)?;
        tracing::info!("Updated user {}", user.id);
        Ok(user.into())
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        let id = parse_id::<User>(id)?;
        self.users.delete_404(id).await?;
        tracing::info!("Deleted user {}", id);
        Ok(())
    }
}
