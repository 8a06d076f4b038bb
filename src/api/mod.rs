//! Router assembly.
//!
//! Every route belongs to a group whose gate is applied as a route layer:
//! public, `require_session`, or `require_admin`. Public reads and gated
//! writes share paths; axum merges their method routers.

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::SecurityConfig;
use crate::handlers::{auth, clients, contacts, projects, subscribers, system};
use crate::middleware::{require_admin, require_session};
use crate::state::AppState;

/// Build the full application router with its middleware stack
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .merge(auth_routes(&state))
        .merge(client_routes(&state))
        .merge(project_routes(&state))
        .merge(contact_routes(&state))
        .merge(subscriber_routes(&state))
        .nest_service("/uploads", ServeDir::new(&config.storage.upload_dir));

    if config.api.enable_request_logging {
        router = router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(build_cors_layer(&config.security))
                .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes)),
        )
        .with_state(state)
}

/// CORS for the admin dashboard origin(s). Credentials are allowed so the
/// browser sends the session cookie.
pub fn build_cors_layer(config: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/check", get(auth::check));

    let register = Router::new().route("/api/auth/register", post(auth::register));
    let register = if state.config.security.open_registration {
        register
    } else {
        register.route_layer(from_fn_with_state(state.clone(), require_admin))
    };

    let admin = Router::new()
        .route("/api/auth/users", get(auth::list_users))
        .route(
            "/api/auth/users/:id",
            get(auth::get_user)
                .put(auth::update_user)
                .delete(auth::delete_user),
        )
        .route_layer(from_fn_with_state(state.clone(), require_admin));

    public.merge(register).merge(admin)
}

fn client_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/api/clients", get(clients::list))
        .route("/api/clients/:id", get(clients::get));

    let gated = Router::new()
        .route("/api/clients", post(clients::create))
        .route(
            "/api/clients/:id",
            put(clients::update).delete(clients::delete),
        )
        .route_layer(from_fn_with_state(state.clone(), require_session));

    public.merge(gated)
}

fn project_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/api/projects", get(projects::list))
        .route("/api/projects/:id", get(projects::get));

    let gated = Router::new()
        .route("/api/projects", post(projects::create))
        .route(
            "/api/projects/:id",
            put(projects::update).delete(projects::delete),
        )
        .route_layer(from_fn_with_state(state.clone(), require_session));

    public.merge(gated)
}

fn contact_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new().route("/api/contacts", post(contacts::create));

    let gated = Router::new()
        .route("/api/contacts", get(contacts::list))
        .route(
            "/api/contacts/:id",
            get(contacts::get)
                .put(contacts::update)
                .delete(contacts::delete),
        )
        .route_layer(from_fn_with_state(state.clone(), require_session));

    public.merge(gated)
}

fn subscriber_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new().route("/api/subscribers", post(subscribers::create));

    let gated = Router::new()
        .route("/api/subscribers", get(subscribers::list))
        .route(
            "/api/subscribers/:id",
            get(subscribers::get)
                .put(subscribers::update)
                .delete(subscribers::delete),
        )
        .route_layer(from_fn_with_state(state.clone(), require_session));

    public.merge(gated)
}
