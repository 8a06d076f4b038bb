pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod services;
pub mod state;

#[cfg(test)]
pub mod testing;

pub use api::app;
pub use config::AppConfig;
pub use error::ApiError;
pub use state::AppState;
