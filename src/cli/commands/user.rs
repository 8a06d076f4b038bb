use anyhow::Context;
use std::sync::Arc;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database;
use crate::services::{AuthService, RegisterInput, Registrar};

/// Bootstrap a user without going through HTTP registration
pub async fn handle(
    config: AppConfig,
    username: String,
    password: String,
    role: String,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let store = database::connect(&config.database)
        .await
        .context("failed to connect document store")?;
    let service = AuthService::with_store(store, Arc::new(config));

    let user = service
        .register(
            RegisterInput {
                username: Some(username),
                password: Some(password),
                role: Some(role),
            },
            Registrar::Admin,
        )
        .await
        .map_err(|e| anyhow::anyhow!("{}", e.message()))?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&user)?),
        OutputFormat::Text => println!("Created {} user '{}' ({})", user.role, user.username, user.id),
    }
    Ok(())
}
