use anyhow::Context;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::{self, schema, Collection, StoreKind};

pub async fn handle(config: AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    if StoreKind::from_url(&config.database.url)? == StoreKind::Memory {
        match output_format {
            OutputFormat::Json => println!("{}", json!({ "migrated": false, "reason": "memory store" })),
            OutputFormat::Text => println!("In-memory store configured, nothing to migrate"),
        }
        return Ok(());
    }

    let pool = database::connect_pool(&config.database)
        .await
        .context("failed to connect to PostgreSQL")?;
    schema::migrate(&pool).await?;

    let collections: Vec<&str> = Collection::ALL.iter().map(|c| c.as_str()).collect();
    match output_format {
        OutputFormat::Json => println!("{}", json!({ "migrated": true, "collections": collections })),
        OutputFormat::Text => println!("Migrated collections: {}", collections.join(", ")),
    }
    Ok(())
}
