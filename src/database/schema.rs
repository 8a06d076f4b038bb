use sqlx::PgPool;
use tracing::info;

use super::manager::DatabaseError;
use super::store::Collection;

/// DDL for one collection table plus its unique index, if the collection has one
pub fn collection_ddl(collection: Collection) -> Vec<String> {
    let table = collection.as_str();
    let mut statements = vec![format!(
        r#"CREATE TABLE IF NOT EXISTS "{table}" (
    seq BIGSERIAL NOT NULL,
    id UUID PRIMARY KEY,
    data JSONB NOT NULL DEFAULT '{{}}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
)"#
    )];

    if let Some(field) = collection.unique_field() {
        statements.push(format!(
            r#"CREATE UNIQUE INDEX IF NOT EXISTS "uq_{table}_{field}" ON "{table}" ((data ->> '{field}'))"#
        ));
    }

    statements
}

/// Create every collection table and index. Safe to run repeatedly.
pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
    for collection in Collection::ALL {
        for statement in collection_ddl(collection) {
            sqlx::query(&statement).execute(pool).await?;
        }
        info!("Collection ready: {}", collection);
    }
    Ok(())
}
