use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::manager::DatabaseError;
use super::store::{Collection, DocumentStore, StoredDocument};

const RETURNING: &str = "id, data, created_at, updated_at";

#[derive(FromRow)]
struct DocumentRow {
    id: Uuid,
    data: Json<Map<String, Value>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DocumentRow> for StoredDocument {
    fn from(row: DocumentRow) -> Self {
        StoredDocument {
            id: row.id,
            data: row.data.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Document store over PostgreSQL: one table per collection with a JSONB body
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Quote SQL identifier to prevent injection
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Unique violations (SQLSTATE 23505) surface as conflicts
fn classify_write_error(collection: Collection, err: sqlx::Error) -> DatabaseError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            let field = collection.unique_field().unwrap_or("value");
            return DatabaseError::Conflict(format!("{} already exists in {}", field, collection));
        }
    }
    DatabaseError::Sqlx(err)
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find_all(&self, collection: Collection) -> Result<Vec<StoredDocument>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY seq",
            RETURNING,
            quote_identifier(collection.as_str())
        );
        let rows = sqlx::query_as::<_, DocumentRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(StoredDocument::from).collect())
    }

    async fn find_by_id(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<Option<StoredDocument>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            RETURNING,
            quote_identifier(collection.as_str())
        );
        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(StoredDocument::from))
    }

    async fn find_one_by(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Option<StoredDocument>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE data ->> $1 = $2 ORDER BY seq LIMIT 1",
            RETURNING,
            quote_identifier(collection.as_str())
        );
        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(field)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(StoredDocument::from))
    }

    async fn insert(
        &self,
        collection: Collection,
        data: Map<String, Value>,
    ) -> Result<StoredDocument, DatabaseError> {
        let sql = format!(
            "INSERT INTO {} (id, data) VALUES ($1, $2) RETURNING {}",
            quote_identifier(collection.as_str()),
            RETURNING
        );
        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(Json(data))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify_write_error(collection, e))?;
        Ok(row.into())
    }

    async fn update(
        &self,
        collection: Collection,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> Result<Option<StoredDocument>, DatabaseError> {
        let sql = format!(
            "UPDATE {} SET data = data || $2, updated_at = now() WHERE id = $1 RETURNING {}",
            quote_identifier(collection.as_str()),
            RETURNING
        );
        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(id)
            .bind(Json(patch))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify_write_error(collection, e))?;
        Ok(row.map(StoredDocument::from))
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, DatabaseError> {
        let sql = format!(
            "DELETE FROM {} WHERE id = $1",
            quote_identifier(collection.as_str())
        );
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
