use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::store::{Collection, DocumentStore, StoredDocument};

/// In-process document store. Each collection is a Vec kept in insertion
/// order; unique checks and writes happen under the same write lock.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Vec<StoredDocument>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn field_str<'a>(data: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    data.get(field).and_then(Value::as_str)
}

fn unique_taken(
    docs: &[StoredDocument],
    collection: Collection,
    candidate: &Map<String, Value>,
    except: Option<Uuid>,
) -> Option<String> {
    let field = collection.unique_field()?;
    let value = field_str(candidate, field)?;
    docs.iter()
        .filter(|doc| Some(doc.id) != except)
        .any(|doc| field_str(&doc.data, field) == Some(value))
        .then(|| format!("{} '{}' already exists in {}", field, value, collection))
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find_all(&self, collection: Collection) -> Result<Vec<StoredDocument>, DatabaseError> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    async fn find_by_id(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<Option<StoredDocument>, DatabaseError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id).cloned()))
    }

    async fn find_one_by(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Option<StoredDocument>, DatabaseError> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).and_then(|docs| {
            docs.iter()
                .find(|doc| field_str(&doc.data, field) == Some(value))
                .cloned()
        }))
    }

    async fn insert(
        &self,
        collection: Collection,
        data: Map<String, Value>,
    ) -> Result<StoredDocument, DatabaseError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();

        if let Some(msg) = unique_taken(docs, collection, &data, None) {
            return Err(DatabaseError::Conflict(msg));
        }

        let now = Utc::now();
        let doc = StoredDocument {
            id: Uuid::new_v4(),
            data,
            created_at: now,
            updated_at: now,
        };
        docs.push(doc.clone());
        Ok(doc)
    }

    async fn update(
        &self,
        collection: Collection,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> Result<Option<StoredDocument>, DatabaseError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(None);
        };

        let Some(index) = docs.iter().position(|doc| doc.id == id) else {
            return Ok(None);
        };

        if let Some(msg) = unique_taken(docs, collection, &patch, Some(id)) {
            return Err(DatabaseError::Conflict(msg));
        }

        let doc = &mut docs[index];
        doc.data.extend(patch);
        doc.updated_at = Utc::now();
        Ok(Some(doc.clone()))
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, DatabaseError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|doc| doc.id != id);
        Ok(docs.len() != before)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
