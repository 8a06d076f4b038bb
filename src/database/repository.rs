use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::Entity;
use crate::database::store::{DocumentStore, StoredDocument};

/// Typed access to one collection. Documents are hydrated into `T` with the
/// store-assigned `_id`, `createdAt` and `updatedAt` merged in.
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_all(&self) -> Result<Vec<T>, DatabaseError> {
        self.store
            .find_all(T::COLLECTION)
            .await?
            .into_iter()
            .map(hydrate)
            .collect()
    }

    pub async fn select_one(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        self.store
            .find_by_id(T::COLLECTION, id)
            .await?
            .map(hydrate)
            .transpose()
    }

    pub async fn select_404(&self, id: Uuid) -> Result<T, DatabaseError> {
        self.select_one(id).await?.ok_or_else(|| not_found::<T>())
    }

    pub async fn select_by(&self, field: &str, value: &str) -> Result<Option<T>, DatabaseError> {
        self.store
            .find_one_by(T::COLLECTION, field, value)
            .await?
            .map(hydrate)
            .transpose()
    }

    pub async fn create<N: Serialize>(&self, new: &N) -> Result<T, DatabaseError> {
        let doc = self.store.insert(T::COLLECTION, to_body(new)?).await?;
        hydrate(doc)
    }

    pub async fn update_404<P: Serialize>(&self, id: Uuid, patch: &P) -> Result<T, DatabaseError> {
        match self.store.update(T::COLLECTION, id, to_body(patch)?).await? {
            Some(doc) => hydrate(doc),
            None => Err(not_found::<T>()),
        }
    }

    pub async fn delete_404(&self, id: Uuid) -> Result<(), DatabaseError> {
        if self.store.delete(T::COLLECTION, id).await? {
            Ok(())
        } else {
            Err(not_found::<T>())
        }
    }
}

fn not_found<T: Entity>() -> DatabaseError {
    DatabaseError::NotFound(format!("{} not found", T::NAME))
}

fn to_body<S: Serialize>(value: &S) -> Result<Map<String, Value>, DatabaseError> {
    match serde_json::to_value(value)? {
        Value::Object(mut map) => {
            // Store-owned metadata never travels inside the body
            map.remove("_id");
            map.remove("createdAt");
            map.remove("updatedAt");
            Ok(map)
        }
        other => Err(DatabaseError::Corrupt(format!(
            "document body must be an object, got {}",
            other
        ))),
    }
}

fn hydrate<T: Entity>(doc: StoredDocument) -> Result<T, DatabaseError> {
    let mut map = doc.data;
    map.insert("_id".to_string(), json!(doc.id));
    map.insert("createdAt".to_string(), json!(doc.created_at));
    map.insert("updatedAt".to_string(), json!(doc.updated_at));
    serde_json::from_value(Value::Object(map))
        .map_err(|e| DatabaseError::Corrupt(format!("{} {}: {}", T::NAME, doc.id, e)))
}
