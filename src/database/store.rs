use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::manager::DatabaseError;

/// The fixed set of document collections. Collection names are interpolated
/// into SQL identifiers, so only these values ever reach a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Sessions,
    Clients,
    Projects,
    Contacts,
    Subscribers,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Users,
        Collection::Sessions,
        Collection::Clients,
        Collection::Projects,
        Collection::Contacts,
        Collection::Subscribers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Sessions => "sessions",
            Collection::Clients => "clients",
            Collection::Projects => "projects",
            Collection::Contacts => "contacts",
            Collection::Subscribers => "subscribers",
        }
    }

    /// Document field that must be unique across the collection, if any
    pub fn unique_field(&self) -> Option<&'static str> {
        match self {
            Collection::Users => Some("username"),
            Collection::Subscribers => Some("email"),
            _ => None,
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document as held by the store: the body plus store-assigned metadata
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: Uuid,
    pub data: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persistence seam. Ids and timestamps are assigned by the store; callers
/// only ever hand over document bodies.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents in insertion order
    async fn find_all(&self, collection: Collection) -> Result<Vec<StoredDocument>, DatabaseError>;

    async fn find_by_id(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<Option<StoredDocument>, DatabaseError>;

    /// First document whose string field equals `value` exactly
    async fn find_one_by(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Option<StoredDocument>, DatabaseError>;

    /// Insert a new document. Fails with `DatabaseError::Conflict` when the
    /// collection's unique field is already taken.
    async fn insert(
        &self,
        collection: Collection,
        data: Map<String, Value>,
    ) -> Result<StoredDocument, DatabaseError>;

    /// Merge `patch` into the document's top-level keys. Returns `None` for an
    /// unknown id.
    async fn update(
        &self,
        collection: Collection,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> Result<Option<StoredDocument>, DatabaseError>;

    /// Returns false when nothing was deleted
    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
