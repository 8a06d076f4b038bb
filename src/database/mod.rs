pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod schema;
pub mod store;

pub use manager::{connect, connect_pool, DatabaseError, StoreKind};
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
pub use repository::Repository;
pub use store::{Collection, DocumentStore, StoredDocument};
