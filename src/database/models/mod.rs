pub mod client;
pub mod contact;
pub mod project;
pub mod session;
pub mod subscriber;
pub mod user;

use serde::de::DeserializeOwned;

use super::store::Collection;

pub use client::{Client, ClientPatch, NewClient};
pub use contact::{Contact, ContactPatch, NewContact};
pub use project::{NewProject, Project, ProjectPatch};
pub use session::{NewSession, Session};
pub use subscriber::{NewSubscriber, Subscriber, SubscriberPatch};
pub use user::{NewUser, PublicUser, Role, User, UserPatch};

/// A typed view over one document collection
pub trait Entity: DeserializeOwned + Send + Sync + Unpin + 'static {
    const COLLECTION: Collection;
    /// Human-readable name used in error messages
    const NAME: &'static str;
}
