use serde::Deserialize;

use crate::database::models::{NewSubscriber, Subscriber, SubscriberPatch};
use crate::database::{DatabaseError, Repository};
use crate::error::ApiError;
use crate::state::AppState;

use super::validation::{parse_id, FieldCheck};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriberInput {
    pub email: Option<String>,
}

pub struct SubscriberService {
    repo: Repository<Subscriber>,
}

/// Addresses are compared and stored trimmed and lowercased
fn normalize(email: String) -> String {
    email.to_lowercase()
}

fn already_subscribed(err: DatabaseError) -> ApiError {
    match err {
        DatabaseError::Conflict(_) => ApiError::conflict("Email is already subscribed"),
        other => other.into(),
    }
}

impl SubscriberService {
    pub fn new(state: &AppState) -> Self {
        Self {
            repo: Repository::new(state.store.clone()),
        }
    }

    pub async fn list(&self) -> Result<Vec<Subscriber>, ApiError> {
        Ok(self.repo.select_all().await?)
    }

    pub async fn get(&self, id: &str) -> Result<Subscriber, ApiError> {
        let id = parse_id::<Subscriber>(id)?;
        Ok(self.repo.select_404(id).await?)
    }

    pub async fn create(&self, input: SubscriberInput) -> Result<Subscriber, ApiError> {
        let mut check = FieldCheck::new();
        let email = check.required_email("email", input.email);
        check.finish()?;

        let new_subscriber = NewSubscriber {
            email: normalize(email),
        };
        let subscriber = self
            .repo
            .create(&new_subscriber)
            .await
            .map_err(already_subscribed)?;
        tracing::info!("New subscriber {}", subscriber.id);
        Ok(subscriber)
    }

    pub async fn update(&self, id: &str, input: SubscriberInput) -> Result<Subscriber, ApiError> {
        let id = parse_id::<Subscriber>(id)?;
        self.repo.select_404(id).await?;

        let mut check = FieldCheck::new();
        let email = check.provided_email("email", input.email);
        check.finish()?;

        let patch = SubscriberPatch {
            email: email.map(normalize),
        };
        self.repo
            .update_404(id, &patch)
            .await
            .map_err(already_subscribed)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let id = parse_id::<Subscriber>(id)?;
        self.repo.delete_404(id).await?;
        tracing::info!("Deleted subscriber {}", id);
        Ok(())
    }
}
