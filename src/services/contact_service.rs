use serde::Deserialize;

use crate::database::models::{Contact, ContactPatch, NewContact};
use crate::database::Repository;
use crate::error::ApiError;
use crate::state::AppState;

use super::validation::{parse_id, FieldCheck};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub city: Option<String>,
}

pub struct ContactService {
    repo: Repository<Contact>,
}

impl ContactService {
    pub fn new(state: &AppState) -> Self {
        Self {
            repo: Repository::new(state.store.clone()),
        }
    }

    pub async fn list(&self) -> Result<Vec<Contact>, ApiError> {
        Ok(self.repo.select_all().await?)
    }

    pub async fn get(&self, id: &str) -> Result<Contact, ApiError> {
        let id = parse_id::<Contact>(id)?;
        Ok(self.repo.select_404(id).await?)
    }

    pub async fn create(&self, input: ContactInput) -> Result<Contact, ApiError> {
        let mut check = FieldCheck::new();
        let new_contact = NewContact {
            full_name: check.required("fullName", input.full_name),
            email: check.required_email("email", input.email),
            mobile: check.required("mobile", input.mobile),
            city: check.required("city", input.city),
        };
        check.finish()?;

        let contact = self.repo.create(&new_contact).await?;
        tracing::info!("Received contact message {} from {}", contact.id, contact.email);
        Ok(contact)
    }

    pub async fn update(&self, id: &str, input: ContactInput) -> Result<Contact, ApiError> {
        let id = parse_id::<Contact>(id)?;
        self.repo.select_404(id).await?;

        let mut check = FieldCheck::new();
        let patch = ContactPatch {
            full_name: check.provided("fullName", input.full_name),
            email: check.provided_email("email", input.email),
            mobile: check.provided("mobile", input.mobile),
            city: check.provided("city", input.city),
        };
        check.finish()?;

        Ok(self.repo.update_404(id, &patch).await?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let id = parse_id::<Contact>(id)?;
        self.repo.delete_404(id).await?;
        tracing::info!("Deleted contact {}", id);
        Ok(())
    }
}
