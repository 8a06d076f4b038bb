use serde::Deserialize;

use crate::database::models::{Client, ClientPatch, NewClient};
use crate::database::Repository;
use crate::error::ApiError;
use crate::media::ImageInput;
use crate::state::AppState;

use super::image_service::ImageService;
use super::validation::{parse_id, trimmed, FieldCheck};

/// JSON body for client create/update. `image` is an inline `data:` URL.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInput {
    pub name: Option<String>,
    pub designation: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

pub struct ClientService {
    repo: Repository<Client>,
    images: ImageService,
}

impl ClientService {
    pub fn new(state: &AppState) -> Self {
        Self {
            repo: Repository::new(state.store.clone()),
            images: ImageService::new(state),
        }
    }

    pub async fn list(&self) -> Result<Vec<Client>, ApiError> {
        Ok(self.repo.select_all().await?)
    }

    pub async fn get(&self, id: &str) -> Result<Client, ApiError> {
        let id = parse_id::<Client>(id)?;
        Ok(self.repo.select_404(id).await?)
    }

    pub async fn create(&self, input: ClientInput) -> Result<Client, ApiError> {
        let mut check = FieldCheck::new();
        let name = check.required("name", input.name);
        let designation = check.required("designation", input.designation);
        check.finish()?;

        let image_url = self.images.store(ImageInput::inline(input.image)).await?;

        let new_client = NewClient {
            name,
            designation,
            description: trimmed(input.description),
            image_url: image_url.clone(),
        };

        match self.repo.create(&new_client).await {
            Ok(client) => {
                tracing::info!("Created client {} ({})", client.id, client.name);
                Ok(client)
            }
            Err(e) => {
                self.images.discard(image_url.as_deref()).await;
                Err(e.into())
            }
        }
    }

    pub async fn update(&self, id: &str, input: ClientInput) -> Result<Client, ApiError> {
        let id = parse_id::<Client>(id)?;
        let existing = self.repo.select_404(id).await?;

        let mut check = FieldCheck::new();
        let mut patch = ClientPatch {
            name: check.provided("name", input.name),
            designation: check.provided("designation", input.designation),
            description: input.description.map(|d| d.trim().to_string()),
            image_url: None,
        };
        check.finish()?;

        patch.image_url = self.images.store(ImageInput::inline(input.image)).await?;

        match self.repo.update_404(id, &patch).await {
            Ok(updated) => {
                if patch.image_url.is_some() {
                    self.images.discard(existing.image_url.as_deref()).await;
                }
                Ok(updated)
            }
            Err(e) => {
                self.images.discard(patch.image_url.as_deref()).await;
                Err(e.into())
            }
        }
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let id = parse_id::<Client>(id)?;
        let existing = self.repo.select_404(id).await?;
        self.repo.delete_404(id).await?;
        self.images.discard(existing.image_url.as_deref()).await;
        tracing::info!("Deleted client {}", id);
        Ok(())
    }
}
