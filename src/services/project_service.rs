use crate::database::models::{NewProject, Project, ProjectPatch};
use crate::database::Repository;
use crate::error::ApiError;
use crate::media::ImageInput;
use crate::state::AppState;

use super::image_service::ImageService;
use super::validation::{parse_id, trimmed, FieldCheck};

/// Fields of a project form; assembled by the handler from multipart parts
#[derive(Debug, Clone, Default)]
pub struct ProjectInput {
    pub project_name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub image: Option<ImageInput>,
}

pub struct ProjectService {
    repo: Repository<Project>,
    images: ImageService,
}

impl ProjectService {
    pub fn new(state: &AppState) -> Self {
        Self {
            repo: Repository::new(state.store.clone()),
            images: ImageService::new(state),
        }
    }

    pub async fn list(&self) -> Result<Vec<Project>, ApiError> {
        Ok(self.repo.select_all().await?)
    }

    pub async fn get(&self, id: &str) -> Result<Project, ApiError> {
        let id = parse_id::<Project>(id)?;
        Ok(self.repo.select_404(id).await?)
    }

    pub async fn create(&self, input: ProjectInput) -> Result<Project, ApiError> {
        let mut check = FieldCheck::new();
        let project_name = check.required("projectName", input.project_name);
        let location = check.required("location", input.location);
        let category = check.required("category", input.category);
        check.finish()?;

        let image_url = self.images.store(input.image).await?;

        let new_project = NewProject {
            project_name,
            description: trimmed(input.description),
            location,
            category,
            image_url: image_url.clone(),
        };

        match self.repo.create(&new_project).await {
            Ok(project) => {
                tracing::info!("Created project {} ({})", project.id, project.project_name);
                Ok(project)
            }
            Err(e) => {
                self.images.discard(image_url.as_deref()).await;
                Err(e.into())
            }
        }
    }

    pub async fn update(&self, id: &str, input: ProjectInput) -> Result<Project, ApiError> {
        let id = parse_id::<Project>(id)?;
        let existing = self.repo.select_404(id).await?;

        let mut check = FieldCheck::new();
        let mut patch = ProjectPatch {
            project_name: check.provided("projectName", input.project_name),
            description: input.description.map(|d| d.trim().to_string()),
            location: check.provided("location", input.location),
            category: check.provided("category", input.category),
            image_url: None,
        };
        check.finish()?;

        patch.image_url = self.images.store(input.image).await?;

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
        let id = parse_id::<Project>(id)?;
        let existing = self.repo.select_404(id).await?;
        self.repo.delete_404(id).await?;
        self.images.discard(existing.image_url.as_deref()).await;
        tracing::info!("Deleted project {}", id);
        Ok(())
    }
}
