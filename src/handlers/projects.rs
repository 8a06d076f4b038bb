use axum::extract::{multipart::MultipartRejection, Multipart, Path, State};
use serde_json::Value;

use crate::database::models::Project;
use crate::error::ApiError;
use crate::media::ImageInput;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{ProjectInput, ProjectService};
use crate::state::AppState;

/// Collect the project form. Unknown parts are ignored and an empty file
/// part (no file chosen in the browser) counts as no image.
async fn read_form(mut multipart: Multipart) -> Result<ProjectInput, ApiError> {
    let mut input = ProjectInput::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    tracing::debug!("Received image part '{}' ({} bytes)", file_name, bytes.len());
                    input.image = Some(ImageInput::Upload(bytes.to_vec()));
                }
            }
            "projectName" => input.project_name = Some(field.text().await?),
            "description" => input.description = Some(field.text().await?),
            "location" => input.location = Some(field.text().await?),
            "category" => input.category = Some(field.text().await?),
            _ => {}
        }
    }

    Ok(input)
}

/// GET /api/projects - All projects in insertion order
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Project>> {
    let projects = ProjectService::new(&state).list().await?;
    Ok(ApiResponse::success(projects))
}

/// GET /api/projects/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Project> {
    let project = ProjectService::new(&state).get(&id).await?;
    Ok(ApiResponse::success(project))
}

/// POST /api/projects - multipart form with an optional `image` file
pub async fn create(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Project> {
    let input = read_form(multipart?).await?;
    let project = ProjectService::new(&state).create(input).await?;
    Ok(ApiResponse::created(project))
}

/// PUT /api/projects/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Project> {
    let input = read_form(multipart?).await?;
    let project = ProjectService::new(&state).update(&id, input).await?;
    Ok(ApiResponse::success(project))
}

/// DELETE /api/projects/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    ProjectService::new(&state).delete(&id).await?;
    Ok(ApiResponse::message("Project deleted"))
}
