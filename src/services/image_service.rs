use std::sync::Arc;

use crate::error::ApiError;
use crate::media::{ImageInput, MediaStorage};
use crate::state::AppState;

/// Decodes incoming images and writes them through the configured storage
#[derive(Clone)]
pub struct ImageService {
    media: Arc<dyn MediaStorage>,
    max_bytes: usize,
}

impl ImageService {
    pub fn new(state: &AppState) -> Self {
        Self {
            media: state.media.clone(),
            max_bytes: state.config.storage.max_image_bytes,
        }
    }

    /// Validate and store an image, returning its public URL.
    /// `None` in means no image was supplied and yields `None`.
    pub async fn store(&self, input: Option<ImageInput>) -> Result<Option<String>, ApiError> {
        let Some(input) = input else {
            return Ok(None);
        };
        let image = input.decode(self.max_bytes)?;
        let url = self.media.put(&image).await?;
        Ok(Some(url))
    }

    /// Best-effort removal; failures are only logged
    pub async fn discard(&self, url: Option<&str>) {
        let Some(url) = url else {
            return;
        };
        if let Err(e) = self.media.remove(url).await {
            tracing::warn!("Failed to remove image {}: {}", url, e);
        }
    }
}
