use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::MemoryDocumentStore;
use crate::media::{ImageInput, MemoryStorage};
use crate::state::AppState;

/// Application state wired to in-memory fakes, with handles kept for assertions
pub struct TestContext {
    pub state: AppState,
    pub media: Arc<MemoryStorage>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_media(MemoryStorage::new())
    }

    /// Context whose media storage rejects every write
    pub fn with_failing_media() -> Self {
        Self::with_media(MemoryStorage::failing())
    }

    fn with_media(media: MemoryStorage) -> Self {
        let media = Arc::new(media);
        let mut config = AppConfig::development();
        config.session.secret = "test-session-secret".to_string();
        let state = AppState::new(config, Arc::new(MemoryDocumentStore::new()), media.clone());
        Self { state, media }
    }
}

/// PNG signature padded to `len` bytes
pub fn png_bytes(len: usize) -> Vec<u8> {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.resize(len.max(8), 0x42);
    bytes
}

pub fn png_data_url(len: usize) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png_bytes(len)))
}

pub fn png_upload(len: usize) -> ImageInput {
    ImageInput::Upload(png_bytes(len))
}
