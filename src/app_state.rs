use std::sync::Arc;

use crate::services::ocr::OcrClient;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub ocr: Arc<OcrClient>,
}

impl AppState {
    pub fn new(ocr: OcrClient) -> Self {
        Self {
            ocr: Arc::new(ocr),
        }
    }
}
