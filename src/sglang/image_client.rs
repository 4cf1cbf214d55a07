use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::{media, transport::Transport};
use crate::{
    error::Result,
    models::{GenerationRequest, ImageGenerationRequest, MediaKind},
};

#[derive(Clone)]
pub struct ImageClient {
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl ImageClient {
    pub fn new(transport: Arc<dyn Transport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// POSTs to `/v1/images/generations` and writes the decoded `b64_json` image.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        output_path: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        media::generate_to_file(
            &self.transport,
            MediaKind::Image,
            request,
            output_path.as_ref(),
            self.timeout,
        )
        .await
    }

    pub async fn text_to_image(
        &self,
        request: &ImageGenerationRequest,
        output_path: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        log::info!("🎨 Prompt: '{}'", request.prompt);
        self.generate(&request.to_request(), output_path).await
    }
}
