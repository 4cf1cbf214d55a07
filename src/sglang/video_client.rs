use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::{media, transport::Transport};
use crate::{
    error::Result,
    models::{GenerationRequest, MediaKind, VideoParams, I2V_MODEL, T2V_MODEL},
};

#[derive(Clone)]
pub struct VideoClient {
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl VideoClient {
    pub fn new(transport: Arc<dyn Transport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// POSTs to `/v1/video/generations` and writes the decoded `video` payload.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        output_path: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        media::generate_to_file(
            &self.transport,
            MediaKind::Video,
            request,
            output_path.as_ref(),
            self.timeout,
        )
        .await
    }

    pub async fn text_to_video(
        &self,
        prompt: &str,
        params: &VideoParams,
        output_path: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        log::info!("🎬 Generating video from prompt: '{}'", prompt);
        log::info!(
            "   Resolution: {}x{}, Frames: {}",
            params.width,
            params.height,
            params.num_frames
        );

        let request = GenerationRequest::text_to_video(T2V_MODEL, prompt, params);
        self.generate(&request, output_path).await
    }

    /// Reads `image_path` and sends it inline as a data URL.
    pub async fn image_to_video(
        &self,
        image_path: impl AsRef<Path>,
        prompt: &str,
        params: &VideoParams,
        output_path: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let image_path = image_path.as_ref();
        let image_bytes = tokio::fs::read(image_path).await?;
        let image = media::encode_data_url(&image_bytes, media::image_mime(image_path));

        log::info!("🖼️  Generating video from image: '{}'", image_path.display());
        if !prompt.is_empty() {
            log::info!("   With prompt: '{}'", prompt);
        }

        let request = GenerationRequest::image_to_video(I2V_MODEL, &image, prompt, params);
        self.generate(&request, output_path).await
    }
}
