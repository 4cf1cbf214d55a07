pub mod image_client;
pub mod media;
pub mod transport;
pub mod video_client;

use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    config::ClientConfig,
    error::Result,
    models::ModelList,
    server::HealthProbe,
};

pub use image_client::ImageClient;
pub use transport::{HttpReply, ReqwestTransport, Transport};
pub use video_client::VideoClient;

pub const HEALTH_PATH: &str = "/health";
pub const MODELS_PATH: &str = "/v1/models";

#[derive(Clone)]
pub struct SglangClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    image_client: ImageClient,
    video_client: VideoClient,
}

impl SglangClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.base_url.clone())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            image_client: ImageClient::new(transport.clone(), config.generation_timeout),
            video_client: VideoClient::new(transport.clone(), config.generation_timeout),
            transport,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn video(&self) -> &VideoClient {
        &self.video_client
    }

    /// True only on a 200 from `/health`.
    ///
    /// Refused connections and timeouts count as "not healthy"; any other
    /// failure is returned as an error.
    pub async fn check_health(&self) -> Result<bool> {
        match self
            .transport
            .get(HEALTH_PATH, self.config.health_timeout)
            .await
        {
            Ok(reply) => Ok(reply.is_ok()),
            Err(e) if e.is_unreachable() => {
                log::debug!("Health check: {}", e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn list_models(&self) -> Result<ModelList> {
        self.transport
            .get(MODELS_PATH, self.config.request_timeout)
            .await?
            .into_json()
    }
}

#[async_trait]
impl HealthProbe for SglangClient {
    async fn probe(&self) -> Result<bool> {
        self.check_health().await
    }
}
