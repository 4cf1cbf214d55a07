use super::GenerationRequest;

pub const DEFAULT_IMAGE_MODEL: &str = "zai-org/GLM-Image";

#[derive(Debug, Clone)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub model_id: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub num_images: Option<u32>,
}

impl ImageGenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model_id: None,
            width: None,
            height: None,
            num_images: None,
        }
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_num_images(mut self, n: u32) -> Self {
        self.num_images = Some(n);
        self
    }

    pub fn to_request(&self) -> GenerationRequest {
        let mut request = GenerationRequest::new(
            self.model_id.as_deref().unwrap_or(DEFAULT_IMAGE_MODEL),
        )
        .with_prompt(self.prompt.clone())
        .with_size(self.width.unwrap_or(1024), self.height.unwrap_or(1024))
        .with_response_format("b64_json");
        request.n = self.num_images.unwrap_or(1);
        request
    }
}
