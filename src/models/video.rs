use super::GenerationRequest;

pub const T2V_MODEL: &str = "Wan2.2-T2V";
pub const I2V_MODEL: &str = "Wan2.2-I2V";

/// Sampling parameters forwarded in `extra_body`.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoParams {
    pub num_frames: u32,
    pub width: u32,
    pub height: u32,
    pub num_inference_steps: u32,
    pub guidance_scale: f64,
}

impl Default for VideoParams {
    fn default() -> Self {
        // 81 frames is roughly 3 seconds at 24fps
        Self {
            num_frames: 81,
            width: 832,
            height: 480,
            num_inference_steps: 50,
            guidance_scale: 5.0,
        }
    }
}

impl VideoParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frames(mut self, num_frames: u32) -> Self {
        self.num_frames = num_frames;
        self
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_steps(mut self, num_inference_steps: u32) -> Self {
        self.num_inference_steps = num_inference_steps;
        self
    }

    pub fn with_guidance(mut self, guidance_scale: f64) -> Self {
        self.guidance_scale = guidance_scale;
        self
    }

    fn apply(&self, request: GenerationRequest) -> GenerationRequest {
        request
            .with_extra("num_frames", self.num_frames)
            .with_extra("num_inference_steps", self.num_inference_steps)
            .with_extra("guidance_scale", self.guidance_scale)
    }
}

impl GenerationRequest {
    pub fn text_to_video(model: &str, prompt: &str, params: &VideoParams) -> Self {
        params.apply(
            GenerationRequest::new(model)
                .with_prompt(prompt)
                .with_size(params.width, params.height),
        )
    }

    /// Image-conditioned request. The output resolution follows the input image.
    pub fn image_to_video(model: &str, image: &str, prompt: &str, params: &VideoParams) -> Self {
        params.apply(
            GenerationRequest::new(model)
                .with_image(image)
                .with_prompt(prompt),
        )
    }
}
