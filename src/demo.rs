use std::env;
use std::path::PathBuf;

use crate::error::MediaError;
use crate::models::VideoParams;
use crate::sglang::SglangClient;

pub const DEFAULT_VIDEO_PROMPT: &str =
    "A cat walking gracefully across a sunlit garden, realistic, 4K";

#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub prompt: String,
    pub params: VideoParams,
    pub output_path: PathBuf,
    /// When set, an image-to-video run follows the text-to-video one.
    pub i2v_image: Option<PathBuf>,
    pub i2v_output_path: PathBuf,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_VIDEO_PROMPT.to_string(),
            params: VideoParams::default(),
            output_path: PathBuf::from("cat_walking.mp4"),
            i2v_image: None,
            i2v_output_path: PathBuf::from("output_i2v.mp4"),
        }
    }
}

impl DemoOptions {
    pub fn from_env() -> Self {
        Self {
            i2v_image: env::var("WAN_I2V_IMAGE")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            ..Default::default()
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum DemoOutcome {
    ServerUnavailable,
    Completed {
        generated: Vec<PathBuf>,
        failures: usize,
    },
}

/// Health check, model listing, then one or two video generations.
///
/// HTTP failures are logged and never propagated.
pub async fn run_video_demo(client: &SglangClient, options: &DemoOptions) -> DemoOutcome {
    log::info!("Checking server health...");
    match client.check_health().await {
        Ok(true) => log::info!("Server is healthy!"),
        Ok(false) => {
            print_server_hint(&client.config().base_url);
            return DemoOutcome::ServerUnavailable;
        }
        Err(e) => {
            log::error!("Health check failed: {}", e);
            print_server_hint(&client.config().base_url);
            return DemoOutcome::ServerUnavailable;
        }
    }

    match client.list_models().await {
        Ok(models) => {
            log::info!("Available models:");
            for id in models.ids() {
                log::info!("  - {}", id);
            }
        }
        Err(e) => report_failure("Error listing models", &e),
    }

    let mut generated = Vec::new();
    let mut failures = 0;

    log::info!("=== Text-to-Video Generation ===");
    match client
        .video()
        .text_to_video(&options.prompt, &options.params, &options.output_path)
        .await
    {
        Ok(path) => {
            log::info!("🎉 Success! Video saved to: {}", path.display());
            generated.push(path);
        }
        Err(e) => {
            report_failure("Error generating video", &e);
            failures += 1;
        }
    }

    if let Some(image) = &options.i2v_image {
        log::info!("=== Image-to-Video Generation ===");
        match client
            .video()
            .image_to_video(image, "", &options.params, &options.i2v_output_path)
            .await
        {
            Ok(path) => {
                log::info!("🎉 Success! Video saved to: {}", path.display());
                generated.push(path);
            }
            Err(e) => {
                report_failure("Error generating video", &e);
                failures += 1;
            }
        }
    }

    DemoOutcome::Completed {
        generated,
        failures,
    }
}

fn report_failure(context: &str, error: &MediaError) {
    match error {
        MediaError::HttpStatus { status, body } => {
            log::error!("{}: HTTP {}", context, status);
            log::error!("Response: {}", body);
        }
        other => log::error!("{}: {}", context, other),
    }
}

fn print_server_hint(base_url: &str) {
    log::error!("Server at {} is not responding.", base_url);
    println!("Make sure SGLang is running with a Wan 2.2 model.");
    println!();
    println!("Example:");
    println!("  docker run --gpus all -p 30000:30000 \\");
    println!("    -e MODEL_PATH=/app/models/Wan2.2-T2V-A14B-Diffusers \\");
    println!("    -v ./models:/app/models \\");
    println!("    khalidnass/sglang:v0.5.0");
}
