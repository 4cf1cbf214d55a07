use sglang_media::{
    config::DEFAULT_MODEL_PATH, logger, BootstrapConfig, Bootstrapper, HealthPoller,
    ImageGenerationRequest, LaunchConfig, MediaError, Result, ServerLauncher, SglangClient,
};
use std::process::ExitCode;

const IMAGE_PROMPT: &str = r#"A sunset with text "Hello" in the sky"#;
const OUTPUT_PATH: &str = "test_output.png";

#[tokio::main]
async fn main() -> ExitCode {
    let env_loaded = dotenv::dotenv().is_ok();

    if let Err(e) = logger::init() {
        eprintln!("{}", e);
    }
    if env_loaded {
        log::info!("✅ .env file loaded");
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<()> {
    log::info!("=== Installing GLM-Image dependencies ===");
    Bootstrapper::new(BootstrapConfig::glm_image()).run().await?;

    log::info!("=== Starting sglang serve ===");
    let launch = LaunchConfig::new();
    let client = SglangClient::new(launch.client_config())?;
    let mut server = ServerLauncher::new(launch.clone()).spawn()?;
    let mut poller = HealthPoller::from_config(&launch);

    log::info!("=== Waiting for server to start ===");
    let ready = tokio::select! {
        ready = server.wait_until_ready(&mut poller, &client) => ready,
        _ = tokio::signal::ctrl_c() => Err(MediaError::Interrupted),
    };
    if let Err(e) = ready {
        if let Err(stop_err) = server.shutdown().await {
            log::warn!("Failed to stop server: {}", stop_err);
        }
        return Err(e);
    }

    log::info!("=== Testing /v1/images/generations ===");
    let request = ImageGenerationRequest::new(IMAGE_PROMPT)
        .with_model(DEFAULT_MODEL_PATH)
        .with_size(1024, 1024);

    let generation = tokio::select! {
        result = client.image().text_to_image(&request, OUTPUT_PATH) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    match generation {
        Some(Ok(path)) => log::info!("SUCCESS! Image saved to {}", path.display()),
        Some(Err(MediaError::HttpStatus { status, body })) => {
            log::error!("FAILED: {}", status);
            println!("{}", body);
        }
        Some(Err(e)) => log::error!("FAILED: {}", e),
        None => {
            server.shutdown().await?;
            return Err(MediaError::Interrupted);
        }
    }

    log::info!("=== Stopping server ===");
    server.shutdown().await?;
    log::info!("=== Test complete ===");
    Ok(())
}
