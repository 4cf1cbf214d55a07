use sglang_media::{
    demo::{self, DemoOptions},
    logger, ClientConfig, SglangClient,
};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let env_loaded = dotenv::dotenv().is_ok();

    if let Err(e) = logger::init() {
        eprintln!("{}", e);
    }
    if env_loaded {
        log::info!("✅ .env file loaded");
    }

    log::info!("{}", "=".repeat(60));
    log::info!("Wan 2.2 Video Generation Example");
    log::info!("{}", "=".repeat(60));

    let config = ClientConfig::from_env();
    logger::log_client_info(&config);

    let client = match SglangClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            log::error!("Failed to create client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    demo::run_video_demo(&client, &DemoOptions::from_env()).await;
    ExitCode::SUCCESS
}
