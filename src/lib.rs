pub mod bootstrap;
pub mod config;
pub mod demo;
pub mod error;
pub mod logger;
pub mod models;
pub mod server;
pub mod sglang;

pub use bootstrap::{Bootstrapper, CommandRunner, SystemRunner};
pub use config::{BootstrapConfig, ClientConfig, InstallStep, LaunchConfig};
pub use error::{MediaError, Result};
pub use models::*;
pub use server::{HealthPoller, HealthProbe, Readiness, RunningServer, ServerLauncher, ServerState};
pub use sglang::{HttpReply, ImageClient, SglangClient, Transport, VideoClient};
