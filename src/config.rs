use std::env;
use std::time::Duration;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:30000";
pub const DEFAULT_MODEL_PATH: &str = "zai-org/GLM-Image";
pub const DEFAULT_PORT: u16 = 30000;
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Settings for talking to a running server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub health_timeout: Duration,
    pub request_timeout: Duration,
    pub generation_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_SERVER_URL.to_string(),
            health_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(10),
            generation_timeout: Duration::from_secs(600),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let base_url = env::var("SGLANG_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        Self::default().with_base_url(base_url)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// How the server child process is started and waited on.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    pub program: String,
    pub model_path: String,
    pub port: u16,
    pub host: String,
    pub max_attempts: u32,
    pub poll_interval: Duration,
    pub probe_timeout: Duration,
    pub stop_timeout: Duration,
    pub shutdown_grace: Duration,
    pub output_prefix: String,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        LaunchConfig {
            program: "sglang".to_string(),
            model_path: DEFAULT_MODEL_PATH.to_string(),
            port: DEFAULT_PORT,
            host: DEFAULT_HOST.to_string(),
            max_attempts: 600,
            poll_interval: Duration::from_secs(1),
            probe_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(15),
            shutdown_grace: Duration::from_secs(2),
            output_prefix: "[SERVER] ".to_string(),
        }
    }
}

impl LaunchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model_path(mut self, model_path: impl Into<String>) -> Self {
        self.model_path = model_path.into();
        self
    }

    pub fn with_bind(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn args(&self) -> Vec<String> {
        vec![
            "serve".to_string(),
            "--model-path".to_string(),
            self.model_path.clone(),
            "--port".to_string(),
            self.port.to_string(),
            "--host".to_string(),
            self.host.clone(),
        ]
    }

    /// Client settings pointing at the locally launched server.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_base_url(format!("http://localhost:{}", self.port))
            .with_health_timeout(self.probe_timeout)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstallStep {
    pub label: String,
    pub packages: Vec<String>,
}

impl InstallStep {
    pub fn new<I, S>(label: impl Into<String>, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            packages: packages.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    pub script: String,
    pub fallback_script: String,
}

#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub python: String,
    pub steps: Vec<InstallStep>,
    pub verification: Option<Verification>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        BootstrapConfig {
            python: "python3".to_string(),
            steps: Vec::new(),
            verification: None,
        }
    }
}

impl BootstrapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(python) = env::var("PYTHON") {
            if !python.trim().is_empty() {
                config.python = python;
            }
        }
        config
    }

    /// Install plan for serving GLM-Image with sglang's diffusion backend.
    pub fn glm_image() -> Self {
        Self::from_env()
            .with_step(InstallStep::new(
                "PyTorch 2.9.1 + CUDA 12.8",
                [
                    "torch==2.9.1",
                    "torchvision",
                    "--index-url",
                    "https://download.pytorch.org/whl/cu128",
                ],
            ))
            .with_step(InstallStep::new(
                "sglang[diffusion]",
                ["sglang[diffusion] @ git+https://github.com/sgl-project/sglang.git#subdirectory=python"],
            ))
            .with_step(InstallStep::new(
                "transformers (git)",
                ["git+https://github.com/huggingface/transformers.git"],
            ))
            .with_step(InstallStep::new(
                "diffusers (git)",
                ["git+https://github.com/huggingface/diffusers.git"],
            ))
            .with_verification(
                "from transformers import GlmImageForConditionalGeneration; print('GlmImageForConditionalGeneration OK')",
                "import transformers; print(f'transformers version: {transformers.__version__}')",
            )
    }

    pub fn with_python(mut self, python: impl Into<String>) -> Self {
        self.python = python.into();
        self
    }

    pub fn with_step(mut self, step: InstallStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn with_verification(
        mut self,
        script: impl Into<String>,
        fallback_script: impl Into<String>,
    ) -> Self {
        self.verification = Some(Verification {
            script: script.into(),
            fallback_script: fallback_script.into(),
        });
        self
    }
}
