use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

use crate::config::{BootstrapConfig, InstallStep, Verification};
use crate::error::{MediaError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs to completion with inherited stdio and returns the exit code.
    async fn status(&self, program: &str, args: &[String]) -> Result<Option<i32>>;

    /// Runs to completion capturing stdout and stderr separately.
    async fn output(&self, program: &str, args: &[String]) -> Result<CommandOutput>;
}

pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn status(&self, program: &str, args: &[String]) -> Result<Option<i32>> {
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| MediaError::ProcessError(format!("Failed to run '{}': {}", program, e)))?;
        Ok(status.code())
    }

    async fn output(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| MediaError::ProcessError(format!("Failed to run '{}': {}", program, e)))?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Installs the Python stack step by step, then checks that it imports.
pub struct Bootstrapper<R = SystemRunner> {
    config: BootstrapConfig,
    runner: R,
}

impl Bootstrapper<SystemRunner> {
    pub fn new(config: BootstrapConfig) -> Self {
        Self::with_runner(config, SystemRunner)
    }
}

impl<R: CommandRunner> Bootstrapper<R> {
    pub fn with_runner(config: BootstrapConfig, runner: R) -> Self {
        Self { config, runner }
    }

    pub async fn run(&self) -> Result<()> {
        self.install_all().await?;
        self.verify().await
    }

    /// Stops at the first step that exits non-zero.
    pub async fn install_all(&self) -> Result<()> {
        for step in &self.config.steps {
            log::info!("📦 Installing {}", step.label);

            let code = self
                .runner
                .status(&self.config.python, &install_args(step))
                .await?;

            if code != Some(0) {
                log::error!("Installing {} failed with exit code {:?}", step.label, code);
                return Err(MediaError::InstallFailed {
                    step: step.label.clone(),
                    code,
                });
            }
        }
        Ok(())
    }

    pub async fn verify(&self) -> Result<()> {
        let Some(Verification {
            script,
            fallback_script,
        }) = &self.config.verification
        else {
            return Ok(());
        };

        log::info!("🔍 Verifying installation");
        let output = self
            .runner
            .output(&self.config.python, &python_script(script))
            .await?;

        if !output.stdout.is_empty() {
            println!("{}", output.stdout.trim_end());
        }

        if output.success() {
            return Ok(());
        }

        log::error!("ERROR: {}", output.stderr.trim_end());
        match self
            .runner
            .status(&self.config.python, &python_script(fallback_script))
            .await
        {
            Ok(Some(0)) => {}
            Ok(code) => log::warn!("Diagnostic command exited with {:?}", code),
            Err(e) => log::warn!("Diagnostic command failed: {}", e),
        }

        Err(MediaError::VerificationFailed(output.stderr))
    }
}

pub fn install_args(step: &InstallStep) -> Vec<String> {
    let mut args: Vec<String> = ["-m", "pip", "install", "-q"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    args.extend(step.packages.iter().cloned());
    args
}

fn python_script(script: &str) -> Vec<String> {
    vec!["-c".to_string(), script.to_string()]
}
