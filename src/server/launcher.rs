use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use super::forwarder::forward_output;
use super::poller::{HealthPoller, HealthProbe, Readiness};
use crate::config::LaunchConfig;
use crate::error::{MediaError, Result};
use crate::logger;

/// The spawned server process, as far as shutdown is concerned.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChildHandle: Send {
    /// Stops the process and reaps it. A no-op if it already exited.
    async fn terminate(&mut self) -> Result<()>;
}

pub struct ServerChild {
    child: Child,
    stop_timeout: Duration,
}

impl ServerChild {
    pub fn new(child: Child, stop_timeout: Duration) -> Self {
        Self {
            child,
            stop_timeout,
        }
    }

    /// Sends SIGTERM so the server can reap its workers.
    ///
    /// Returns true if the child exited within `stop_timeout`.
    #[cfg(unix)]
    async fn request_stop(&mut self) -> Result<bool> {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let Some(id) = self.child.id() else {
            return Ok(true);
        };

        if let Err(e) = kill(Pid::from_raw(id as i32), Signal::SIGTERM) {
            log::warn!("Failed to send SIGTERM to server: {}", e);
            return Ok(false);
        }

        match tokio::time::timeout(self.stop_timeout, self.child.wait()).await {
            Ok(status) => {
                log::debug!("Server exited with {}", status?);
                Ok(true)
            }
            Err(_) => {
                log::warn!(
                    "Server still running {}s after SIGTERM, killing it",
                    self.stop_timeout.as_secs()
                );
                Ok(false)
            }
        }
    }

    #[cfg(not(unix))]
    async fn request_stop(&mut self) -> Result<bool> {
        Ok(false)
    }
}

#[async_trait]
impl ChildHandle for ServerChild {
    async fn terminate(&mut self) -> Result<()> {
        if let Some(status) = self.child.try_wait()? {
            log::debug!("Server already exited with {}", status);
            return Ok(());
        }

        if self.request_stop().await? {
            return Ok(());
        }

        self.child
            .start_kill()
            .map_err(|e| MediaError::ProcessError(format!("Failed to stop server: {}", e)))?;
        let status = self.child.wait().await?;
        log::debug!("Server exited with {}", status);
        Ok(())
    }
}

pub struct ServerLauncher {
    config: LaunchConfig,
}

impl ServerLauncher {
    pub fn new(config: LaunchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    /// Spawns the server and starts forwarding its output to the console.
    pub fn spawn(&self) -> Result<RunningServer> {
        logger::log_launch_info(&self.config);

        let mut child = Command::new(&self.config.program)
            .args(self.config.args())
            .env("PYTHONUNBUFFERED", "1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                MediaError::ProcessError(format!(
                    "Failed to start '{}': {}",
                    self.config.program, e
                ))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MediaError::ProcessError("server stdout not captured".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::ProcessError("server stderr not captured".into()))?;

        let prefix = self.config.output_prefix.clone();
        let forwarder = tokio::spawn(forward_output(stdout, stderr, prefix, |line| {
            println!("{}", line)
        }));

        Ok(RunningServer {
            child: ServerChild::new(child, self.config.stop_timeout),
            forwarder: Some(forwarder),
            shutdown_grace: self.config.shutdown_grace,
        })
    }
}

pub struct RunningServer {
    child: ServerChild,
    forwarder: Option<JoinHandle<usize>>,
    shutdown_grace: Duration,
}

impl RunningServer {
    pub fn id(&self) -> Option<u32> {
        self.child.child.id()
    }

    pub async fn wait_until_ready<P>(&mut self, poller: &mut HealthPoller, probe: &P) -> Result<u32>
    where
        P: HealthProbe + ?Sized,
    {
        await_ready(poller, probe, &mut self.child).await
    }

    /// Stops the server, then gives the forwarder a short grace period to drain.
    pub async fn shutdown(mut self) -> Result<()> {
        let result = self.child.terminate().await;

        if let Some(forwarder) = self.forwarder.take() {
            match tokio::time::timeout(self.shutdown_grace, forwarder).await {
                Ok(Ok(lines)) => log::debug!("Forwarded {} server lines", lines),
                Ok(Err(e)) => log::warn!("Output forwarder failed: {}", e),
                Err(_) => log::warn!("Output forwarder still running after shutdown grace"),
            }
        }

        result
    }
}

/// Waits for readiness; terminates `child` exactly once if it never gets there.
///
/// Returns the number of probes it took. A surfaced probe error also stops the child.
pub async fn await_ready<P, C>(poller: &mut HealthPoller, probe: &P, child: &mut C) -> Result<u32>
where
    P: HealthProbe + ?Sized,
    C: ChildHandle + ?Sized,
{
    match poller.wait_until_ready(probe).await {
        Ok(Readiness::Ready { attempts, .. }) => Ok(attempts),
        Ok(Readiness::TimedOut { attempts }) => {
            log::error!("Server failed to start!");
            if let Err(e) = child.terminate().await {
                log::warn!("Failed to stop server: {}", e);
            }
            Err(MediaError::ServerTimeout { attempts })
        }
        Err(e) => {
            if let Err(kill_err) = child.terminate().await {
                log::warn!("Failed to stop server: {}", kill_err);
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProbe {
        answer: fn() -> Result<bool>,
    }

    #[async_trait]
    impl HealthProbe for FixedProbe {
        async fn probe(&self) -> Result<bool> {
            (self.answer)()
        }
    }

    #[tokio::test]
    async fn test_timeout_terminates_child_once() {
        let probe = FixedProbe {
            answer: || Err(MediaError::Unreachable("connection refused".into())),
        };
        let mut poller = HealthPoller::new(3, Duration::ZERO);
        let mut child = MockChildHandle::new();
        child.expect_terminate().times(1).returning(|| Ok(()));

        let err = await_ready(&mut poller, &probe, &mut child).await.unwrap_err();

        assert!(matches!(err, MediaError::ServerTimeout { attempts: 3 }));
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_ready_leaves_child_running() {
        let probe = FixedProbe { answer: || Ok(true) };
        let mut poller = HealthPoller::new(3, Duration::ZERO);
        let mut child = MockChildHandle::new();
        child.expect_terminate().times(0);

        let attempts = await_ready(&mut poller, &probe, &mut child).await.unwrap();

        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn test_timeout_reported_even_if_terminate_fails() {
        let probe = FixedProbe { answer: || Ok(false) };
        let mut poller = HealthPoller::new(2, Duration::ZERO);
        let mut child = MockChildHandle::new();
        child
            .expect_terminate()
            .times(1)
            .returning(|| Err(MediaError::ProcessError("no such process".into())));

        let err = await_ready(&mut poller, &probe, &mut child).await.unwrap_err();

        assert!(matches!(err, MediaError::ServerTimeout { attempts: 2 }));
    }

    #[tokio::test]
    async fn test_spawn_failure_is_process_error() {
        let mut config = LaunchConfig::new();
        config.program = "definitely-not-an-installed-server-binary".to_string();

        let err = ServerLauncher::new(config).spawn().err().unwrap();

        assert!(matches!(err, MediaError::ProcessError(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_real_child_shutdown() {
        let mut config = LaunchConfig::new().with_max_attempts(1);
        // `sleep serve ...` fails fast with a usage error, which is enough to exercise spawn + reap
        config.program = "sleep".to_string();

        let server = ServerLauncher::new(config).spawn().unwrap();
        assert!(server.shutdown().await.is_ok());
    }

    #[cfg(unix)]
    fn shell_child(script: &str) -> Child {
        Command::new("sh")
            .args(["-c", script])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .unwrap()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_terminate_lets_server_run_term_handler() {
        let dir = tempfile::tempdir().unwrap();
        let flag = dir.path().join("cleaned");
        let script = format!(
            "trap 'echo cleaned > {}; exit 0' TERM; sleep 30 & wait",
            flag.display()
        );
        let mut child = ServerChild::new(shell_child(&script), Duration::from_secs(5));
        // give the shell time to install its trap
        tokio::time::sleep(Duration::from_millis(300)).await;

        child.terminate().await.unwrap();

        assert_eq!(std::fs::read_to_string(&flag).unwrap().trim(), "cleaned");
        assert!(child.child.try_wait().unwrap().is_some());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_terminate_kills_server_ignoring_sigterm() {
        let mut child = ServerChild::new(
            shell_child("trap '' TERM; while true; do sleep 1; done"),
            Duration::from_millis(300),
        );
        tokio::time::sleep(Duration::from_millis(300)).await;

        tokio::time::timeout(Duration::from_secs(10), child.terminate())
            .await
            .expect("terminate should not hang")
            .unwrap();

        assert!(child.child.try_wait().unwrap().is_some());
    }
}
