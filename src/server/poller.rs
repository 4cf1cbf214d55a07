use async_trait::async_trait;
use std::time::{Duration, Instant};

use crate::config::LaunchConfig;
use crate::error::Result;

/// One readiness check against the server.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// `Ok(true)` only when the server reports healthy.
    async fn probe(&self) -> Result<bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Starting,
    Polling { attempt: u32 },
    Ready { attempts: u32, elapsed: Duration },
    TimedOut { attempts: u32 },
}

/// How a completed wait ended. Attempts are counted from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready { attempts: u32, elapsed: Duration },
    TimedOut { attempts: u32 },
}

pub struct HealthPoller {
    max_attempts: u32,
    interval: Duration,
    state: ServerState,
}

impl HealthPoller {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
            state: ServerState::Starting,
        }
    }

    pub fn from_config(config: &LaunchConfig) -> Self {
        Self::new(config.max_attempts, config.poll_interval)
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    /// Probes until the first healthy answer or until attempts run out.
    ///
    /// Unreachable-server errors are treated as "not ready yet". Any other
    /// probe error ends polling immediately and is returned.
    pub async fn wait_until_ready<P>(&mut self, probe: &P) -> Result<Readiness>
    where
        P: HealthProbe + ?Sized,
    {
        let started = Instant::now();

        for attempt in 1..=self.max_attempts {
            self.state = ServerState::Polling { attempt };

            match probe.probe().await {
                Ok(true) => {
                    log::info!(
                        "✅ Server ready after {} seconds!",
                        started.elapsed().as_secs()
                    );
                    let elapsed = started.elapsed();
                    self.state = ServerState::Ready {
                        attempts: attempt,
                        elapsed,
                    };
                    return Ok(Readiness::Ready {
                        attempts: attempt,
                        elapsed,
                    });
                }
                Ok(false) => {}
                Err(e) if e.is_unreachable() => log::trace!("Probe {}: {}", attempt, e),
                Err(e) => return Err(e),
            }

            if attempt % 30 == 0 {
                log::info!(
                    "⏳ Still waiting for server ({}s elapsed)",
                    started.elapsed().as_secs()
                );
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.interval).await;
            }
        }

        self.state = ServerState::TimedOut {
            attempts: self.max_attempts,
        };
        Ok(Readiness::TimedOut {
            attempts: self.max_attempts,
        })
    }
}
