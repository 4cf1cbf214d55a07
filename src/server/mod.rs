pub mod forwarder;
pub mod launcher;
pub mod poller;

pub use forwarder::forward_output;
pub use launcher::{await_ready, ChildHandle, RunningServer, ServerChild, ServerLauncher};
pub use poller::{HealthPoller, HealthProbe, Readiness, ServerState};
