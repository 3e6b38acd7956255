use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::output::OutputFormat;
use uidriver::{AutoConnectPolicy, Session, SessionManager, TargetRegistry};

/// Everything a command needs to run: the output format plus an explicit
/// session manager and auto-connect policy, constructed per invocation
/// and torn down when the command finishes.
pub struct CommandContext {
    pub format: OutputFormat,
    pub registry: TargetRegistry,
    pub manager: SessionManager,
    pub policy: AutoConnectPolicy,
}

impl CommandContext {
    pub fn new(host: String, port: u16, request_timeout: Duration, format: OutputFormat) -> Self {
        let registry = TargetRegistry::new(host, port);
        Self {
            format,
            policy: AutoConnectPolicy::new(registry.clone()),
            manager: SessionManager::with_request_timeout(request_timeout),
            registry,
        }
    }

    /// Returns a connected session via the auto-connect policy.
    pub async fn session(&self) -> Result<(Arc<Session>, String)> {
        Ok(self.policy.ensure_connected(&self.manager).await?)
    }
}
