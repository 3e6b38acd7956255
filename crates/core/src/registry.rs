//! Target discovery against the host application's directory endpoint.

use uidriver_protocol::Target;
use uidriver_runtime::{Error, Result};

/// Discovers addressable targets from `http://{host}:{port}/json/list`.
///
/// Discovery is cheap and idempotent, so there is no retry here; callers
/// retry by calling [`TargetRegistry::list`] again. Every call returns a
/// fresh, order-preserved snapshot that replaces the previous one.
#[derive(Clone)]
pub struct TargetRegistry {
    host: String,
    port: u16,
    client: reqwest::Client,
}

impl TargetRegistry {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            client: reqwest::Client::new(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Lists the currently debuggable targets, in directory order.
    pub async fn list(&self) -> Result<Vec<Target>> {
        let url = format!("http://{}:{}/json/list", self.host, self.port);
        tracing::debug!(%url, "discovering targets");

        let response = self.client.get(&url).send().await.map_err(|err| {
            if err.is_connect() {
                // Unreachable endpoint means the application is not
                // listening; callers surface this distinctly from a
                // generic network failure.
                Error::Discovery(format!(
                    "nothing is listening on {}:{}; is the application running with remote \
                     debugging enabled? ({err})",
                    self.host, self.port
                ))
            } else {
                Error::Discovery(format!("request to {url} failed: {err}"))
            }
        })?;

        let response = response
            .error_for_status()
            .map_err(|err| Error::Discovery(format!("directory endpoint rejected {url}: {err}")))?;

        let targets: Vec<Target> = response
            .json()
            .await
            .map_err(|err| Error::Discovery(format!("malformed target list from {url}: {err}")))?;

        tracing::debug!(count = targets.len(), "targets discovered");
        Ok(targets)
    }
}
