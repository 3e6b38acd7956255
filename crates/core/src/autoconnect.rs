//! Auto-connect: the one place allowed to discover on a caller's behalf.

use crate::manager::SessionManager;
use crate::registry::TargetRegistry;
use crate::session::Session;
use parking_lot::Mutex;
use std::sync::Arc;
use uidriver_protocol::{Target, TargetKind};
use uidriver_runtime::{Error, Result};

/// Connects callers to "whatever page target is there".
///
/// Remembers the last chosen target id across calls, but the memory is
/// disposable: [`AutoConnectPolicy::reset`] discards it and the next call
/// re-derives everything from a fresh discovery.
pub struct AutoConnectPolicy {
    registry: TargetRegistry,
    remembered: Mutex<Option<String>>,
}

impl AutoConnectPolicy {
    pub fn new(registry: TargetRegistry) -> Self {
        Self {
            registry,
            remembered: Mutex::new(None),
        }
    }

    /// Returns a connected session, reusing the remembered target when
    /// its session is still live, otherwise discovering, picking the
    /// first page-kind target in directory order, and connecting it.
    pub async fn ensure_connected(
        &self,
        manager: &SessionManager,
    ) -> Result<(Arc<Session>, String)> {
        if let Some(target_id) = self.remembered.lock().clone() {
            if let Some(session) = manager.session(&target_id) {
                if session.is_connected() {
                    return Ok((session, target_id));
                }
            }
        }

        let targets = self.registry.list().await?;
        let target = pick_page_target(&targets).ok_or_else(|| self.no_targets_error())?;

        tracing::debug!(target_id = %target.id, title = %target.title, "auto-connecting");
        let session = manager.connect(target).await?;
        *self.remembered.lock() = Some(target.id.clone());
        Ok((session, target.id.clone()))
    }

    /// Forgets the remembered target id.
    pub fn reset(&self) {
        *self.remembered.lock() = None;
    }

    fn no_targets_error(&self) -> Error {
        Error::NoTargets(format!(
            "no debuggable page targets at {host}:{port}. Start the application with remote \
             debugging enabled (for example, launch it with --remote-debugging-port={port}) \
             and try again.",
            host = self.registry.host(),
            port = self.registry.port()
        ))
    }
}

/// First page-kind target in directory order. Deterministic: discovery
/// order is preserved, never re-sorted.
fn pick_page_target(targets: &[Target]) -> Option<&Target> {
    targets.iter().find(|target| target.kind == TargetKind::Page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(id: &str, kind: TargetKind) -> Target {
        Target {
            id: id.into(),
            kind,
            title: String::new(),
            url: String::new(),
            channel_address: Some(format!("ws://localhost:9222/session/{id}")),
            frontend_url: None,
        }
    }

    #[test]
    fn picks_first_page_target_in_original_order() {
        let targets = vec![
            target("w1", TargetKind::Webview),
            target("p1", TargetKind::Page),
            target("p2", TargetKind::Page),
        ];
        assert_eq!(pick_page_target(&targets).unwrap().id, "p1");
    }

    #[test]
    fn no_page_targets_means_no_pick() {
        let targets = vec![
            target("w1", TargetKind::Webview),
            target("x1", TargetKind::Other),
        ];
        assert!(pick_page_target(&targets).is_none());
    }

    #[test]
    fn no_targets_error_names_the_remediation() {
        let policy = AutoConnectPolicy::new(TargetRegistry::new("localhost", 9222));
        let err = policy.no_targets_error();
        let message = err.to_string();
        assert!(message.contains("localhost:9222"));
        assert!(message.contains("--remote-debugging-port=9222"));
    }
}
