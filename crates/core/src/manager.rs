//! Ownership and lifecycle of concurrent sessions, keyed by target id.

use crate::session::Session;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uidriver_protocol::Target;
use uidriver_protocol::options::DEFAULT_REQUEST_TIMEOUT_MS;
use uidriver_runtime::Result;

/// The single point of entry for all target operations.
///
/// Holds at most one live [`Session`] per target id. This is the one
/// piece of process-wide mutable state in the core, held explicitly by
/// whoever drives operations rather than living in a module-level
/// global.
pub struct SessionManager {
    request_timeout: Duration,
    sessions: Mutex<HashMap<String, Arc<Session>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::with_request_timeout(Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS))
    }

    /// Overrides the per-request deadline applied to every session this
    /// manager opens.
    pub fn with_request_timeout(request_timeout: Duration) -> Self {
        Self {
            request_timeout,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Opens (or returns) the session for `target`.
    ///
    /// Idempotent: a target that is already connected is returned as-is
    /// without re-enabling domains. Concurrent calls for the same target
    /// id share one session and therefore one underlying channel; the
    /// second caller awaits the first caller's in-flight attempt.
    pub async fn connect(&self, target: &Target) -> Result<Arc<Session>> {
        let session = {
            let mut sessions = self.sessions.lock();
            match sessions.get(&target.id) {
                Some(existing) => Arc::clone(existing),
                None => {
                    let session = Arc::new(Session::for_target(target, self.request_timeout)?);
                    sessions.insert(target.id.clone(), Arc::clone(&session));
                    session
                }
            }
        };

        if let Err(err) = session.connect().await {
            // Drop the failed entry, but only if it is still ours; a
            // concurrent retry may already have replaced it.
            let mut sessions = self.sessions.lock();
            if let Some(current) = sessions.get(&target.id) {
                if Arc::ptr_eq(current, &session) {
                    sessions.remove(&target.id);
                }
            }
            return Err(err);
        }

        Ok(session)
    }

    /// Returns the tracked session for `target_id`, if any.
    pub fn session(&self, target_id: &str) -> Option<Arc<Session>> {
        self.sessions.lock().get(target_id).cloned()
    }

    pub fn is_connected(&self, target_id: &str) -> bool {
        self.session(target_id)
            .map(|session| session.is_connected())
            .unwrap_or(false)
    }

    /// Ids of every tracked session.
    pub fn target_ids(&self) -> Vec<String> {
        self.sessions.lock().keys().cloned().collect()
    }

    /// Closes and forgets the session for `target_id`.
    ///
    /// Close is best-effort cleanup: failures are logged, never surfaced,
    /// and the entry is removed regardless.
    pub async fn disconnect(&self, target_id: &str) {
        let session = self.sessions.lock().remove(target_id);
        if let Some(session) = session {
            if let Err(err) = session.close().await {
                tracing::debug!(target_id, error = %err, "channel close failed during disconnect");
            }
        }
    }

    /// Closes every tracked session concurrently and waits for all of
    /// them, so "no sessions remain" holds on return. Idempotent.
    pub async fn disconnect_all(&self) {
        let sessions: Vec<(String, Arc<Session>)> = self.sessions.lock().drain().collect();
        let closes = sessions.into_iter().map(|(target_id, session)| async move {
            if let Err(err) = session.close().await {
                tracing::debug!(
                    target_id = %target_id,
                    error = %err,
                    "channel close failed during disconnect"
                );
            }
        });
        futures_util::future::join_all(closes).await;
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
