//! Session-scoped conversation memory.
//!
//! Each session id owns an ordered turn history. Sessions are created
//! lazily on first use and live for the process lifetime — no expiry or
//! truncation policy is applied here, deliberately: the store is the single
//! owner of histories, so such a policy can be added in one place later.
//!
//! Access is never through a bare shared map. The outer registry hands out
//! per-session handles; the handle's async mutex serializes turns within one
//! session (held across generation) while distinct sessions proceed
//! independently.

use crate::types::Turn;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Session id used when the caller does not specify one.
pub const DEFAULT_SESSION_ID: &str = "default";

/// Exclusive handle to one session's turn history.
pub type SessionHandle = Arc<Mutex<Vec<Turn>>>;

/// Registry of per-session histories keyed by opaque session id.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the handle for a session, creating an empty history on first use.
    ///
    /// Lock the returned handle to read or append turns; holding it across
    /// the generation call is what keeps concurrent turns on one session
    /// from interleaving their appends.
    pub fn handle(&self, session_id: &str) -> SessionHandle {
        if let Some(handle) = self.sessions.read().get(session_id) {
            return Arc::clone(handle);
        }

        let mut sessions = self.sessions.write();
        // A racing caller may have created it between the two locks.
        Arc::clone(
            sessions
                .entry(session_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(Vec::new()))),
        )
    }

    /// Snapshot of a session's history, oldest turn first. Unseen session
    /// ids yield an empty history without creating the session.
    pub async fn history(&self, session_id: &str) -> Vec<Turn> {
        let handle = {
            let sessions = self.sessions.read();
            sessions.get(session_id).cloned()
        };
        match handle {
            Some(handle) => handle.lock().await.clone(),
            None => Vec::new(),
        }
    }

    /// Number of sessions created so far.
    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }
}
