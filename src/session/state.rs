use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::info;

use crate::models::UserRecord;

/// Coarse authentication phase, cheap to copy and to broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Initializing,
    Anonymous,
    Authenticated,
}

/// Token and user of a signed-in session. They only ever exist together.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: UserRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Initializing,
    Anonymous,
    Authenticated(Session),
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match self {
            SessionState::Initializing => SessionPhase::Initializing,
            SessionState::Anonymous => SessionPhase::Anonymous,
            SessionState::Authenticated(_) => SessionPhase::Authenticated,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(s) => Some(s),
            _ => None,
        }
    }
}

/// In-memory session shared between the controller and the HTTP client.
///
/// Every mutation swaps the whole state under the lock and then publishes the new phase;
/// the lock is never held across an await.
#[derive(Debug)]
pub struct SessionContext {
    state: RwLock<SessionState>,
    phase_tx: watch::Sender<SessionPhase>,
}

impl Default for SessionContext {
    fn default() -> Self { Self::new() }
}

impl SessionContext {
    pub fn new() -> Self {
        let (phase_tx, _) = watch::channel(SessionPhase::Initializing);
        Self { state: RwLock::new(SessionState::Initializing), phase_tx }
    }

    pub fn state(&self) -> SessionState { self.state.read().clone() }

    pub fn phase(&self) -> SessionPhase { self.state.read().phase() }

    pub fn is_authenticated(&self) -> bool { self.phase() == SessionPhase::Authenticated }

    pub fn token(&self) -> Option<String> { self.state.read().session().map(|s| s.token.clone()) }

    pub fn user(&self) -> Option<UserRecord> { self.state.read().session().map(|s| s.user.clone()) }

    /// Watch phase transitions. Front ends redirect to login on `Authenticated -> Anonymous`.
    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> { self.phase_tx.subscribe() }

    /// Replace the state wholesale, returning the previous one.
    pub(crate) fn replace(&self, next: SessionState) -> SessionState {
        let phase = next.phase();
        let previous = std::mem::replace(&mut *self.state.write(), next);
        self.phase_tx.send_replace(phase);
        previous
    }

    pub(crate) fn establish(&self, session: Session) -> SessionState {
        self.replace(SessionState::Authenticated(session))
    }

    pub(crate) fn clear(&self) -> SessionState {
        self.replace(SessionState::Anonymous)
    }

    /// Move out of Initializing, atomically. Startup restore uses this so it never
    /// overwrites a login that finished while it was validating.
    fn settle(&self, next: SessionState) -> bool {
        let phase = next.phase();
        let mut guard = self.state.write();
        if !matches!(*guard, SessionState::Initializing) {
            return false;
        }
        *guard = next;
        drop(guard);
        self.phase_tx.send_replace(phase);
        true
    }

    pub(crate) fn establish_if_initializing(&self, session: Session) -> bool {
        self.settle(SessionState::Authenticated(session))
    }

    pub(crate) fn clear_if_initializing(&self) -> bool {
        self.settle(SessionState::Anonymous)
    }

    /// Credential expiry reported by the HTTP client for a request sent with `token`.
    /// Only a signed-in session holding that same token moves; a newer login survives a
    /// late 401 for the token it replaced.
    pub(crate) fn expire(&self, token: &str) -> bool {
        let mut guard = self.state.write();
        match &*guard {
            SessionState::Authenticated(s) if s.token == token => {}
            _ => return false,
        }
        *guard = SessionState::Anonymous;
        drop(guard);
        self.phase_tx.send_replace(SessionPhase::Anonymous);
        info!("session expired, signed out");
        true
    }
}
