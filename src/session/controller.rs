//!
//! alumnae session controller
//! --------------------------
//! Single writer of the bearer token. Keeps the in-memory session and durable storage in step:
//! - `restore_session` runs once at startup and always settles on Anonymous or Authenticated;
//! - `login` / `register` update memory, then persist, then hand the payload back;
//! - `logout` is best-effort towards the backend and unconditional locally.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::error::ClientResult;
use crate::http::ApiClient;
use crate::models::{AuthPayload, Credentials, Registration, UserRecord};

use super::state::{Session, SessionContext, SessionPhase, SessionState};

/// Fallback messages when the backend gave no reason.
pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTRATION_FAILED: &str = "Registration failed";

pub struct SessionController {
    client: ApiClient,
    context: Arc<SessionContext>,
    restored: AtomicBool,
}

impl SessionController {
    /// Take ownership of `client` and wire its 401 handling to this controller's session.
    pub fn new(client: ApiClient) -> Self {
        let context = Arc::new(SessionContext::new());
        let client = client.with_session(context.clone());
        Self { client, context, restored: AtomicBool::new(false) }
    }

    /// Client for domain reads and writes; shares this controller's session.
    pub fn client(&self) -> &ApiClient { &self.client }

    pub fn context(&self) -> Arc<SessionContext> { self.context.clone() }

    pub fn state(&self) -> SessionState { self.context.state() }

    pub fn phase(&self) -> SessionPhase { self.context.phase() }

    pub fn is_authenticated(&self) -> bool { self.context.is_authenticated() }

    pub fn token(&self) -> Option<String> { self.context.token() }

    pub fn user(&self) -> Option<UserRecord> { self.context.user() }

    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> { self.context.subscribe() }

    /// Validate a previously stored token against `/auth/me`.
    ///
    /// Never fails: any problem clears the stored token and lands on Anonymous. Only the
    /// first call does any work; later calls report the current phase.
    pub async fn restore_session(&self) -> SessionPhase {
        if self.restored.swap(true, Ordering::SeqCst) {
            warn!("restore_session called more than once; keeping current session");
            return self.phase();
        }

        let stored = match self.client.tokens().get() {
            Ok(t) => t,
            Err(e) => {
                warn!("could not read stored token: {}", e);
                None
            }
        };
        let Some(token) = stored else {
            info!("no stored session");
            return self.settle_anonymous();
        };

        // A login may finish while /auth/me is in flight; only the token read above is ours
        // to adopt or discard.
        match self.client.me().await {
            Ok(user) => {
                if self.context.establish_if_initializing(Session { token, user: user.clone() }) {
                    info!(user = %user.display_name(), "restored session");
                } else {
                    info!("session settled during restore; keeping it");
                }
                self.phase()
            }
            Err(e) => {
                info!("stored session rejected: {}", e);
                if let Err(e) = self.client.tokens().clear_if(&token) {
                    error!("failed to clear rejected token: {}", e);
                }
                self.settle_anonymous()
            }
        }
    }

    /// Leave Initializing for Anonymous unless a concurrent login already signed in.
    fn settle_anonymous(&self) -> SessionPhase {
        self.context.clear_if_initializing();
        self.phase()
    }

    /// Sign in with a username or email and a secret.
    ///
    /// On error nothing changes; present `err.user_message(LOGIN_FAILED)` to the user.
    pub async fn login(&self, identifier: &str, secret: &str) -> ClientResult<AuthPayload> {
        let credentials = Credentials { login: identifier.to_string(), password: secret.to_string() };
        let payload = self.client.login(&credentials).await.map_err(|e| {
            warn!(identifier, "login failed: {}", e);
            e
        })?;
        self.adopt(&payload)?;
        info!(user = %payload.data.display_name(), "logged in");
        Ok(payload)
    }

    pub async fn register(&self, username: &str, email: &str, secret: &str) -> ClientResult<AuthPayload> {
        let registration = Registration {
            username: username.to_string(),
            email: email.to_string(),
            password: secret.to_string(),
        };
        let payload = self.client.register(&registration).await.map_err(|e| {
            warn!(username, "registration failed: {}", e);
            e
        })?;
        self.adopt(&payload)?;
        info!(user = %payload.data.display_name(), "registered and logged in");
        Ok(payload)
    }

    /// Memory first, then storage. A storage failure rolls memory back so the two never
    /// disagree after the call returns.
    fn adopt(&self, payload: &AuthPayload) -> ClientResult<()> {
        let previous = self.context.establish(Session { token: payload.token.clone(), user: payload.data.clone() });
        if let Err(e) = self.client.tokens().set(&payload.token) {
            error!("failed to persist session token: {}", e);
            self.context.replace(previous);
            return Err(e.into());
        }
        Ok(())
    }

    /// Sign out. The backend call may fail; the local session is gone regardless.
    pub async fn logout(&self) {
        if let Err(e) = self.client.logout().await {
            warn!("logout request failed, clearing local session anyway: {}", e);
        }
        self.context.clear();
        if let Err(e) = self.client.tokens().clear() {
            error!("failed to remove stored token on logout: {}", e);
        }
        info!("logged out");
    }
}
