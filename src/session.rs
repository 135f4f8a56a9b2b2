//! Auth session tracking.
//!
//! [`SessionTracker`] wraps an [`AuthClient`] (whatever identity backend the
//! application uses) and keeps the latest session in a watch channel. Callers
//! read a snapshot with [`SessionTracker::current`] or follow changes with
//! [`SessionTracker::subscribe`]. Backend-originated changes such as token
//! expiry or a sign-out from another device flow through the same channel as
//! local sign-in and sign-out calls, so there is a single source of truth for
//! "who is signed in".

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::errors::Result;

/// An authenticated user's session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Stable unique id of the signed-in user; every product row is scoped
    /// to this value
    pub user_id: String,
    /// Email the user signed in with
    pub email: String,
}

/// Backend that actually performs authentication.
///
/// Implementations wrap the application's identity provider. The tracker
/// only needs these calls; credential storage, token refresh, and transport
/// all stay behind the trait.
#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Signs in with an email/password pair and returns the new session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Registers a new account and returns its session.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session>;

    /// Ends the current session on the backend.
    async fn sign_out(&self) -> Result<()>;

    /// The session persisted from an earlier run, if any.
    async fn current_session(&self) -> Result<Option<Session>>;

    /// Stream of session changes pushed by the backend.
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;
}

/// Tracks the current session and fans out changes to any number of readers.
pub struct SessionTracker {
    auth: Arc<dyn AuthClient>,
    sessions: Arc<watch::Sender<Option<Session>>>,
    forwarder: JoinHandle<()>,
}

impl SessionTracker {
    /// Starts tracking: restores any persisted session, then follows the
    /// backend's change stream until the tracker is dropped.
    pub async fn new(auth: Arc<dyn AuthClient>) -> Result<Self> {
        // Subscribe before reading the initial snapshot so a change landing
        // in between still wakes the forwarder.
        let mut updates = auth.subscribe();
        let initial = auth.current_session().await?;

        let sessions = Arc::new(watch::channel(initial).0);
        let forward_to = Arc::clone(&sessions);
        let forwarder = tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let session = updates.borrow_and_update().clone();
                debug!(
                    "Session change from backend (signed in: {})",
                    session.is_some()
                );
                forward_to.send_replace(session);
            }
        });

        Ok(Self {
            auth,
            sessions,
            forwarder,
        })
    }

    /// Signs in and applies the resulting session immediately, without
    /// waiting for the backend's change stream to echo it.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let session = self.auth.sign_in(email, password).await?;
        info!("User {} signed in", session.user_id);
        self.sessions.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Registers a new account and applies its session immediately.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session> {
        let session = self.auth.sign_up(email, password).await?;
        info!("User {} signed up", session.user_id);
        self.sessions.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Signs out and clears the tracked session.
    ///
    /// The session is cleared only after the backend call succeeds, so a
    /// failed sign-out leaves the current session in place.
    pub async fn sign_out(&self) -> Result<()> {
        self.auth.sign_out().await?;
        info!("Signed out");
        self.sessions.send_replace(None);
        Ok(())
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.sessions.borrow().clone()
    }

    /// The signed-in user's id, if anyone is signed in.
    #[must_use]
    pub fn user_id(&self) -> Option<String> {
        self.sessions.borrow().as_ref().map(|s| s.user_id.clone())
    }

    /// Follows session changes; the receiver always holds the latest value.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sessions.subscribe()
    }
}

impl Drop for SessionTracker {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}
