//! Session identities and the auth-provider seam.
//!
//! Credential storage, password hashing, and token issuance all live in the
//! hosted auth service; this module only defines the contract the rest of the
//! crate consumes. The provider additionally broadcasts session transitions so
//! the [`crate::watcher`] can re-resolve on every sign-in, sign-out, and token
//! refresh.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

pub mod errors;
pub mod memory;

pub use errors::AuthError;
pub use memory::MemoryAuth;

/// The raw authenticated identity the hosted auth service vouches for.
///
/// Consumed only — this crate never creates or destroys sessions, it reacts
/// to them. The subject id doubles as the primary key of the application-level
/// `users` row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    /// Opaque subject id assigned by the auth service.
    pub subject_id: String,

    /// Email the subject authenticated with, when the provider shares it.
    pub email: Option<String>,
}

impl SessionIdentity {
    /// Construct an identity with an email attached.
    pub fn with_email(subject_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            email: Some(email.into()),
        }
    }
}

/// A session transition published by the auth provider.
///
/// Every variant triggers a fresh resolution; the watcher re-reads the current
/// session from the provider rather than trusting any payload here, so the
/// event stays a lightweight signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// A session was established (password sign-in or sign-up).
    SignedIn,
    /// The session ended.
    SignedOut,
    /// The session's token was refreshed; identity is unchanged.
    TokenRefreshed,
}

/// Capacity of the session-event broadcast channel.
///
/// Transitions are rare (human-driven); a lagged receiver just re-resolves.
pub const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Client interface to the hosted auth service.
///
/// Implementations must be shareable across tasks; all methods take `&self`.
/// Credential errors carry the provider's message verbatim — the sign-in and
/// sign-up forms surface it to the end user unchanged.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Current session, if any.
    ///
    /// `Ok(None)` means "not signed in" — a normal state, not an error.
    async fn session(&self) -> Result<Option<SessionIdentity>, AuthError>;

    /// Exchange an email/password pair for a session.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionIdentity, AuthError>;

    /// Register a new account and establish its session.
    async fn sign_up(&self, email: &str, password: &str) -> Result<SessionIdentity, AuthError>;

    /// End the current session. Succeeds when no session exists.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Subscribe to session transitions.
    ///
    /// Fires on sign-in, sign-out, and token refresh. Receivers that lag are
    /// expected to treat the gap as "something changed" and re-resolve.
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}
