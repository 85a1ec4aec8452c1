//! In-process auth provider.
//!
//! A first-class in-memory stand-in for the hosted auth service, suitable for
//! development and tests. Accounts live in a `RwLock<HashMap>`; subject ids are
//! random v4 uuids, matching the shape the hosted service issues.
//!
//! Passwords are compared in plaintext here — the real service owns hashing,
//! and this double exists to exercise session flows, not credential storage.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::{AuthError, AuthProvider, EVENT_CHANNEL_CAPACITY, SessionEvent, SessionIdentity};

/// Credential messages mirroring the hosted provider's wording, so tests of
/// the "surface verbatim" contract exercise realistic strings.
const INVALID_LOGIN: &str = "Invalid login credentials";
const ALREADY_REGISTERED: &str = "User already registered";

#[derive(Clone, Debug)]
struct Account {
    subject_id: String,
    password: String,
}

/// In-memory implementation of [`AuthProvider`].
#[derive(Debug)]
pub struct MemoryAuth {
    /// Registered accounts keyed by email.
    accounts: RwLock<HashMap<String, Account>>,
    /// The active session, if any.
    current: RwLock<Option<SessionIdentity>>,
    /// Session transition broadcast.
    events: broadcast::Sender<SessionEvent>,
}

impl MemoryAuth {
    /// Creates a new provider with no accounts and no session.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            accounts: RwLock::new(HashMap::new()),
            current: RwLock::new(None),
            events,
        }
    }

    /// Pre-register an account without signing it in.
    ///
    /// Returns the subject id the account was assigned. Useful for seeding
    /// fixtures that represent users who registered in an earlier session.
    pub fn register(&self, email: &str, password: &str) -> String {
        let subject_id = Uuid::new_v4().to_string();
        self.accounts.write().unwrap().insert(
            email.to_string(),
            Account {
                subject_id: subject_id.clone(),
                password: password.to_string(),
            },
        );
        subject_id
    }

    /// Broadcast a token refresh for the active session.
    ///
    /// The hosted provider does this on a timer; here it is driven explicitly.
    pub fn refresh_token(&self) {
        if self.current.read().unwrap().is_some() {
            let _ = self.events.send(SessionEvent::TokenRefreshed);
        }
    }

    fn set_session(&self, identity: SessionIdentity) {
        *self.current.write().unwrap() = Some(identity);
        let _ = self.events.send(SessionEvent::SignedIn);
    }
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn session(&self) -> Result<Option<SessionIdentity>, AuthError> {
        Ok(self.current.read().unwrap().clone())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionIdentity, AuthError> {
        let identity = {
            let accounts = self.accounts.read().unwrap();
            match accounts.get(email) {
                Some(account) if account.password == password => {
                    SessionIdentity::with_email(account.subject_id.clone(), email)
                }
                _ => {
                    return Err(AuthError::Credentials {
                        message: INVALID_LOGIN.to_string(),
                    });
                }
            }
        };
        self.set_session(identity.clone());
        Ok(identity)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SessionIdentity, AuthError> {
        if self.accounts.read().unwrap().contains_key(email) {
            return Err(AuthError::Credentials {
                message: ALREADY_REGISTERED.to_string(),
            });
        }
        let subject_id = self.register(email, password);
        let identity = SessionIdentity::with_email(subject_id, email);
        self.set_session(identity.clone());
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let had_session = self.current.write().unwrap().take().is_some();
        if had_session {
            let _ = self.events.send(SessionEvent::SignedOut);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}
