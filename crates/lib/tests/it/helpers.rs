//! Shared fixtures for the integration suite.

use std::sync::Arc;
use std::time::Duration;

use sewaportal::portal::SignUpRequest;
use sewaportal::session::MemoryAuth;
use sewaportal::store::MemoryStore;
use sewaportal::user::Role;
use sewaportal::{Portal, UserState};
use tokio::sync::watch;

/// A portal wired to in-memory services, with handles kept for inspection.
pub fn memory_portal() -> (Portal, Arc<MemoryAuth>, Arc<MemoryStore>) {
    let auth = Arc::new(MemoryAuth::new());
    let store = Arc::new(MemoryStore::new());
    let portal = Portal::new(auth.clone(), store.clone());
    (portal, auth, store)
}

/// A well-formed citizen sign-up request.
pub fn citizen_sign_up(email: &str, username: &str) -> SignUpRequest {
    SignUpRequest {
        email: email.to_string(),
        password: "secret123".to_string(),
        username: username.to_string(),
        role: Role::Citizen,
    }
}

/// Wait until the watcher publishes a state matching `pred`, with a timeout
/// so a broken watcher fails the test instead of hanging it.
pub async fn wait_for_state(
    rx: &mut watch::Receiver<UserState>,
    pred: impl FnMut(&UserState) -> bool,
) -> UserState {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(pred))
        .await
        .expect("user state did not settle")
        .expect("watcher stopped while waiting")
        .clone()
}

/// Wait until the watcher publishes something other than `Loading`.
pub async fn settled_state(rx: &mut watch::Receiver<UserState>) -> UserState {
    wait_for_state(rx, |state| !matches!(state, UserState::Loading)).await
}
