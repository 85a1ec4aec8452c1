//! Session-driven re-resolution and staleness handling.

use std::time::Duration;

use sewaportal::UserState;
use sewaportal::dispatch::{View, select_view};

use super::helpers::{citizen_sign_up, memory_portal, settled_state, wait_for_state};

#[tokio::test]
async fn starts_signed_out() {
    let (portal, _auth, _store) = memory_portal();
    let watcher = portal.watch();
    let mut rx = watcher.subscribe();

    let state = settled_state(&mut rx).await;
    assert_eq!(state, UserState::SignedOut);
    assert_eq!(select_view(&state), View::SignIn);
}

#[tokio::test]
async fn sign_in_transition_produces_a_ready_user() {
    let (portal, _auth, _store) = memory_portal();
    let watcher = portal.watch();
    let mut rx = watcher.subscribe();
    assert_eq!(settled_state(&mut rx).await, UserState::SignedOut);

    portal
        .sign_up(citizen_sign_up("jane@example.com", "janedoe"))
        .await
        .unwrap();

    let state = wait_for_state(&mut rx, |s| matches!(s, UserState::Ready(_))).await;
    let UserState::Ready(user) = &state else {
        unreachable!();
    };
    assert_eq!(user.user.username.as_deref(), Some("janedoe"));
    assert_eq!(select_view(&state), View::CitizenDashboard);
}

#[tokio::test]
async fn sign_out_returns_to_the_sign_in_view() {
    let (portal, _auth, _store) = memory_portal();
    let watcher = portal.watch();
    let mut rx = watcher.subscribe();

    portal
        .sign_up(citizen_sign_up("jane@example.com", "janedoe"))
        .await
        .unwrap();
    wait_for_state(&mut rx, |s| matches!(s, UserState::Ready(_))).await;

    portal.sign_out().await.unwrap();
    wait_for_state(&mut rx, |s| *s == UserState::SignedOut).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stale_resolution_is_not_committed_after_sign_out() {
    let (portal, _auth, store) = memory_portal();
    let watcher = portal.watch();
    let mut rx = watcher.subscribe();
    assert_eq!(settled_state(&mut rx).await, UserState::SignedOut);

    // Make the resolution for the sign-in slow, then sign out while it is
    // still in flight. The sign-out resolution touches no tables and lands
    // first; the slow one must be discarded, not painted over it.
    store.set_latency(Some(Duration::from_millis(50)));
    portal
        .sign_up(citizen_sign_up("jane@example.com", "janedoe"))
        .await
        .unwrap();
    portal.sign_out().await.unwrap();

    wait_for_state(&mut rx, |s| *s == UserState::SignedOut).await;

    // Wait out the slow resolution (at most five store calls) and check the
    // committed state never changed.
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(watcher.state(), UserState::SignedOut);
}

#[tokio::test]
async fn token_refresh_triggers_a_fresh_resolution() {
    let (portal, auth, store) = memory_portal();
    let watcher = portal.watch();
    let mut rx = watcher.subscribe();

    portal
        .sign_up(citizen_sign_up("jane@example.com", "janedoe"))
        .await
        .unwrap();
    wait_for_state(&mut rx, |s| matches!(s, UserState::Ready(_))).await;

    let ops_before = store.op_count();
    auth.refresh_token();

    // The refresh must re-read the source of truth rather than reuse state;
    // poll the op counter since the watch channel coalesces the transient
    // Loading state.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while store.op_count() <= ops_before {
        assert!(
            tokio::time::Instant::now() < deadline,
            "token refresh never triggered a store read"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let state = wait_for_state(&mut rx, |s| matches!(s, UserState::Ready(_))).await;
    assert!(matches!(state, UserState::Ready(_)));
}
