//! Session-driven re-resolution.
//!
//! The resolver is a one-shot operation; something has to re-run it whenever
//! the underlying session changes. `UserWatcher` owns that loop in a
//! background tokio task: it subscribes to the auth provider's transition
//! broadcast, re-resolves on every event, and publishes the outcome through a
//! `watch` channel the presentation layer renders from.
//!
//! Each event advances a generation counter, and a resolution may only commit
//! its result while its generation is still the latest. A sign-out that lands
//! while a resolution for the previous session is in flight therefore wins:
//! the stale completion is discarded, never painted over newer state.

use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::resolver::{IdentityResolver, Resolution, UnavailableReason};
use crate::session::AuthProvider;
use crate::user::ResolvedUser;

/// What the presentation layer currently knows about the user.
///
/// A resolution in flight always shows as `Loading` — a partial user is never
/// observable.
#[derive(Clone, Debug, PartialEq)]
pub enum UserState {
    /// A resolution is in flight for the current session.
    Loading,
    /// No session; show the sign-in view.
    SignedOut,
    /// Authenticated, but no user could be produced.
    Unavailable { reason: UnavailableReason },
    /// The resolved user.
    Ready(ResolvedUser),
}

impl From<Resolution> for UserState {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Unauthenticated => UserState::SignedOut,
            Resolution::Unavailable { reason } => UserState::Unavailable { reason },
            Resolution::Resolved(user) => UserState::Ready(user),
        }
    }
}

/// Generation-guarded publisher for the shared state channel.
///
/// The lock serializes the "is this generation still current" check with the
/// send, so a stale resolution cannot slip its result in between a newer
/// event's advance and publish.
struct Publisher {
    tx: watch::Sender<UserState>,
    generation: Mutex<u64>,
}

impl Publisher {
    /// Start a new generation: invalidate all in-flight resolutions and show
    /// `Loading`. Returns the new generation token.
    fn advance(&self) -> u64 {
        let mut generation = self.generation.lock().unwrap();
        *generation += 1;
        self.tx.send_replace(UserState::Loading);
        *generation
    }

    /// Commit a resolution outcome, unless it has been superseded.
    fn commit(&self, generation: u64, state: UserState) {
        let current = self.generation.lock().unwrap();
        if *current == generation {
            self.tx.send_replace(state);
        } else {
            trace!(
                generation,
                current = *current,
                "discarding stale resolution"
            );
        }
    }
}

/// Background task that keeps a [`UserState`] in sync with the session.
///
/// Dropping the watcher stops the loop.
pub struct UserWatcher {
    state_rx: watch::Receiver<UserState>,
    task: JoinHandle<()>,
}

impl UserWatcher {
    /// Spawn the watch loop.
    ///
    /// Performs an initial resolution immediately, then re-resolves on every
    /// session transition until shut down.
    pub fn spawn(auth: Arc<dyn AuthProvider>, resolver: IdentityResolver) -> Self {
        let (tx, state_rx) = watch::channel(UserState::Loading);
        let publisher = Arc::new(Publisher {
            tx,
            generation: Mutex::new(0),
        });
        let task = tokio::spawn(run(auth, resolver, publisher));
        Self { state_rx, task }
    }

    /// The latest published state.
    pub fn state(&self) -> UserState {
        self.state_rx.borrow().clone()
    }

    /// A receiver for observing state transitions.
    pub fn subscribe(&self) -> watch::Receiver<UserState> {
        self.state_rx.clone()
    }

    /// Stop the watch loop. In-flight resolutions are abandoned.
    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for UserWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(auth: Arc<dyn AuthProvider>, resolver: IdentityResolver, publisher: Arc<Publisher>) {
    let mut events = auth.subscribe();

    // Startup resolution for whatever session already exists.
    start_resolution(&auth, &resolver, &publisher);

    loop {
        match events.recv().await {
            Ok(event) => {
                debug!(?event, "session transition, re-resolving");
                start_resolution(&auth, &resolver, &publisher);
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                // Missed transitions collapse into "something changed".
                warn!(skipped, "session events lagged, re-resolving");
                start_resolution(&auth, &resolver, &publisher);
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("session event channel closed, stopping watcher");
                break;
            }
        }
    }
}

/// Advance the generation and spawn a resolution bound to it.
///
/// The session is re-read from the provider inside the task — events are
/// signals, not payloads — and the outcome only commits if no newer event
/// has advanced the generation in the meantime.
fn start_resolution(
    auth: &Arc<dyn AuthProvider>,
    resolver: &IdentityResolver,
    publisher: &Arc<Publisher>,
) {
    let generation = publisher.advance();
    let auth = Arc::clone(auth);
    let resolver = resolver.clone();
    let publisher = Arc::clone(publisher);

    tokio::spawn(async move {
        let session = match auth.session().await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "session read failed, treating as signed out");
                None
            }
        };
        let resolution = resolver.resolve(session.as_ref()).await;
        publisher.commit(generation, UserState::from(resolution));
    });
}
