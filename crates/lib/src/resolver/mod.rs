//! Identity resolution and profile bootstrap.
//!
//! Converts a raw authenticated session into a [`ResolvedUser`], lazily
//! creating the application-level rows the first time an identity shows up.
//! Consistency is best-effort, not transactional: the store's uniqueness
//! constraint arbitrates concurrent bootstraps, and a lost race is an
//! expected, silent outcome.
//!
//! The flow is one sequential chain — lookup, bootstrap-if-missing, re-read,
//! normalize, branch — with a suspension point at each store call. Nothing
//! here is cached; every resolution re-reads the source of truth.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::session::SessionIdentity;
use crate::store::PortalStore;
use crate::user::{AppUser, CitizenRow, EmployeeRow, ResolvedUser, Role, UserRow};

/// Why a resolution came back empty for an authenticated session.
///
/// Distinct from "unauthenticated": the caller shows an error/empty state for
/// these, not the sign-in view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnavailableReason {
    /// The store kept failing; nothing could be read.
    StoreUnreachable,
    /// Reads succeeded but the user row never appeared, even after a
    /// bootstrap attempt.
    BootstrapIncomplete,
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnavailableReason::StoreUnreachable => f.write_str("store unreachable"),
            UnavailableReason::BootstrapIncomplete => f.write_str("bootstrap incomplete"),
        }
    }
}

/// Outcome of one resolution call.
///
/// This operation never fails with an `Err` — every degraded path collapses
/// into one of these variants so the caller can always render something.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    /// No session. The normal signed-out state, not an error.
    Unauthenticated,
    /// A session exists but no user could be produced.
    Unavailable { reason: UnavailableReason },
    /// The composed user.
    Resolved(ResolvedUser),
}

impl Resolution {
    /// The resolved user, when there is one.
    pub fn resolved(&self) -> Option<&ResolvedUser> {
        match self {
            Resolution::Resolved(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Resolution::Unauthenticated)
    }
}

/// Resolves session identities into application users.
///
/// Cheap to clone; the store handle is shared.
#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn PortalStore>,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn PortalStore>) -> Self {
        Self { store }
    }

    /// Resolve a session into an application user.
    ///
    /// With no session this returns [`Resolution::Unauthenticated`] without
    /// touching the store. Otherwise: look the user row up; if absent,
    /// bootstrap default rows (citizen role); re-read; branch on the
    /// normalized employee flag and attach the matching specialization row.
    ///
    /// Store failures inside the flow degrade to absent values and are
    /// logged, never raised — the worst outcome is an
    /// [`Resolution::Unavailable`] the caller renders as a degraded state.
    pub async fn resolve(&self, session: Option<&SessionIdentity>) -> Resolution {
        let Some(identity) = session else {
            return Resolution::Unauthenticated;
        };
        let user_id = identity.subject_id.as_str();

        // Existence check. A failed read is treated as absent so one flaky
        // lookup cannot block a returning user; the re-read below is the
        // authoritative one.
        let exists = match self.store.fetch_user(user_id).await {
            Ok(row) => row.is_some(),
            Err(e) => {
                warn!(%user_id, error = %e, "user lookup failed, treating row as absent");
                false
            }
        };

        if !exists {
            // First contact (or a degraded read): make sure default rows
            // exist before the authoritative read. Must complete before the
            // re-read is issued.
            self.bootstrap(identity, Role::Citizen).await;
        }

        let row = match self.store.fetch_user(user_id).await {
            Ok(Some(row)) => row,
            Ok(None) => {
                warn!(%user_id, "user row still absent after bootstrap");
                return Resolution::Unavailable {
                    reason: UnavailableReason::BootstrapIncomplete,
                };
            }
            Err(e) => {
                warn!(%user_id, error = %e, "user re-read failed");
                return Resolution::Unavailable {
                    reason: UnavailableReason::StoreUnreachable,
                };
            }
        };

        let user = AppUser::from(row);

        // Exactly one specialization lookup, chosen by the normalized flag.
        // A failed or empty lookup leaves the slot at None — that is the
        // "profile incomplete" shape the onboarding view keys off.
        let (citizen, employee) = if user.is_employee {
            let employee = self
                .store
                .fetch_employee(user_id)
                .await
                .unwrap_or_else(|e| {
                    warn!(%user_id, error = %e, "employee profile lookup failed");
                    None
                });
            (None, employee)
        } else {
            let citizen = self.store.fetch_citizen(user_id).await.unwrap_or_else(|e| {
                warn!(%user_id, error = %e, "citizen profile lookup failed");
                None
            });
            (citizen, None)
        };

        Resolution::Resolved(ResolvedUser {
            user,
            citizen,
            employee,
        })
    }

    /// Insert the default rows for a fresh identity.
    ///
    /// The single source of truth for the default-row shape, shared by the
    /// lazy bootstrap above and the sign-up flow. Inserts run sequentially:
    /// user row first, then the specialization row matching `role`.
    ///
    /// Best-effort by contract: a conflict means another session won the
    /// race and the rows exist, so it is logged at debug and ignored; any
    /// other failure is logged and ignored too, because the caller's
    /// follow-up read decides whether the flow can proceed.
    pub async fn bootstrap(&self, identity: &SessionIdentity, role: Role) {
        self.bootstrap_rows(&UserRow::bootstrap(identity, role), role)
            .await;
    }

    /// Bootstrap from a prepared user row.
    ///
    /// The sign-up flow goes through here so it can carry the username the
    /// user chose instead of the email-derived default, while keeping one
    /// insert path for both call sites.
    pub(crate) async fn bootstrap_rows(&self, row: &UserRow, role: Role) {
        let user_id = row.user_id.as_str();
        match self.store.insert_user(row).await {
            Ok(()) => {}
            Err(e) if e.is_conflict() => {
                debug!(%user_id, "user row already created by a concurrent bootstrap");
            }
            Err(e) => warn!(%user_id, error = %e, "user bootstrap insert failed"),
        }

        match role {
            Role::Citizen => {
                match self.store.insert_citizen(&CitizenRow::empty(user_id)).await {
                    Ok(()) => {}
                    Err(e) if e.is_conflict() => {
                        debug!(%user_id, "citizen row already created by a concurrent bootstrap");
                    }
                    Err(e) => warn!(%user_id, error = %e, "citizen bootstrap insert failed"),
                }
            }
            Role::Employee => {
                match self
                    .store
                    .insert_employee(&EmployeeRow::empty(user_id))
                    .await
                {
                    Ok(()) => {}
                    Err(e) if e.is_conflict() => {
                        debug!(%user_id, "employee row already created by a concurrent bootstrap");
                    }
                    Err(e) => warn!(%user_id, error = %e, "employee bootstrap insert failed"),
                }
            }
        }
    }
}
