//! View selection.
//!
//! The presentation layer renders exactly one view per [`UserState`], chosen
//! by a fixed precedence. The order is a contract, not a convenience: an
//! employee whose employee row is missing must land on the onboarding prompt,
//! never on the citizen dashboard.

use crate::resolver::UnavailableReason;
use crate::user::Role;
use crate::watcher::UserState;

/// The view to render for a given user state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    /// A resolution is in flight; render nothing user-specific.
    Loading,
    /// No session; render the sign-in page.
    SignIn,
    /// Authenticated but no user row could be produced; render a degraded
    /// error/empty state (distinct from sign-in).
    Unavailable { reason: UnavailableReason },
    /// User exists but the specialization row matching their role is
    /// missing; render the complete-your-profile prompt.
    Onboarding { role: Role },
    EmployeeDashboard,
    CitizenDashboard,
}

/// Select the view for a state.
///
/// Precedence: loading, then sign-in, then the unavailable state, then the
/// onboarding prompt, then the role dashboards. Each check only runs once
/// every earlier one has ruled itself out.
pub fn select_view(state: &UserState) -> View {
    match state {
        UserState::Loading => View::Loading,
        UserState::SignedOut => View::SignIn,
        UserState::Unavailable { reason } => View::Unavailable { reason: *reason },
        UserState::Ready(user) => {
            if !user.profile_complete() {
                View::Onboarding { role: user.role() }
            } else if user.user.is_employee {
                View::EmployeeDashboard
            } else {
                View::CitizenDashboard
            }
        }
    }
}
