//! Row and domain types for the portal user model.
//!
//! The `*Row` structs are the wire shapes of the hosted tables; their field
//! names (including the irregular `isEmployee` and `NagarNigam_wardno`) are
//! part of the deployed schema and are preserved via serde renames. `AppUser`
//! and `ResolvedUser` are the normalized in-memory forms the presentation
//! layer consumes.

use serde::{Deserialize, Serialize};

use super::flag::EmployeeFlag;
use crate::session::SessionIdentity;

/// Which side of the portal an account belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Citizen,
    Employee,
}

impl Role {
    /// The `isEmployee` value a bootstrap for this role writes.
    pub fn is_employee(self) -> bool {
        matches!(self, Role::Employee)
    }
}

/// One row of the `users` table.
///
/// Primary key is `user_id`, which equals the auth service's subject id.
/// At most one row exists per subject; the flag never changes through this
/// crate (role changes are out of scope).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserRow {
    pub user_id: String,

    #[serde(default)]
    pub email_id: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    /// Tri-encoded in storage; normalized on every read.
    #[serde(rename = "isEmployee", default)]
    pub is_employee: EmployeeFlag,

    /// Stamped by the backend on insert; absent on rows this crate builds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl UserRow {
    /// The default row a bootstrap writes for a fresh identity.
    ///
    /// This is the single source of truth for the default-row shape: the
    /// resolver's lazy bootstrap and the sign-up flow both go through it.
    /// The flag is written as a plain boolean.
    pub fn bootstrap(identity: &SessionIdentity, role: Role) -> Self {
        Self {
            user_id: identity.subject_id.clone(),
            email_id: identity.email.clone(),
            username: identity.email.as_deref().and_then(username_from_email),
            is_employee: EmployeeFlag(role.is_employee()),
            created_at: None,
        }
    }
}

/// One row of the `citizen` table. All contact fields are optional on
/// creation; onboarding fills them in later.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CitizenRow {
    pub user_id: String,

    #[serde(default)]
    pub contact_no: Option<String>,

    #[serde(default)]
    pub house_no: Option<String>,

    #[serde(default)]
    pub street: Option<String>,

    #[serde(default)]
    pub landmark: Option<String>,

    #[serde(default)]
    pub city: Option<String>,

    /// Municipal ward number; wire name kept for schema compatibility.
    #[serde(rename = "NagarNigam_wardno", default)]
    pub ward_no: Option<String>,

    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub pincode: Option<String>,
}

impl CitizenRow {
    /// An empty profile row for a freshly bootstrapped citizen.
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }
}

/// One row of the `employee` table.
///
/// The portal core never interprets employee attributes; everything beyond
/// the key is carried through untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRow {
    pub user_id: String,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl EmployeeRow {
    /// A minimal row for a freshly bootstrapped employee.
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Normalized application user, decoded from a [`UserRow`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppUser {
    pub user_id: String,
    pub email_id: Option<String>,
    pub username: Option<String>,
    pub is_employee: bool,
}

impl From<UserRow> for AppUser {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.user_id,
            email_id: row.email_id,
            username: row.username,
            is_employee: row.is_employee.as_bool(),
        }
    }
}

/// The composed user a successful resolution returns.
///
/// Transient and caller-owned: built fresh on every resolution, discarded on
/// sign-out or the next resolution. Carries at most one specialization row —
/// the one matching the user's flag — and makes "profile incomplete" (the
/// matching row is absent) observable rather than collapsing it into an error.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedUser {
    pub user: AppUser,

    /// Present only when `user.is_employee` is false and the row exists.
    pub citizen: Option<CitizenRow>,

    /// Present only when `user.is_employee` is true and the row exists.
    pub employee: Option<EmployeeRow>,
}

impl ResolvedUser {
    /// The role implied by the normalized flag.
    pub fn role(&self) -> Role {
        if self.user.is_employee {
            Role::Employee
        } else {
            Role::Citizen
        }
    }

    /// Whether the specialization row matching the flag was found.
    ///
    /// `false` is the "onboarding incomplete" state the presentation layer
    /// branches on.
    pub fn profile_complete(&self) -> bool {
        if self.user.is_employee {
            self.employee.is_some()
        } else {
            self.citizen.is_some()
        }
    }
}

/// Derive a default username from an email's local part.
///
/// `jane.doe@example.com` becomes `jane.doe`. Returns `None` for an empty
/// local part rather than inventing an empty username.
pub fn username_from_email(email: &str) -> Option<String> {
    match email.split('@').next() {
        Some(local) if !local.is_empty() => Some(local.to_string()),
        _ => None,
    }
}
