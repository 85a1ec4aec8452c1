//! The portal facade.
//!
//! `Portal` wires an auth provider and a table store to the identity resolver
//! and exposes the handful of operations the application performs: sign in,
//! sign up, sign out, resolve the current user, and watch for changes. It is
//! a cheap-to-clone handle around shared state.
//!
//! This is also the credential boundary: input validation runs here before
//! any network call, and provider credential errors pass through verbatim for
//! the forms to display — the one place in the crate where errors are shown
//! to the end user rather than degraded away.

use std::sync::Arc;

use tracing::warn;

use crate::Result;
use crate::resolver::{IdentityResolver, Resolution};
use crate::session::{AuthError, AuthProvider, SessionIdentity};
use crate::store::PortalStore;
use crate::user::{Role, UserRow};
use crate::watcher::UserWatcher;

/// Validated sign-up input.
///
/// Mirrors the sign-up form: the role comes from which tab the user filled
/// in, and the chosen username overrides the email-derived default.
#[derive(Clone, Debug)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub username: String,
    pub role: Role,
}

impl SignUpRequest {
    fn validate(&self) -> std::result::Result<(), AuthError> {
        validate_email(&self.email)?;
        if self.password.chars().count() < 6 {
            return Err(AuthError::validation(
                "Password must be at least 6 characters",
            ));
        }
        if self.password.chars().count() > 100 {
            return Err(AuthError::validation("Password is too long"));
        }
        let username = self.username.trim();
        if username.chars().count() < 3 {
            return Err(AuthError::validation(
                "Username must be at least 3 characters",
            ));
        }
        if username.chars().count() > 50 {
            return Err(AuthError::validation("Username is too long"));
        }
        Ok(())
    }
}

fn validate_email(email: &str) -> std::result::Result<(), AuthError> {
    let valid = email.len() <= 255
        && matches!(email.split_once('@'), Some((local, domain))
            if !local.is_empty() && domain.contains('.') && !domain.starts_with('.'));
    if valid {
        Ok(())
    } else {
        Err(AuthError::validation("Invalid email address"))
    }
}

struct PortalInternal {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn PortalStore>,
    resolver: IdentityResolver,
}

/// Application handle: auth provider + table store + resolver.
///
/// Cloning is cheap and every clone shares the same backing services.
#[derive(Clone)]
pub struct Portal {
    inner: Arc<PortalInternal>,
}

impl std::fmt::Debug for Portal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Portal")
            .field("auth", &"<AuthProvider>")
            .field("store", &"<PortalStore>")
            .finish()
    }
}

impl Portal {
    /// Build a portal from explicit service handles.
    pub fn new(auth: Arc<dyn AuthProvider>, store: Arc<dyn PortalStore>) -> Self {
        let resolver = IdentityResolver::new(store.clone());
        Self {
            inner: Arc::new(PortalInternal {
                auth,
                store,
                resolver,
            }),
        }
    }

    /// Build a portal talking to the hosted service.
    #[cfg(feature = "remote")]
    pub fn connect(config: &crate::config::ServiceConfig) -> Self {
        let (auth, store) = crate::remote::connect(config);
        Self::new(auth, store)
    }

    pub fn auth(&self) -> &Arc<dyn AuthProvider> {
        &self.inner.auth
    }

    pub fn store(&self) -> &Arc<dyn PortalStore> {
        &self.inner.store
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.inner.resolver
    }

    // === Credential boundary ===

    /// Sign in with an email/password pair.
    ///
    /// Provider credential errors come back verbatim for the form to show.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionIdentity> {
        validate_email(email)?;
        if password.is_empty() {
            return Err(AuthError::validation("Password is required").into());
        }
        let identity = self
            .inner
            .auth
            .sign_in_with_password(email, password)
            .await?;
        Ok(identity)
    }

    /// Register a new account and bootstrap its application rows.
    ///
    /// The bootstrap is the same best-effort helper the resolver uses — if an
    /// insert fails here, the first resolution for the new session repeats
    /// it, so a registration never fails because of the table store.
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<SessionIdentity> {
        request.validate()?;
        let identity = self
            .inner
            .auth
            .sign_up(&request.email, &request.password)
            .await?;

        let mut row = UserRow::bootstrap(&identity, request.role);
        row.username = Some(request.username.trim().to_string());
        self.inner.resolver.bootstrap_rows(&row, request.role).await;

        Ok(identity)
    }

    /// End the current session.
    pub async fn sign_out(&self) -> Result<()> {
        self.inner.auth.sign_out().await?;
        Ok(())
    }

    // === Resolution ===

    /// Resolve the current session into an application user.
    ///
    /// A failed session read degrades to "no session" — the caller sees the
    /// sign-in state rather than an error, matching the resolver's overall
    /// never-throw contract.
    pub async fn resolve(&self) -> Resolution {
        let session = match self.inner.auth.session().await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "session read failed, treating as signed out");
                None
            }
        };
        self.inner.resolver.resolve(session.as_ref()).await
    }

    /// Spawn a watcher that re-resolves on every session transition.
    pub fn watch(&self) -> UserWatcher {
        UserWatcher::spawn(self.inner.auth.clone(), self.inner.resolver.clone())
    }
}
