//!
//! Sewaportal: identity resolution and profile bootstrap for the sewa civic portal.
//!
//! All durable state (accounts, user rows, citizen/employee profiles) lives in an
//! externally hosted auth + table service. This crate owns the one piece of logic
//! between that service and a presentation layer: turning an authenticated session
//! into a consistent, normalized application user, lazily creating the backing
//! rows on first contact.
//!
//! ## Core Concepts
//!
//! * **Session (`session`)**: The `AuthProvider` trait over the hosted auth
//!   service — password sign-in/sign-up, sign-out, and a broadcast of session
//!   transitions that drives re-resolution.
//! * **Store (`store`)**: The `PortalStore` trait over the hosted tables
//!   (`users`, `citizen`, `employee`), keeping "absent", "transient failure"
//!   and "success" distinguishable. `MemoryStore`/`MemoryAuth` are first-class
//!   in-process implementations; the `remote` module talks to the real service.
//! * **Resolver (`resolver`)**: `IdentityResolver` — lookup, bootstrap-if-missing,
//!   re-read, normalize, branch. Never errors; degrades to an explicit
//!   [`resolver::Resolution`] outcome.
//! * **Watcher (`watcher`)**: A background task re-running the resolver on every
//!   session transition, with a generation guard so stale completions are never
//!   committed over newer state.
//! * **Dispatch (`dispatch`)**: The pure view-selection contract the UI renders
//!   from, with a fixed precedence order.

pub mod config;
pub mod constants;
pub mod dispatch;
pub mod portal;
#[cfg(feature = "remote")]
pub mod remote;
pub mod resolver;
pub mod session;
pub mod store;
pub mod user;
pub mod watcher;

/// Re-export the main entry points for easier access.
pub use portal::Portal;
pub use resolver::{IdentityResolver, Resolution};
pub use user::ResolvedUser;
pub use watcher::UserState;

/// Result type used throughout the sewaportal library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the sewaportal library.
///
/// The identity resolver itself never surfaces this type — resolution degrades
/// to an explicit [`resolver::Resolution`] outcome instead. `Error` is what the
/// credential boundary (sign-in/sign-up), configuration, and the raw backend
/// traits return.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured auth-provider errors from the session module
    #[error(transparent)]
    Auth(#[from] session::AuthError),

    /// Structured table-store errors from the store module
    #[error(transparent)]
    Store(#[from] store::StoreError),

    /// Structured configuration errors from the config module
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Auth(_) => "session",
            Error::Store(_) => "store",
            Error::Config(_) => "config",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error carries a provider credential message that should be
    /// shown to the end user verbatim.
    pub fn is_credential_error(&self) -> bool {
        matches!(self, Error::Auth(e) if e.is_credential())
    }

    /// Check if this error is a local input-validation failure.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Auth(e) if e.is_validation())
    }

    /// Check if this error indicates an insert lost a uniqueness race.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Store(e) if e.is_conflict())
    }

    /// Check if this error is transient (the backing service was unreachable).
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Auth(e) => e.is_unreachable(),
            Error::Store(e) => e.is_unavailable(),
            _ => false,
        }
    }

    /// Check if this error is configuration-related.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}
