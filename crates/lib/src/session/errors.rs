//! Error types for the auth-provider seam.

use thiserror::Error;

/// Errors surfaced by [`crate::session::AuthProvider`] implementations and by
/// the credential validation in front of them.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// Local input validation failed before any network call was made.
    #[error("{message}")]
    Validation { message: String },

    /// The provider rejected the credentials. The message is the provider's
    /// own and is shown to the end user verbatim.
    #[error("{message}")]
    Credentials { message: String },

    /// The provider answered with a non-credential failure.
    #[error("Auth service error ({status}): {message}")]
    Provider { status: u16, message: String },

    /// The provider could not be reached at all.
    #[error("Auth service unreachable: {reason}")]
    Unreachable { reason: String },
}

impl AuthError {
    /// Shorthand for a validation failure.
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        AuthError::Validation {
            message: message.into(),
        }
    }

    /// Check if this is a provider credential rejection (user-actionable,
    /// surfaced verbatim).
    pub fn is_credential(&self) -> bool {
        matches!(self, AuthError::Credentials { .. })
    }

    /// Check if this is a local validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, AuthError::Validation { .. })
    }

    /// Check if the provider was unreachable.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, AuthError::Unreachable { .. })
    }
}
