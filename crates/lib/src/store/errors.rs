//! Error types for the table-store seam.

use thiserror::Error;

/// Errors surfaced by [`crate::store::PortalStore`] implementations.
///
/// The three variants map onto the outcomes the resolver's degradation policy
/// distinguishes: a lost uniqueness race (expected during concurrent
/// bootstrap, swallowed), a transient service failure (degrades to "absent"
/// mid-flow, or to an unavailable resolution if nothing can be read), and a
/// row that came back unparseable.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// An insert violated the per-table `user_id` uniqueness constraint.
    #[error("Row for '{user_id}' already exists in table '{table}'")]
    Conflict { table: &'static str, user_id: String },

    /// The call did not complete (network failure, service error).
    #[error("Table '{table}' unavailable: {reason}")]
    Unavailable { table: &'static str, reason: String },

    /// The service answered but the row did not decode.
    #[error("Invalid row from table '{table}': {reason}")]
    InvalidRow { table: &'static str, reason: String },
}

impl StoreError {
    /// Check if this error indicates an insert lost a uniqueness race.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }

    /// Check if this error is transient — retrying or re-reading may succeed.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }

    /// Check if this error indicates undecodable row data.
    pub fn is_invalid_row(&self) -> bool {
        matches!(self, StoreError::InvalidRow { .. })
    }
}
