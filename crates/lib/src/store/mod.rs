//! The table-store seam.
//!
//! The hosted service exposes the `users`, `citizen`, and `employee` tables;
//! this trait is the narrow slice of it the portal core needs: fetch one row
//! by `user_id`, insert one row. Fetches return `Ok(None)` for a genuinely
//! absent row and `Err` for a failed call — the resolver decides per step
//! whether a failure degrades to "absent" or aborts, instead of the store
//! collapsing the two.

use async_trait::async_trait;

use crate::user::{CitizenRow, EmployeeRow, UserRow};

pub mod errors;
pub mod memory;

pub use errors::StoreError;
pub use memory::MemoryStore;

/// Client interface to the hosted tables.
///
/// All implementations enforce (or inherit from the backend) a uniqueness
/// constraint on `user_id` per table: a second insert for the same id fails
/// with [`StoreError::Conflict`]. That constraint — not this crate — is the
/// arbiter when two sessions race to bootstrap the same identity.
#[async_trait]
pub trait PortalStore: Send + Sync {
    /// Fetch the `users` row for a subject id.
    async fn fetch_user(&self, user_id: &str) -> Result<Option<UserRow>, StoreError>;

    /// Insert a `users` row.
    async fn insert_user(&self, row: &UserRow) -> Result<(), StoreError>;

    /// Fetch the `citizen` row for a subject id.
    async fn fetch_citizen(&self, user_id: &str) -> Result<Option<CitizenRow>, StoreError>;

    /// Insert a `citizen` row.
    async fn insert_citizen(&self, row: &CitizenRow) -> Result<(), StoreError>;

    /// Fetch the `employee` row for a subject id.
    async fn fetch_employee(&self, user_id: &str) -> Result<Option<EmployeeRow>, StoreError>;

    /// Insert an `employee` row.
    async fn insert_employee(&self, row: &EmployeeRow) -> Result<(), StoreError>;
}
