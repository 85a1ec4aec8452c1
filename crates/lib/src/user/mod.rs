//! Application-level user model.
//!
//! Wire rows for the hosted tables, the tolerant `isEmployee` decoding, and
//! the transient composed user the resolver hands to the presentation layer.

pub mod flag;
pub mod types;

pub use flag::EmployeeFlag;
pub use types::{AppUser, CitizenRow, EmployeeRow, ResolvedUser, Role, UserRow};
