//! Constants used throughout the sewaportal library.
//!
//! Central definitions for the hosted-service table names. The names are part
//! of the deployed backend schema and must not drift.

/// Table holding one application-level row per authenticated subject.
pub const USERS_TABLE: &str = "users";

/// Table holding the citizen specialization rows (contact/address fields).
pub const CITIZEN_TABLE: &str = "citizen";

/// Table holding the employee specialization rows.
pub const EMPLOYEE_TABLE: &str = "employee";
