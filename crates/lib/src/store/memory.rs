//! In-memory table store.
//!
//! A first-class in-process implementation of [`PortalStore`], suitable for
//! development and tests. Rows are held as raw JSON values keyed by `user_id`,
//! the way a schemaless hosted table behaves — which is also what lets tests
//! seed rows carrying the legacy `isEmployee` encodings and exercise the
//! tolerant decoding on the read path.
//!
//! The store can simulate a degraded service: `set_offline` fails every call,
//! `set_latency` delays every call. Both apply per call, so a test can flip
//! them mid-flow.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::{PortalStore, StoreError};
use crate::constants::{CITIZEN_TABLE, EMPLOYEE_TABLE, USERS_TABLE};
use crate::user::{CitizenRow, EmployeeRow, UserRow};

/// In-memory implementation of [`PortalStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, Value>>,
    citizen: RwLock<HashMap<String, Value>>,
    employee: RwLock<HashMap<String, Value>>,

    /// Total store calls issued, including failed ones.
    ops: AtomicU64,
    /// When set, every call fails with [`StoreError::Unavailable`].
    offline: AtomicBool,
    /// When set, every call waits this long before touching the tables.
    latency: RwLock<Option<Duration>>,
}

impl MemoryStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store calls issued so far (fetches and inserts, successful
    /// or not).
    pub fn op_count(&self) -> u64 {
        self.ops.load(Ordering::Relaxed)
    }

    /// Simulate a service outage. While offline, every call fails.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    /// Delay every call by `latency`. `None` restores instant responses.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write().unwrap() = latency;
    }

    /// Seed a raw `users` row, bypassing the typed insert path.
    ///
    /// The value is stored as-is, so rows written by older backend paths
    /// (string or integer `isEmployee`) can be reproduced. The value must
    /// carry a string `user_id`.
    pub fn seed_user_row(&self, row: Value) {
        let user_id = row["user_id"]
            .as_str()
            .expect("seeded row must have a string user_id")
            .to_string();
        self.users.write().unwrap().insert(user_id, row);
    }

    pub fn user_row_count(&self) -> usize {
        self.users.read().unwrap().len()
    }

    pub fn citizen_row_count(&self) -> usize {
        self.citizen.read().unwrap().len()
    }

    pub fn employee_row_count(&self) -> usize {
        self.employee.read().unwrap().len()
    }

    /// Per-call bookkeeping: count the op, apply injected latency, fail if
    /// the simulated service is down.
    async fn begin_op(&self, table: &'static str) -> Result<(), StoreError> {
        self.ops.fetch_add(1, Ordering::Relaxed);
        let delay = *self.latency.read().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.offline.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable {
                table,
                reason: "store offline".to_string(),
            });
        }
        Ok(())
    }

    fn fetch_from<T: serde::de::DeserializeOwned>(
        map: &RwLock<HashMap<String, Value>>,
        table: &'static str,
        user_id: &str,
    ) -> Result<Option<T>, StoreError> {
        match map.read().unwrap().get(user_id) {
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| StoreError::InvalidRow {
                    table,
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    fn insert_into<T: Serialize>(
        map: &RwLock<HashMap<String, Value>>,
        table: &'static str,
        user_id: &str,
        row: &T,
    ) -> Result<(), StoreError> {
        let mut value = serde_json::to_value(row).map_err(|e| StoreError::InvalidRow {
            table,
            reason: e.to_string(),
        })?;
        // The hosted backend stamps inserts; mirror it.
        if let Value::Object(obj) = &mut value {
            obj.entry("created_at")
                .or_insert_with(|| Value::String(chrono::Utc::now().to_rfc3339()));
        }

        let mut guard = map.write().unwrap();
        if guard.contains_key(user_id) {
            return Err(StoreError::Conflict {
                table,
                user_id: user_id.to_string(),
            });
        }
        guard.insert(user_id.to_string(), value);
        Ok(())
    }
}

#[async_trait]
impl PortalStore for MemoryStore {
    async fn fetch_user(&self, user_id: &str) -> Result<Option<UserRow>, StoreError> {
        self.begin_op(USERS_TABLE).await?;
        Self::fetch_from(&self.users, USERS_TABLE, user_id)
    }

    async fn insert_user(&self, row: &UserRow) -> Result<(), StoreError> {
        self.begin_op(USERS_TABLE).await?;
        Self::insert_into(&self.users, USERS_TABLE, &row.user_id, row)
    }

    async fn fetch_citizen(&self, user_id: &str) -> Result<Option<CitizenRow>, StoreError> {
        self.begin_op(CITIZEN_TABLE).await?;
        Self::fetch_from(&self.citizen, CITIZEN_TABLE, user_id)
    }

    async fn insert_citizen(&self, row: &CitizenRow) -> Result<(), StoreError> {
        self.begin_op(CITIZEN_TABLE).await?;
        Self::insert_into(&self.citizen, CITIZEN_TABLE, &row.user_id, row)
    }

    async fn fetch_employee(&self, user_id: &str) -> Result<Option<EmployeeRow>, StoreError> {
        self.begin_op(EMPLOYEE_TABLE).await?;
        Self::fetch_from(&self.employee, EMPLOYEE_TABLE, user_id)
    }

    async fn insert_employee(&self, row: &EmployeeRow) -> Result<(), StoreError> {
        self.begin_op(EMPLOYEE_TABLE).await?;
        Self::insert_into(&self.employee, EMPLOYEE_TABLE, &row.user_id, row)
    }
}
