//! Table client for the hosted service.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;

use super::{AccessToken, endpoint};
use crate::config::ServiceConfig;
use crate::constants::{CITIZEN_TABLE, EMPLOYEE_TABLE, USERS_TABLE};
use crate::store::{PortalStore, StoreError};
use crate::user::{CitizenRow, EmployeeRow, UserRow};

/// HTTP implementation of [`PortalStore`] against PostgREST-style endpoints.
///
/// Reads filter by `user_id` and cap at one row; writes rely on the table's
/// primary-key constraint, surfacing a duplicate insert as
/// [`StoreError::Conflict`]. Row-level access control is the service's job —
/// requests carry the signed-in user's token when one exists.
pub struct RemoteStore {
    http: reqwest::Client,
    config: ServiceConfig,
    token: Arc<AccessToken>,
}

impl RemoteStore {
    pub(super) fn new(
        http: reqwest::Client,
        config: ServiceConfig,
        token: Arc<AccessToken>,
    ) -> Self {
        Self {
            http,
            config,
            token,
        }
    }

    fn bearer(&self) -> String {
        self.token
            .get()
            .unwrap_or_else(|| self.config.anon_key.clone())
    }

    async fn fetch_row<T: serde::de::DeserializeOwned>(
        &self,
        table: &'static str,
        user_id: &str,
    ) -> Result<Option<T>, StoreError> {
        let url = endpoint(&self.config.url, &format!("rest/v1/{table}"));
        let filter = format!("eq.{user_id}");
        let response = self
            .http
            .get(&url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.bearer())
            .query(&[
                ("select", "*"),
                ("user_id", filter.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await
            .map_err(|e| StoreError::Unavailable {
                table,
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Unavailable {
                table,
                reason: format!("status {status}"),
            });
        }

        let rows: Vec<Value> = response.json().await.map_err(|e| StoreError::InvalidRow {
            table,
            reason: e.to_string(),
        })?;
        match rows.into_iter().next() {
            Some(row) => serde_json::from_value(row)
                .map(Some)
                .map_err(|e| StoreError::InvalidRow {
                    table,
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    async fn insert_row<T: Serialize>(
        &self,
        table: &'static str,
        user_id: &str,
        row: &T,
    ) -> Result<(), StoreError> {
        let url = endpoint(&self.config.url, &format!("rest/v1/{table}"));
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.config.anon_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(self.bearer())
            .json(row)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable {
                table,
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::CONFLICT {
            return Err(StoreError::Conflict {
                table,
                user_id: user_id.to_string(),
            });
        }
        if !status.is_success() {
            return Err(StoreError::Unavailable {
                table,
                reason: format!("status {status}"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PortalStore for RemoteStore {
    async fn fetch_user(&self, user_id: &str) -> Result<Option<UserRow>, StoreError> {
        self.fetch_row(USERS_TABLE, user_id).await
    }

    async fn insert_user(&self, row: &UserRow) -> Result<(), StoreError> {
        self.insert_row(USERS_TABLE, &row.user_id, row).await
    }

    async fn fetch_citizen(&self, user_id: &str) -> Result<Option<CitizenRow>, StoreError> {
        self.fetch_row(CITIZEN_TABLE, user_id).await
    }

    async fn insert_citizen(&self, row: &CitizenRow) -> Result<(), StoreError> {
        self.insert_row(CITIZEN_TABLE, &row.user_id, row).await
    }

    async fn fetch_employee(&self, user_id: &str) -> Result<Option<EmployeeRow>, StoreError> {
        self.fetch_row(EMPLOYEE_TABLE, user_id).await
    }

    async fn insert_employee(&self, row: &EmployeeRow) -> Result<(), StoreError> {
        self.insert_row(EMPLOYEE_TABLE, &row.user_id, row).await
    }
}
