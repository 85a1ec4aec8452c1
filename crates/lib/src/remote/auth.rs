//! Auth client for the hosted service.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::debug;

use super::{AccessToken, endpoint};
use crate::config::ServiceConfig;
use crate::session::{
    AuthError, AuthProvider, EVENT_CHANNEL_CAPACITY, SessionEvent, SessionIdentity,
};

/// Successful response from the token and signup endpoints.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Error payload the auth endpoints return; field name varies by endpoint.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn into_message(self, fallback: &str) -> String {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// HTTP implementation of [`AuthProvider`].
///
/// The session is cached locally after a successful exchange, the way the
/// hosted client SDK does; `session()` never makes a network call.
pub struct RemoteAuth {
    http: reqwest::Client,
    config: ServiceConfig,
    token: Arc<AccessToken>,
    current: RwLock<Option<SessionIdentity>>,
    events: broadcast::Sender<SessionEvent>,
}

impl RemoteAuth {
    pub(super) fn new(
        http: reqwest::Client,
        config: ServiceConfig,
        token: Arc<AccessToken>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            http,
            config,
            token,
            current: RwLock::new(None),
            events,
        }
    }

    /// POST credentials to an auth endpoint and adopt the returned session.
    async fn exchange(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<SessionIdentity, AuthError> {
        let url = endpoint(&self.config.url, path);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.config.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AuthError::Unreachable {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body: ErrorBody = response.json().await.unwrap_or_default();
            let message = body.into_message(status.as_str());
            // 4xx from these endpoints means the credentials were rejected;
            // the message is the provider's and is shown to the user as-is.
            return if status.is_client_error() {
                Err(AuthError::Credentials { message })
            } else {
                Err(AuthError::Provider {
                    status: status.as_u16(),
                    message,
                })
            };
        }

        let body: TokenResponse =
            response.json().await.map_err(|e| AuthError::Provider {
                status: status.as_u16(),
                message: format!("unparseable auth response: {e}"),
            })?;

        let identity = SessionIdentity {
            subject_id: body.user.id,
            email: body.user.email,
        };
        self.token.set(Some(body.access_token));
        *self.current.write().unwrap() = Some(identity.clone());
        let _ = self.events.send(SessionEvent::SignedIn);
        debug!(subject_id = %identity.subject_id, "session established");
        Ok(identity)
    }
}

#[async_trait]
impl AuthProvider for RemoteAuth {
    async fn session(&self) -> Result<Option<SessionIdentity>, AuthError> {
        Ok(self.current.read().unwrap().clone())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionIdentity, AuthError> {
        self.exchange("auth/v1/token?grant_type=password", email, password)
            .await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SessionIdentity, AuthError> {
        self.exchange("auth/v1/signup", email, password).await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let token = self.token.get();
        let had_session = self.current.write().unwrap().take().is_some();
        self.token.set(None);

        // Best-effort server-side revocation; the local session is already
        // gone either way.
        if let Some(token) = token {
            let url = endpoint(&self.config.url, "auth/v1/logout");
            let result = self
                .http
                .post(&url)
                .header("apikey", &self.config.anon_key)
                .bearer_auth(token)
                .send()
                .await;
            if let Err(e) = result {
                debug!(error = %e, "logout request failed, session cleared locally");
            }
        }

        if had_session {
            let _ = self.events.send(SessionEvent::SignedOut);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}
