//! Clients for the hosted auth + table service.
//!
//! The service exposes a password-grant auth endpoint and PostgREST-style
//! table endpoints under one base url. [`RemoteAuth`] and [`RemoteStore`]
//! share a single HTTP client and an access-token cell: the token the auth
//! endpoint issues is what authorizes per-user table access, with the anon
//! key as the fallback for unauthenticated requests.

use std::sync::{Arc, RwLock};

use url::Url;

use crate::config::ServiceConfig;

pub mod auth;
pub mod store;

pub use auth::RemoteAuth;
pub use store::RemoteStore;

/// Shared holder for the current user access token.
///
/// Written by [`RemoteAuth`] on sign-in/sign-out, read by [`RemoteStore`] on
/// every request.
#[derive(Debug, Default)]
pub struct AccessToken {
    token: RwLock<Option<String>>,
}

impl AccessToken {
    fn set(&self, token: Option<String>) {
        *self.token.write().unwrap() = token;
    }

    fn get(&self) -> Option<String> {
        self.token.read().unwrap().clone()
    }
}

/// Build the auth and store clients for a service.
///
/// Both share one connection pool and one token cell, so a sign-in through
/// the returned auth client immediately authorizes the store client.
pub fn connect(config: &ServiceConfig) -> (Arc<RemoteAuth>, Arc<RemoteStore>) {
    let http = reqwest::Client::new();
    let token = Arc::new(AccessToken::default());
    let auth = Arc::new(RemoteAuth::new(
        http.clone(),
        config.clone(),
        token.clone(),
    ));
    let store = Arc::new(RemoteStore::new(http, config.clone(), token));
    (auth, store)
}

/// Join a path onto the service base url.
fn endpoint(base: &Url, path: &str) -> String {
    format!("{}/{}", base.as_str().trim_end_matches('/'), path)
}
