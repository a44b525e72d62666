use async_trait::async_trait;
use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, COOKIE};

use super::{Authenticator, Session, SqliteSessionStore};

/// Authenticator bound to the session id presented by a single request.
pub struct RequestAuthenticator {
    store: SqliteSessionStore,
    session_id: Option<String>,
}

impl RequestAuthenticator {
    pub fn new(store: SqliteSessionStore, session_id: Option<String>) -> Self {
        Self { store, session_id }
    }

    pub fn from_headers(store: SqliteSessionStore, headers: &HeaderMap, cookie_name: &str) -> Self {
        Self::new(store, session_id_from_headers(headers, cookie_name))
    }
}

#[async_trait]
impl Authenticator for RequestAuthenticator {
    async fn check_session(&self) -> Option<Session> {
        let session_id = self.session_id.as_deref()?;
        match self.store.get_session(session_id).await {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!("Session lookup failed, treating caller as signed out: {err:#}");
                None
            }
        }
    }
}

/// Extract the session id from a bearer token, falling back to the session cookie.
pub fn session_id_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
