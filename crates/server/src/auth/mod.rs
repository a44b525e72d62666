//! Session authentication
//!
//! Sessions are persisted in SQLite and looked up per request. A session may
//! exist without a user attached; only a session carrying a user counts as
//! signed in.

pub mod request;
pub mod session;

pub use request::{RequestAuthenticator, session_id_from_headers};
pub use session::SqliteSessionStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Represents an authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Decentralized Identifier (DID)
    pub did: String,
    /// Handle (e.g., username.bsky.social)
    pub handle: String,
}

impl User {
    pub fn new(did: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            did: did.into(),
            handle: handle.into(),
        }
    }

    /// A user known only by handle, with a locally scoped DID.
    pub fn local(handle: impl Into<String>) -> Self {
        let handle = handle.into();
        Self {
            did: format!("did:local:{handle}"),
            handle,
        }
    }
}

/// Represents an active session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub id: String,
    pub user: Option<User>,
    pub created_at: i64,
}

impl Session {
    /// The signed-in user, if any.
    pub fn signed_in_user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

/// Resolves the caller's session for the current request.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn check_session(&self) -> Option<Session>;
}
