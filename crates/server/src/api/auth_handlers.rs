//! Authentication HTTP handlers

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use super::server::AppState;
use crate::auth::session_id_from_headers;

/// Handler for logout
///
/// Deletes the caller's session. Callers without a session get the same answer.
pub async fn logout_handler(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let Some(session_id) = session_id_from_headers(&headers, &state.cookie_name) else {
        return StatusCode::NO_CONTENT;
    };

    match state.sessions.delete_session(&session_id).await {
        Ok(true) => {
            tracing::info!("Session {} logged out", session_id);
            StatusCode::NO_CONTENT
        }
        Ok(false) => StatusCode::NO_CONTENT,
        Err(err) => {
            tracing::error!("Failed to delete session: {:#}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
