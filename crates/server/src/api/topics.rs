use axum::Form;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};

use super::errors::ApiError;
use super::server::AppState;
use crate::auth::RequestAuthenticator;
use crate::form::FormState;
use crate::paths;
use crate::topic::db::{fetch_topic_by_slug, list_topics};
use crate::topic::{CreateTopicContext, CreateTopicOutcome, TopicRecord, create_topic};

/// Root listing of every topic, served from the page cache when warm.
pub async fn list_topics_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = match state.cache.get(paths::home()) {
        Some(body) => body,
        None => {
            let generation = state.cache.generation();
            let topics = list_topics(state.topics.pool())
                .await
                .map_err(ApiError::internal)?;
            let body = serde_json::to_string(&topics).map_err(ApiError::internal)?;
            if !state.cache.insert_if_current(paths::home(), body.clone(), generation) {
                tracing::debug!("Listing changed while rendering, not caching it");
            }
            body
        }
    };

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

pub async fn show_topic_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<TopicRecord>, ApiError> {
    fetch_topic_by_slug(state.topics.pool(), &slug)
        .await
        .map_err(ApiError::internal)?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// Form endpoint for creating a topic.
///
/// Success answers `303 See Other` pointing at the new topic; a rejected
/// submission answers `422` with the form state to render.
pub async fn create_topic_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let authenticator =
        RequestAuthenticator::from_headers(state.sessions.clone(), &headers, &state.cookie_name);
    let ctx = CreateTopicContext {
        authenticator: &authenticator,
        store: &state.topics,
        revalidator: state.cache.as_ref(),
        submit_delay: state.submit_delay,
    };

    match create_topic(&ctx, FormState::default(), fields.as_slice()).await {
        CreateTopicOutcome::Redirect(redirect) => Redirect::to(&redirect.target).into_response(),
        CreateTopicOutcome::Rejected(form_state) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(form_state)).into_response()
        }
    }
}
