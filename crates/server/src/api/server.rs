use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::Method;
use axum::routing::{get, post};
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth_handlers::logout_handler;
use super::topics::{create_topic_handler, list_topics_handler, show_topic_handler};
use crate::auth::SqliteSessionStore;
use crate::cache::PageCache;
use crate::config::Config;
use crate::topic::SqliteTopicStore;

/// Shared state for every API handler
#[derive(Clone)]
pub struct AppState {
    pub topics: SqliteTopicStore,
    pub sessions: SqliteSessionStore,
    pub cache: Arc<PageCache>,
    pub cookie_name: Arc<str>,
    pub submit_delay: Duration,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        Self {
            topics: SqliteTopicStore::new(pool.clone()),
            sessions: SqliteSessionStore::new(pool).with_max_age(config.sessions.max_age_secs()),
            cache: Arc::new(PageCache::new()),
            cookie_name: Arc::from(config.sessions.cookie_name.as_str()),
            submit_delay: config.topics.submit_delay(),
        }
    }
}

pub async fn healthz() -> &'static str {
    "ok"
}

pub fn build_api_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_topics_handler))
        .route("/topics", post(create_topic_handler))
        .route("/topics/{slug}", get(show_topic_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS]),
        )
        .with_state(state)
}

pub async fn run_api(state: AppState, bind_addr: String, shutdown: CancellationToken) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {bind_addr}"))?;
    tracing::info!("Topics API listening on {}", bind_addr);

    axum::serve(listener, build_api_router(state))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    Ok(())
}
