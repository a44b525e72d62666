use anyhow::{Result, anyhow};
use topics_server::api::{AppState, run_api};
use topics_server::auth::SqliteSessionStore;
use topics_server::config::loader::load_with_discovery;
use topics_server::db::init_pool;
use topics_server::supervisor::{Supervisor, run_session_pruner};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_with_discovery()?;
    config
        .validate()
        .map_err(|err| anyhow!("invalid configuration: {err}"))?;

    let (pool, db_root) = init_pool(&config.database).await?;
    tracing::info!("Using data directory {}", db_root.display());

    let state = AppState::new(pool.clone(), &config);
    let bind_addr = config.server.bind_addr.clone();
    let session_store = SqliteSessionStore::new(pool).with_max_age(config.sessions.max_age_secs());
    let session_settings = config.sessions.clone();

    let mut supervisor = Supervisor::new();
    supervisor.spawn("api", move |shutdown| run_api(state, bind_addr, shutdown));
    supervisor.spawn("session-pruner", move |shutdown| {
        run_session_pruner(session_store, session_settings, shutdown)
    });

    supervisor.run().await
}
