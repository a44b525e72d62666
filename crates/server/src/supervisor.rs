use std::future::Future;

use anyhow::{Error, Result};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::auth::SqliteSessionStore;
use crate::config::SessionSettings;

/// Runs named long-lived tasks, shutting all of them down when one fails or
/// ctrl-c is received.
pub struct Supervisor {
    shutdown: CancellationToken,
    tasks: JoinSet<(String, Result<()>)>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self {
            shutdown: CancellationToken::new(),
            tasks: JoinSet::new(),
        }
    }

    pub fn spawn<F, Fut>(&mut self, name: &'static str, factory: F)
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let shutdown = self.shutdown.child_token();
        self.tasks.spawn(async move {
            let result = factory(shutdown).await;
            (name.to_string(), result)
        });
    }

    pub async fn run(mut self) -> Result<()> {
        let mut first_err: Option<Error> = None;

        while !self.tasks.is_empty() {
            tokio::select! {
                Some(outcome) = self.tasks.join_next() => {
                    self.handle_task_outcome(&mut first_err, outcome);
                }
                _ = tokio::signal::ctrl_c(), if !self.shutdown.is_cancelled() => {
                    tracing::info!("Received ctrl-c, shutting down");
                    self.shutdown.cancel();
                }
            }
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn handle_task_outcome(
        &self,
        first_err: &mut Option<Error>,
        outcome: std::result::Result<(String, Result<()>), JoinError>,
    ) {
        let err = match outcome {
            Ok((name, Ok(()))) => {
                tracing::info!("Task `{name}` exited gracefully");
                return;
            }
            Ok((name, Err(err))) => {
                tracing::error!("Task `{name}` exited with error: {err:#}");
                err
            }
            Err(join_err) => {
                tracing::error!("Task panicked: {join_err:?}");
                join_err.into()
            }
        };

        if first_err.is_none() {
            *first_err = Some(err);
        }
        if !self.shutdown.is_cancelled() {
            tracing::warn!("Supervisor shutting down");
            self.shutdown.cancel();
        }
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

/// Periodically delete sessions older than the configured TTL.
pub async fn run_session_pruner(
    store: SqliteSessionStore,
    settings: SessionSettings,
    shutdown: CancellationToken,
) -> Result<()> {
    let max_age_secs = settings.max_age_secs();
    let mut interval = tokio::time::interval(settings.prune_interval());

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            _ = interval.tick() => {
                match store.prune_older_than(max_age_secs).await {
                    Ok(0) => {}
                    Ok(pruned) => tracing::info!("Pruned {} expired sessions", pruned),
                    Err(err) => tracing::warn!("Session pruning failed: {err:#}"),
                }
            }
        }
    }
}
