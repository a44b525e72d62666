use async_trait::async_trait;
use sqlx::SqlitePool;

use super::db::insert_topic;
use super::models::TopicRecord;

#[derive(Debug, thiserror::Error)]
pub enum TopicStoreError {
    #[error("a topic with slug `{slug}` already exists")]
    Conflict { slug: String },

    #[error("{0}")]
    Database(#[from] sqlx::Error),

    /// A failure from a backend that had nothing to say about it.
    #[error("{}", .0.as_deref().unwrap_or("topic store failure"))]
    Other(Option<String>),
}

impl TopicStoreError {
    /// Message fit for showing to the submitter, if the failure carried one.
    pub fn user_message(&self) -> Option<String> {
        let message = match self {
            TopicStoreError::Other(message) => message.clone()?,
            other => other.to_string(),
        };
        if message.trim().is_empty() {
            None
        } else {
            Some(message)
        }
    }
}

/// Persistence for topics. Slug uniqueness is enforced by the store itself.
#[async_trait]
pub trait TopicStore: Send + Sync {
    async fn create_topic(
        &self,
        slug: &str,
        description: &str,
    ) -> Result<TopicRecord, TopicStoreError>;
}

#[derive(Clone)]
pub struct SqliteTopicStore {
    pool: SqlitePool,
}

impl SqliteTopicStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl TopicStore for SqliteTopicStore {
    async fn create_topic(
        &self,
        slug: &str,
        description: &str,
    ) -> Result<TopicRecord, TopicStoreError> {
        insert_topic(&self.pool, slug, description)
            .await
            .map_err(|err| {
                let is_unique = err
                    .as_database_error()
                    .is_some_and(|db_err| db_err.is_unique_violation());
                if is_unique {
                    TopicStoreError::Conflict {
                        slug: slug.to_string(),
                    }
                } else {
                    TopicStoreError::Database(err)
                }
            })
    }
}
