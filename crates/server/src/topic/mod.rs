pub mod db;
pub mod models;
pub mod mutations;
pub mod store;

pub use models::TopicRecord;
pub use mutations::{CreateTopicContext, CreateTopicOutcome, Redirect, create_topic};
pub use store::{SqliteTopicStore, TopicStore, TopicStoreError};
