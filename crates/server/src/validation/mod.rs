pub mod slug;
pub mod topic;

pub use topic::{CreateTopicInput, validate_create_topic};
