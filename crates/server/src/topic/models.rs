use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
pub struct TopicRecord {
    pub id: String,
    pub slug: String,
    pub description: String,
    pub created_at: i64,
}
