use super::models::TopicRecord;
use sqlx::SqlitePool;

pub async fn insert_topic(
    pool: &SqlitePool,
    slug: &str,
    description: &str,
) -> Result<TopicRecord, sqlx::Error> {
    let id = cuid2::create_id();
    sqlx::query_as::<_, TopicRecord>(
        r#"INSERT INTO topics (id, slug, description, created_at)
           VALUES (?, ?, ?, CAST(strftime('%s','now') AS INTEGER))
           RETURNING id, slug, description, created_at"#,
    )
    .bind(&id)
    .bind(slug)
    .bind(description)
    .fetch_one(pool)
    .await
}

pub async fn fetch_topic_by_slug(
    pool: &SqlitePool,
    slug: &str,
) -> Result<Option<TopicRecord>, sqlx::Error> {
    sqlx::query_as::<_, TopicRecord>(
        "SELECT id, slug, description, created_at FROM topics WHERE slug = ?",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
}

pub async fn list_topics(pool: &SqlitePool) -> Result<Vec<TopicRecord>, sqlx::Error> {
    sqlx::query_as::<_, TopicRecord>(
        "SELECT id, slug, description, created_at FROM topics ORDER BY slug",
    )
    .fetch_all(pool)
    .await
}
