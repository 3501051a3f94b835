use sqlx::PgPool;

use super::models::Resume;

pub async fn find_by_user(pool: &PgPool, user_id: i64) -> Result<Option<Resume>, sqlx::Error> {
    sqlx::query_as::<_, Resume>(
        "SELECT id, user_id, content, updated_at FROM resumes WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// One resume row per user; repeated updates replace the content.
pub async fn upsert(
    pool: &PgPool,
    user_id: i64,
    content: &serde_json::Value,
) -> Result<Resume, sqlx::Error> {
    sqlx::query_as::<_, Resume>(
        "INSERT INTO resumes (user_id, content)
         VALUES ($1, $2)
         ON CONFLICT (user_id) DO UPDATE
             SET content = EXCLUDED.content,
                 updated_at = now()
         RETURNING id, user_id, content, updated_at",
    )
    .bind(user_id)
    .bind(content)
    .fetch_one(pool)
    .await
}

pub async fn delete_by_user(pool: &PgPool, user_id: i64) -> Result<Option<Resume>, sqlx::Error> {
    sqlx::query_as::<_, Resume>(
        "DELETE FROM resumes WHERE user_id = $1 RETURNING id, user_id, content, updated_at",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}
