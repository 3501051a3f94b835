use sqlx::PgPool;

use super::models::ContactMessage;

pub async fn insert(
    pool: &PgPool,
    name: &str,
    email: &str,
    message: &str,
) -> Result<ContactMessage, sqlx::Error> {
    sqlx::query_as::<_, ContactMessage>(
        "INSERT INTO contact_messages (name, email, message)
         VALUES ($1, $2, $3)
         RETURNING id, name, email, message, read, created_at",
    )
    .bind(name)
    .bind(email)
    .bind(message)
    .fetch_one(pool)
    .await
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<ContactMessage>, sqlx::Error> {
    sqlx::query_as::<_, ContactMessage>(
        "SELECT id, name, email, message, read, created_at
         FROM contact_messages
         ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await
}

pub async fn mark_read(pool: &PgPool, id: i64) -> Result<Option<ContactMessage>, sqlx::Error> {
    sqlx::query_as::<_, ContactMessage>(
        "UPDATE contact_messages
         SET read = true
         WHERE id = $1
         RETURNING id, name, email, message, read, created_at",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM contact_messages WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
