//! Read models backing the admin dashboard.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DashboardStats {
    pub total_projects: i64,
    pub total_messages: i64,
    pub featured_projects: i64,
    pub total_users: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ActivityRow {
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub action: String,
}

pub async fn dashboard_stats(pool: &PgPool) -> Result<DashboardStats, sqlx::Error> {
    sqlx::query_as::<_, DashboardStats>(
        "SELECT
            (SELECT COUNT(*) FROM projects) AS total_projects,
            (SELECT COUNT(*) FROM contact_messages) AS total_messages,
            (SELECT COUNT(*) FROM projects WHERE featured = true) AS featured_projects,
            (SELECT COUNT(*) FROM users) AS total_users",
    )
    .fetch_one(pool)
    .await
}

pub async fn recent_activities(pool: &PgPool) -> Result<Vec<ActivityRow>, sqlx::Error> {
    sqlx::query_as::<_, ActivityRow>(
        "SELECT 'project' AS type, title AS name, created_at, 'created' AS action
         FROM projects
         WHERE created_at > NOW() - INTERVAL '7 days'
         UNION ALL
         SELECT 'message' AS type, name, created_at, 'received' AS action
         FROM contact_messages
         WHERE created_at > NOW() - INTERVAL '7 days'
         ORDER BY created_at DESC
         LIMIT 10",
    )
    .fetch_all(pool)
    .await
}
