use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Resume {
    pub id: i64,
    pub user_id: i64,
    pub content: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}
