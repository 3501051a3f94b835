// Admin dashboard surface; every route requires a session with the
// elevated-privilege claim.

use axum::{
    extract::{Path, State},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, put},
    Json, Router,
};
use serde_json::json;

use crate::database::{
    admin::{self, ActivityRow, DashboardStats},
    contact,
    models::ContactMessage,
};
use crate::error::ApiError;
use crate::middleware::{admin_middleware, auth_middleware};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/admin/stats", get(stats))
        .route("/api/admin/activities", get(activities))
        .route("/api/admin/messages", get(messages))
        .route("/api/admin/messages/:id/read", put(mark_message_read))
        .route("/api/admin/messages/:id", delete(delete_message))
        // Admin gate runs after auth has attached the identity
        .route_layer(from_fn(admin_middleware))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

async fn stats(State(state): State<AppState>) -> Result<Json<DashboardStats>, ApiError> {
    Ok(Json(admin::dashboard_stats(&state.pool).await?))
}

async fn activities(State(state): State<AppState>) -> Result<Json<Vec<ActivityRow>>, ApiError> {
    Ok(Json(admin::recent_activities(&state.pool).await?))
}

async fn messages(State(state): State<AppState>) -> Result<Json<Vec<ContactMessage>>, ApiError> {
    Ok(Json(contact::list_all(&state.pool).await?))
}

async fn mark_message_read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ContactMessage>, ApiError> {
    let message = contact::mark_read(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Message not found"))?;
    Ok(Json(message))
}

async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !contact::delete(&state.pool, id).await? {
        return Err(ApiError::not_found("Message not found"));
    }
    Ok(Json(json!({ "message": "Message deleted successfully" })))
}
