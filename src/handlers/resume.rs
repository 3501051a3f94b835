// GET/PUT/DELETE /api/resume
//
// Mutations commit to the database first, then fan out broker messages.
// A failed publish after the commit surfaces an error to the caller but
// the stored change stands; there is no compensating action.

use axum::{
    extract::{Extension, State},
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::database::{models::Resume, resumes};
use crate::error::{ApiError, FieldError};
use crate::middleware::{auth_middleware, AuthUser};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/resume",
            get(get_resume).put(update_resume).delete(delete_resume),
        )
        .route_layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct UpdateResumeRequest {
    pub content: Option<serde_json::Value>,
}

async fn get_resume(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Resume>, ApiError> {
    let resume = resumes::find_by_user(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Resume not found"))?;

    Ok(Json(resume))
}

async fn update_resume(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdateResumeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let content = validate_content(&body)?;

    resumes::upsert(&state.pool, auth.user_id, content).await?;

    // Consumers pick the rest up asynchronously; the request does not wait
    state.publisher.resume_updated(auth.user_id, content).await?;

    Ok(Json(json!({ "message": "Resume update in progress" })))
}

async fn delete_resume(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<serde_json::Value>, ApiError> {
    resumes::delete_by_user(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Resume not found"))?;

    state.publisher.resume_deleted(auth.user_id).await?;

    Ok(Json(json!({ "message": "Resume deleted successfully" })))
}

fn validate_content(body: &UpdateResumeRequest) -> Result<&serde_json::Value, ApiError> {
    match &body.content {
        Some(content) if content.is_object() && !content.as_object().is_some_and(|m| m.is_empty()) => {
            Ok(content)
        }
        _ => Err(ApiError::validation(vec![FieldError::new(
            "content",
            "Content must be a non-empty object",
        )])),
    }
}
