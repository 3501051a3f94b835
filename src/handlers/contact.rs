// POST /api/contact (public) and GET /api/contact (admin)

use axum::{
    extract::State,
    handler::Handler,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::validate::{is_email, normalize_email};
use crate::database::{contact, models::ContactMessage};
use crate::error::{ApiError, FieldError};
use crate::middleware::{admin_middleware, auth_middleware};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    let auth = from_fn_with_state(state.clone(), auth_middleware);

    Router::new()
        .route(
            "/api/contact",
            get(list_messages.layer(from_fn(admin_middleware)).layer(auth)).post(submit_message),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

async fn submit_message(
    State(state): State<AppState>,
    Json(body): Json<ContactRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let (name, email, message) = validate_contact(&body)?;

    let stored = contact::insert(&state.pool, &name, &email, &message).await?;
    info!(
        "New contact message: id={} from={} <{}>",
        stored.id, stored.name, stored.email
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Message sent successfully",
            "data": stored,
        })),
    ))
}

async fn list_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContactMessage>>, ApiError> {
    Ok(Json(contact::list_all(&state.pool).await?))
}

fn validate_contact(body: &ContactRequest) -> Result<(String, String, String), ApiError> {
    let mut errors = Vec::new();

    let name = body.name.as_deref().unwrap_or("").trim().to_string();
    if name.is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }

    let email = normalize_email(body.email.as_deref().unwrap_or(""));
    if !is_email(&email) {
        errors.push(FieldError::new("email", "A valid email is required"));
    }

    let message = body.message.as_deref().unwrap_or("").trim().to_string();
    if message.is_empty() {
        errors.push(FieldError::new("message", "Message is required"));
    }

    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }
    Ok((name, email, message))
}
