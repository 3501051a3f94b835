// POST /api/auth/signup, /login, /logout and GET /api/auth/me

use axum::{
    extract::{Extension, State},
    http::{header::SET_COOKIE, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::validate::{is_email, normalize_email};
use crate::auth::{clear_session_cookie, session_cookie};
use crate::config;
use crate::database::users;
use crate::error::{ApiError, FieldError};
use crate::middleware::{auth_middleware, AuthUser};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/auth/me", get(me))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .merge(protected)
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<Response, ApiError> {
    let (name, email, password) = validate_signup(&body)?;

    if users::find_by_email(&state.pool, &email).await?.is_some() {
        info!("Signup rejected, user already exists: {}", email);
        return Err(ApiError::bad_request("User already exists"));
    }

    let password_hash = state.hasher.hash(&password).await?;
    let user = users::create(&state.pool, &name, &email, &password_hash).await?;
    info!("User created successfully: id={} email={}", user.id, user.email);

    // New accounts never start with elevated privileges
    let token = state.tokens.issue(user.id, false)?;

    let mut response = (
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "user": user,
        })),
    )
        .into_response();
    response
        .headers_mut()
        .insert(SET_COOKIE, session_cookie(config::config(), &token)?);
    Ok(response)
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let (email, password) = validate_login(&body)?;

    // Unknown email and wrong password are indistinguishable to the caller
    let Some(user) = users::find_by_email(&state.pool, &email).await? else {
        info!("Invalid login attempt - user not found: {}", email);
        return Err(ApiError::bad_request("Invalid credentials"));
    };

    if !state.hasher.verify(&password, &user.password_hash).await? {
        info!("Invalid login attempt - password mismatch: {}", email);
        return Err(ApiError::bad_request("Invalid credentials"));
    }

    let token = state.tokens.issue(user.id, user.is_admin)?;
    info!("User logged in successfully: id={} email={}", user.id, user.email);

    let public = crate::database::models::PublicUser::from(user);
    let mut response = Json(json!({
        "message": "Login successful",
        "user": public,
    }))
    .into_response();
    response
        .headers_mut()
        .insert(SET_COOKIE, session_cookie(config::config(), &token)?);
    Ok(response)
}

async fn logout() -> Result<Response, ApiError> {
    let mut response = Json(json!({ "message": "Logged out successfully" })).into_response();
    response
        .headers_mut()
        .insert(SET_COOKIE, clear_session_cookie(config::config())?);
    Ok(response)
}

async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = users::find_public_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(json!({ "user": user })))
}

fn validate_signup(body: &SignupRequest) -> Result<(String, String, String), ApiError> {
    let mut errors = Vec::new();

    let name = body.name.as_deref().unwrap_or("").trim().to_string();
    if name.is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }

    let email = normalize_email(body.email.as_deref().unwrap_or(""));
    if !is_email(&email) {
        errors.push(FieldError::new("email", "A valid email is required"));
    }

    let password = body.password.as_deref().unwrap_or("").to_string();
    if password.len() < 6 {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 6 characters",
        ));
    }

    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }
    Ok((name, email, password))
}

fn validate_login(body: &LoginRequest) -> Result<(String, String), ApiError> {
    let mut errors = Vec::new();

    let email = normalize_email(body.email.as_deref().unwrap_or(""));
    if !is_email(&email) {
        errors.push(FieldError::new("email", "A valid email is required"));
    }

    let password = body.password.as_deref().unwrap_or("").to_string();
    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }

    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }
    Ok((email, password))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_validation_collects_all_field_errors() {
        let body = SignupRequest {
            name: Some("  ".to_string()),
            email: Some("nope".to_string()),
            password: Some("123".to_string()),
        };
        let err = validate_signup(&body).unwrap_err();
        match err {
            ApiError::Validation(errors) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, ["name", "email", "password"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn signup_validation_normalizes_email() {
        let body = SignupRequest {
            name: Some("Ann".to_string()),
            email: Some(" Ann@X.Com ".to_string()),
            password: Some("secret1".to_string()),
        };
        let (_, email, _) = validate_signup(&body).unwrap();
        assert_eq!(email, "ann@x.com");
    }

    #[test]
    fn login_validation_requires_both_fields() {
        let body = LoginRequest {
            email: None,
            password: None,
        };
        let err = validate_login(&body).unwrap_err();
        match err {
            ApiError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
