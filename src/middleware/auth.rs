use axum::{
    extract::{Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{clear_session_cookie, extract_session_token, Claims, TokenError};
use crate::config;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user context extracted from the session token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
    pub is_admin: bool,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            is_admin: claims.is_admin,
        }
    }
}

/// Session authentication middleware.
///
/// Missing cookie and invalid token are distinct 401s; only the invalid
/// case clears the cookie, so a stale token is not resubmitted forever.
/// Verifier misconfiguration surfaces as a 500, not as either 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_session_token(request.headers()) else {
        return ApiError::unauthorized("No token, authorization denied").into_response();
    };

    match state.tokens.verify(&token) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthUser::from(claims));
            next.run(request).await
        }
        Err(TokenError::Invalid) => {
            let mut response = ApiError::unauthorized("Token is not valid").into_response();
            match clear_session_cookie(config::config()) {
                Ok(cookie) => {
                    response.headers_mut().insert(SET_COOKIE, cookie);
                }
                Err(err) => {
                    tracing::error!("Failed to build clearing cookie: {}", err);
                }
            }
            response
        }
        Err(err) => {
            tracing::error!("Auth middleware error: {}", err);
            ApiError::internal("Server error", Some(err.to_string())).into_response()
        }
    }
}

/// Elevated-privilege gate; must run after `auth_middleware`.
pub async fn admin_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let Some(user) = request.extensions().get::<AuthUser>() else {
        return Err(ApiError::unauthorized("Authorization denied"));
    };

    if !user.is_admin {
        return Err(ApiError::forbidden(
            "Access denied. Admin privileges required.",
        ));
    }

    Ok(next.run(request).await)
}
