// Project CRUD; listing is public, mutations require a session.

use axum::{
    extract::{Extension, Path, State},
    handler::Handler,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::validate::is_url;
use crate::database::projects::{self, NewProject, ProjectChanges};
use crate::database::models::{Project, ProjectWithTechnologies};
use crate::error::{ApiError, FieldError};
use crate::middleware::{auth_middleware, AuthUser};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    let auth = from_fn_with_state(state.clone(), auth_middleware);

    Router::new()
        .route("/api/projects/featured", get(list_featured))
        .route(
            "/api/projects",
            get(list_projects).post(create_project.layer(auth.clone())),
        )
        .route(
            "/api/projects/:id",
            put(update_project).delete(delete_project).layer(auth),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub featured: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub featured: Option<bool>,
}

async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectWithTechnologies>>, ApiError> {
    Ok(Json(projects::list_all(&state.pool).await?))
}

async fn list_featured(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectWithTechnologies>>, ApiError> {
    Ok(Json(projects::list_featured(&state.pool).await?))
}

async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let input = validate_create(&body)?;
    let project = projects::create(&state.pool, auth.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateProjectRequest>,
) -> Result<Json<Project>, ApiError> {
    let changes = validate_update(&body)?;
    let project = projects::update(&state.pool, auth.user_id, id, &changes)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;
    Ok(Json(project))
}

async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !projects::delete(&state.pool, auth.user_id, id).await? {
        return Err(ApiError::not_found("Project not found"));
    }
    Ok(Json(json!({ "message": "Project deleted successfully" })))
}

fn validate_create(body: &CreateProjectRequest) -> Result<NewProject, ApiError> {
    let mut errors = Vec::new();

    let title = body.title.as_deref().unwrap_or("").trim().to_string();
    if title.is_empty() {
        errors.push(FieldError::new("title", "Title is required"));
    }

    let description = body.description.as_deref().unwrap_or("").trim().to_string();
    if description.is_empty() {
        errors.push(FieldError::new("description", "Description is required"));
    }

    validate_urls(&body.github_url, &body.live_url, &mut errors);

    let Some(technologies) = body.technologies.clone() else {
        errors.push(FieldError::new("technologies", "Technologies must be an array"));
        return Err(ApiError::validation(errors));
    };

    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    Ok(NewProject {
        title,
        description,
        github_url: body.github_url.clone(),
        live_url: body.live_url.clone(),
        featured: body.featured.unwrap_or(false),
        technologies,
    })
}

fn validate_update(body: &UpdateProjectRequest) -> Result<ProjectChanges, ApiError> {
    let mut errors = Vec::new();
    validate_urls(&body.github_url, &body.live_url, &mut errors);
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    Ok(ProjectChanges {
        title: body.title.as_deref().map(|s| s.trim().to_string()),
        description: body.description.as_deref().map(|s| s.trim().to_string()),
        github_url: body.github_url.clone(),
        live_url: body.live_url.clone(),
        featured: body.featured,
        technologies: body.technologies.clone(),
    })
}

fn validate_urls(
    github_url: &Option<String>,
    live_url: &Option<String>,
    errors: &mut Vec<FieldError>,
) {
    if let Some(url) = github_url {
        if !is_url(url) {
            errors.push(FieldError::new("githubUrl", "Must be a valid URL"));
        }
    }
    if let Some(url) = live_url {
        if !is_url(url) {
            errors.push(FieldError::new("liveUrl", "Must be a valid URL"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_title_description_and_technologies() {
        let body = CreateProjectRequest {
            title: None,
            description: None,
            github_url: None,
            live_url: None,
            technologies: None,
            featured: None,
        };
        match validate_create(&body).unwrap_err() {
            ApiError::Validation(errors) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, ["title", "description", "technologies"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_rejects_malformed_urls() {
        let body = CreateProjectRequest {
            title: Some("Scanner".to_string()),
            description: Some("Port scanner".to_string()),
            github_url: Some("not-a-url".to_string()),
            live_url: None,
            technologies: Some(vec!["Rust".to_string()]),
            featured: None,
        };
        assert!(matches!(
            validate_create(&body),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn update_with_no_fields_is_a_noop_change_set() {
        let body = UpdateProjectRequest {
            title: None,
            description: None,
            github_url: None,
            live_url: None,
            technologies: None,
            featured: None,
        };
        let changes = validate_update(&body).unwrap();
        assert!(changes.title.is_none());
        assert!(changes.technologies.is_none());
    }
}
