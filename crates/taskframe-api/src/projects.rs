//! Handlers for `/projects` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/projects?userId=<id>` | All of a user's projects, newest first |
//! | `POST` | `/projects` | Body: [`CreateProjectBody`]; needs `project_linking` |
//! | `PUT`  | `/projects` | Body: [`UpdateProjectBody`]; partial update |
//! | `DELETE` | `/projects?projectId=<id>` | 404 if not found |

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use taskframe_core::{
  project::{NewProject, Project, ProjectPatch, ProjectStatus},
  store::TaskStore,
  subscription::Feature,
  verify::IdentityVerifier,
};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub user_id: Uuid,
}

/// `GET /projects?userId=<id>`
pub async fn list<S, V>(
  State(state): State<ApiState<S, V>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Project>>, ApiError>
where
  S: TaskStore,
  V: IdentityVerifier,
{
  let projects = state
    .store
    .list_projects_by_user(params.user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(projects))
}

// ─── Create ───────────────────────────────────────────────────────────────────

fn default_status() -> ProjectStatus { ProjectStatus::Active }

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectBody {
  pub user_id:     Uuid,
  pub title:       String,
  pub description: Option<String>,
  #[serde(default = "default_status")]
  pub status:      ProjectStatus,
}

/// `POST /projects` — returns 201 + the stored [`Project`]. Projects exist
/// only behind the `project_linking` entitlement.
pub async fn create<S, V>(
  State(state): State<ApiState<S, V>>,
  Json(body): Json<CreateProjectBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TaskStore,
  V: IdentityVerifier,
{
  if body.title.trim().is_empty() {
    return Err(ApiError::BadRequest(
      "missing required field: title".to_owned(),
    ));
  }

  state
    .store
    .get_user(body.user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("user {} not found", body.user_id)))?;

  let entitled = state
    .store
    .has_active_subscription(body.user_id, Feature::ProjectLinking)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if !entitled {
    return Err(ApiError::PremiumRequired(
      "Project creation requires premium subscription".to_owned(),
    ));
  }

  let project = state
    .store
    .create_project(NewProject {
      user_id:     body.user_id,
      title:       body.title,
      description: body.description,
      status:      body.status,
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok((StatusCode::CREATED, Json(project)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectBody {
  pub project_id:  Uuid,
  pub title:       Option<String>,
  pub description: Option<String>,
  pub status:      Option<ProjectStatus>,
}

/// `PUT /projects` — partial update; absent fields are left untouched.
pub async fn update<S, V>(
  State(state): State<ApiState<S, V>>,
  Json(body): Json<UpdateProjectBody>,
) -> Result<Json<Project>, ApiError>
where
  S: TaskStore,
  V: IdentityVerifier,
{
  state
    .store
    .get_project(body.project_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("project {} not found", body.project_id))
    })?;

  let project = state
    .store
    .update_project(body.project_id, ProjectPatch {
      title:       body.title,
      description: body.description,
      status:      body.status,
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(project))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteParams {
  pub project_id: Uuid,
}

/// `DELETE /projects?projectId=<id>`
pub async fn remove<S, V>(
  State(state): State<ApiState<S, V>>,
  Query(params): Query<DeleteParams>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: TaskStore,
  V: IdentityVerifier,
{
  state
    .store
    .get_project(params.project_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("project {} not found", params.project_id))
    })?;

  state
    .store
    .delete_project(params.project_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(json!({ "success": true })))
}
