//! Handlers for `/tasks` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/tasks?userId=<id>` | All of a user's tasks, newest first |
//! | `POST` | `/tasks` | Body: [`CreateTaskBody`]; linking needs `project_linking` |
//! | `PUT`  | `/tasks` | Body: [`UpdateTaskBody`]; partial update by `taskId` |
//! | `DELETE` | `/tasks?taskId=<id>` | 404 if not found |

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use taskframe_core::{
  store::TaskStore,
  subscription::Feature,
  task::{NewTask, Task, TaskPatch},
  verify::IdentityVerifier,
};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

/// Reject a link attempt unless the user holds `project_linking`.
async fn require_project_linking<S: TaskStore>(
  store: &S,
  user_id: Uuid,
) -> Result<(), ApiError> {
  let entitled = store
    .has_active_subscription(user_id, Feature::ProjectLinking)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if entitled {
    Ok(())
  } else {
    Err(ApiError::PremiumRequired(
      "Project linking requires premium subscription".to_owned(),
    ))
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub user_id: Uuid,
}

/// `GET /tasks?userId=<id>`
pub async fn list<S, V>(
  State(state): State<ApiState<S, V>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Task>>, ApiError>
where
  S: TaskStore,
  V: IdentityVerifier,
{
  let tasks = state
    .store
    .list_tasks_by_user(params.user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(tasks))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskBody {
  pub user_id:     Uuid,
  pub title:       String,
  pub description: Option<String>,
  pub due_at:      DateTime<Utc>,
  pub project_id:  Option<Uuid>,
}

/// `POST /tasks` — returns 201 + the stored [`Task`].
pub async fn create<S, V>(
  State(state): State<ApiState<S, V>>,
  Json(body): Json<CreateTaskBody>,
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

  if body.project_id.is_some() {
    require_project_linking(state.store.as_ref(), body.user_id).await?;
  }

  let task = state
    .store
    .create_task(NewTask {
      user_id:     body.user_id,
      title:       body.title,
      description: body.description,
      due_at:      body.due_at,
      project_id:  body.project_id,
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok((StatusCode::CREATED, Json(task)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskBody {
  pub task_id:     Uuid,
  pub title:       Option<String>,
  pub description: Option<String>,
  pub due_at:      Option<DateTime<Utc>>,
  pub completed:   Option<bool>,
  pub project_id:  Option<Uuid>,
}

/// `PUT /tasks` — partial update; absent fields are left untouched.
pub async fn update<S, V>(
  State(state): State<ApiState<S, V>>,
  Json(body): Json<UpdateTaskBody>,
) -> Result<Json<Task>, ApiError>
where
  S: TaskStore,
  V: IdentityVerifier,
{
  let existing = state
    .store
    .get_task(body.task_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("task {} not found", body.task_id)))?;

  // Establishing a project link is the same premium mutation as at creation.
  if body.project_id.is_some() {
    require_project_linking(state.store.as_ref(), existing.user_id).await?;
  }

  let task = state
    .store
    .update_task(body.task_id, TaskPatch {
      title:       body.title,
      description: body.description,
      due_at:      body.due_at,
      completed:   body.completed,
      project_id:  body.project_id,
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(task))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteParams {
  pub task_id: Uuid,
}

/// `DELETE /tasks?taskId=<id>`
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
    .get_task(params.task_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("task {} not found", params.task_id)))?;

  state
    .store
    .delete_task(params.task_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(json!({ "success": true })))
}
