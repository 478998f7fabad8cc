//! Task — the unit of work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
  pub task_id:     Uuid,
  pub user_id:     Uuid,
  pub title:       String,
  pub description: Option<String>,
  pub due_at:      DateTime<Utc>,
  pub completed:   bool,
  /// Owning project, if linked. Linking is gated on the `project_linking`
  /// entitlement; the gate is applied before the write reaches the store.
  pub project_id:  Option<Uuid>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// Input for [`create_task`](crate::store::TaskStore::create_task).
/// The `task_id` and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewTask {
  pub user_id:     Uuid,
  pub title:       String,
  pub description: Option<String>,
  pub due_at:      DateTime<Utc>,
  pub project_id:  Option<Uuid>,
}

impl NewTask {
  /// A bare task as the frame path creates it: due now, no description,
  /// unlinked.
  pub fn quick(user_id: Uuid, title: impl Into<String>) -> Self {
    Self {
      user_id,
      title: title.into(),
      description: None,
      due_at: Utc::now(),
      project_id: None,
    }
  }
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub due_at:      Option<DateTime<Utc>>,
  pub completed:   Option<bool>,
  pub project_id:  Option<Uuid>,
}
