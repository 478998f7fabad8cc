//! Project — a grouping of tasks with a lifecycle status.
//!
//! Projects exist only for users holding an active `project_linking`
//! entitlement; the gate lives in the API layer, not here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
  Active,
  Completed,
  Paused,
}

impl ProjectStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      ProjectStatus::Active => "active",
      ProjectStatus::Completed => "completed",
      ProjectStatus::Paused => "paused",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "active" => Ok(ProjectStatus::Active),
      "completed" => Ok(ProjectStatus::Completed),
      "paused" => Ok(ProjectStatus::Paused),
      other => Err(Error::UnknownProjectStatus(other.to_owned())),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
  pub project_id:  Uuid,
  pub user_id:     Uuid,
  pub title:       String,
  pub description: Option<String>,
  pub status:      ProjectStatus,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// Input for [`create_project`](crate::store::TaskStore::create_project).
#[derive(Debug, Clone)]
pub struct NewProject {
  pub user_id:     Uuid,
  pub title:       String,
  pub description: Option<String>,
  pub status:      ProjectStatus,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub status:      Option<ProjectStatus>,
}
