//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings; UUIDs as hyphenated
//! lowercase strings; enums as their snake_case discriminants. Each entity
//! has exactly one `Raw*` row type and one translation into the domain type,
//! so schema drift is confined to this file.

use chrono::{DateTime, Utc};
use taskframe_core::{
  project::{Project, ProjectStatus},
  subscription::{Feature, Subscription},
  task::Task,
  user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn encode_status(s: ProjectStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<ProjectStatus> {
  Ok(ProjectStatus::parse(s)?)
}

pub fn encode_feature(f: Feature) -> &'static str { f.as_str() }

pub fn decode_feature(s: &str) -> Result<Feature> { Ok(Feature::parse(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:      String,
  pub display_name: String,
  pub username:     String,
  pub fid:          i64,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:      decode_uuid(&self.user_id)?,
      display_name: self.display_name,
      username:     self.username,
      fid:          self.fid,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `tasks` row.
pub struct RawTask {
  pub task_id:     String,
  pub user_id:     String,
  pub title:       String,
  pub description: Option<String>,
  pub due_at:      String,
  pub completed:   bool,
  pub project_id:  Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawTask {
  pub fn into_task(self) -> Result<Task> {
    Ok(Task {
      task_id:     decode_uuid(&self.task_id)?,
      user_id:     decode_uuid(&self.user_id)?,
      title:       self.title,
      description: self.description,
      due_at:      decode_dt(&self.due_at)?,
      completed:   self.completed,
      project_id:  self
        .project_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `projects` row.
pub struct RawProject {
  pub project_id:  String,
  pub user_id:     String,
  pub title:       String,
  pub description: Option<String>,
  pub status:      String,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawProject {
  pub fn into_project(self) -> Result<Project> {
    Ok(Project {
      project_id:  decode_uuid(&self.project_id)?,
      user_id:     decode_uuid(&self.user_id)?,
      title:       self.title,
      description: self.description,
      status:      decode_status(&self.status)?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `subscriptions` row. The row id is kept
/// alongside so the lazy-expiry pass can deactivate specific rows.
pub struct RawSubscription {
  pub subscription_id: String,
  pub user_id:         String,
  pub feature:         String,
  pub is_active:       bool,
  pub expires_at:      Option<String>,
  pub created_at:      String,
}

impl RawSubscription {
  pub fn into_subscription(self) -> Result<Subscription> {
    Ok(Subscription {
      user_id:    decode_uuid(&self.user_id)?,
      feature:    decode_feature(&self.feature)?,
      is_active:  self.is_active,
      expires_at: self
        .expires_at
        .as_deref()
        .map(decode_dt)
        .transpose()?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
