//! [`SqliteStore`] — the SQLite implementation of [`TaskStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use taskframe_core::{
  project::{NewProject, Project, ProjectPatch},
  store::TaskStore,
  subscription::{Feature, Subscription},
  task::{NewTask, Task, TaskPatch},
  user::{NewUser, User, UserPatch},
};

use crate::{
  encode::{
    RawProject, RawSubscription, RawTask, RawUser, decode_dt, encode_dt,
    encode_feature, encode_status, encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Taskframe store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Write every mutable column of `task` back to its row.
  async fn write_task(&self, task: &Task) -> Result<()> {
    let id_str         = encode_uuid(task.task_id);
    let title          = task.title.clone();
    let description    = task.description.clone();
    let due_at_str     = encode_dt(task.due_at);
    let completed      = task.completed;
    let project_id_str = task.project_id.map(encode_uuid);
    let updated_at_str = encode_dt(task.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE tasks
           SET title = ?1, description = ?2, due_at = ?3, completed = ?4,
               project_id = ?5, updated_at = ?6
           WHERE task_id = ?7",
          rusqlite::params![
            title,
            description,
            due_at_str,
            completed,
            project_id_str,
            updated_at_str,
            id_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Write every mutable column of `project` back to its row.
  async fn write_project(&self, project: &Project) -> Result<()> {
    let id_str         = encode_uuid(project.project_id);
    let title          = project.title.clone();
    let description    = project.description.clone();
    let status_str     = encode_status(project.status).to_owned();
    let updated_at_str = encode_dt(project.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE projects
           SET title = ?1, description = ?2, status = ?3, updated_at = ?4
           WHERE project_id = ?5",
          rusqlite::params![
            title,
            description,
            status_str,
            updated_at_str,
            id_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── TaskStore impl ──────────────────────────────────────────────────────────

impl TaskStore for SqliteStore {
  type Error = Error;

  // ── Users ──────────────────────────────────────────────────────────────────

  async fn get_user_by_fid(&self, fid: i64) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT user_id, display_name, username, fid, created_at, updated_at
             FROM users WHERE fid = ?1",
            rusqlite::params![fid],
            |row| {
              Ok(RawUser {
                user_id:      row.get(0)?,
                display_name: row.get(1)?,
                username:     row.get(2)?,
                fid:          row.get(3)?,
                created_at:   row.get(4)?,
                updated_at:   row.get(5)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT user_id, display_name, username, fid, created_at, updated_at
             FROM users WHERE user_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawUser {
                user_id:      row.get(0)?,
                display_name: row.get(1)?,
                username:     row.get(2)?,
                fid:          row.get(3)?,
                created_at:   row.get(4)?,
                updated_at:   row.get(5)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let now = Utc::now();
    let user = User {
      user_id:      input.user_id,
      display_name: input.display_name,
      username:     input.username,
      fid:          input.fid,
      created_at:   now,
      updated_at:   now,
    };

    let id_str       = encode_uuid(user.user_id);
    let display_name = user.display_name.clone();
    let username     = user.username.clone();
    let fid          = user.fid;
    let at_str       = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, display_name, username, fid, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, display_name, username, fid, at_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<User> {
    let mut user = self.get_user(id).await?.ok_or(Error::UserNotFound(id))?;
    if let Some(display_name) = patch.display_name {
      user.display_name = display_name;
    }
    if let Some(username) = patch.username {
      user.username = username;
    }
    user.updated_at = Utc::now();

    let id_str         = encode_uuid(user.user_id);
    let display_name   = user.display_name.clone();
    let username       = user.username.clone();
    let updated_at_str = encode_dt(user.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE users SET display_name = ?1, username = ?2, updated_at = ?3
           WHERE user_id = ?4",
          rusqlite::params![display_name, username, updated_at_str, id_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  // ── Tasks ──────────────────────────────────────────────────────────────────

  async fn create_task(&self, input: NewTask) -> Result<Task> {
    let now = Utc::now();
    let task = Task {
      task_id:     Uuid::new_v4(),
      user_id:     input.user_id,
      title:       input.title,
      description: input.description,
      due_at:      input.due_at,
      completed:   false,
      project_id:  input.project_id,
      created_at:  now,
      updated_at:  now,
    };

    let id_str         = encode_uuid(task.task_id);
    let user_id_str    = encode_uuid(task.user_id);
    let title          = task.title.clone();
    let description    = task.description.clone();
    let due_at_str     = encode_dt(task.due_at);
    let project_id_str = task.project_id.map(encode_uuid);
    let at_str         = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO tasks (
             task_id, user_id, title, description, due_at, completed,
             project_id, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            user_id_str,
            title,
            description,
            due_at_str,
            project_id_str,
            at_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(task)
  }

  async fn get_task(&self, id: Uuid) -> Result<Option<Task>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawTask> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT task_id, user_id, title, description, due_at, completed,
                    project_id, created_at, updated_at
             FROM tasks WHERE task_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawTask {
                task_id:     row.get(0)?,
                user_id:     row.get(1)?,
                title:       row.get(2)?,
                description: row.get(3)?,
                due_at:      row.get(4)?,
                completed:   row.get(5)?,
                project_id:  row.get(6)?,
                created_at:  row.get(7)?,
                updated_at:  row.get(8)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawTask::into_task).transpose()
  }

  async fn list_tasks_by_user(&self, user_id: Uuid) -> Result<Vec<Task>> {
    let user_id_str = encode_uuid(user_id);

    let raws: Vec<RawTask> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT task_id, user_id, title, description, due_at, completed,
                  project_id, created_at, updated_at
           FROM tasks WHERE user_id = ?1
           ORDER BY created_at DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id_str], |row| {
            Ok(RawTask {
              task_id:     row.get(0)?,
              user_id:     row.get(1)?,
              title:       row.get(2)?,
              description: row.get(3)?,
              due_at:      row.get(4)?,
              completed:   row.get(5)?,
              project_id:  row.get(6)?,
              created_at:  row.get(7)?,
              updated_at:  row.get(8)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTask::into_task).collect()
  }

  async fn update_task(&self, id: Uuid, patch: TaskPatch) -> Result<Task> {
    let mut task = self.get_task(id).await?.ok_or(Error::TaskNotFound(id))?;
    if let Some(title) = patch.title {
      task.title = title;
    }
    if let Some(description) = patch.description {
      task.description = Some(description);
    }
    if let Some(due_at) = patch.due_at {
      task.due_at = due_at;
    }
    if let Some(completed) = patch.completed {
      task.completed = completed;
    }
    if let Some(project_id) = patch.project_id {
      task.project_id = Some(project_id);
    }
    task.updated_at = Utc::now();

    self.write_task(&task).await?;
    Ok(task)
  }

  async fn delete_task(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM tasks WHERE task_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::TaskNotFound(id));
    }
    Ok(())
  }

  // ── Projects ───────────────────────────────────────────────────────────────

  async fn create_project(&self, input: NewProject) -> Result<Project> {
    let now = Utc::now();
    let project = Project {
      project_id:  Uuid::new_v4(),
      user_id:     input.user_id,
      title:       input.title,
      description: input.description,
      status:      input.status,
      created_at:  now,
      updated_at:  now,
    };

    let id_str      = encode_uuid(project.project_id);
    let user_id_str = encode_uuid(project.user_id);
    let title       = project.title.clone();
    let description = project.description.clone();
    let status_str  = encode_status(project.status).to_owned();
    let at_str      = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO projects (
             project_id, user_id, title, description, status,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            user_id_str,
            title,
            description,
            status_str,
            at_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(project)
  }

  async fn get_project(&self, id: Uuid) -> Result<Option<Project>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawProject> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT project_id, user_id, title, description, status,
                    created_at, updated_at
             FROM projects WHERE project_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawProject {
                project_id:  row.get(0)?,
                user_id:     row.get(1)?,
                title:       row.get(2)?,
                description: row.get(3)?,
                status:      row.get(4)?,
                created_at:  row.get(5)?,
                updated_at:  row.get(6)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawProject::into_project).transpose()
  }

  async fn list_projects_by_user(&self, user_id: Uuid) -> Result<Vec<Project>> {
    let user_id_str = encode_uuid(user_id);

    let raws: Vec<RawProject> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT project_id, user_id, title, description, status,
                  created_at, updated_at
           FROM projects WHERE user_id = ?1
           ORDER BY created_at DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id_str], |row| {
            Ok(RawProject {
              project_id:  row.get(0)?,
              user_id:     row.get(1)?,
              title:       row.get(2)?,
              description: row.get(3)?,
              status:      row.get(4)?,
              created_at:  row.get(5)?,
              updated_at:  row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProject::into_project).collect()
  }

  async fn update_project(&self, id: Uuid, patch: ProjectPatch) -> Result<Project> {
    let mut project = self
      .get_project(id)
      .await?
      .ok_or(Error::ProjectNotFound(id))?;
    if let Some(title) = patch.title {
      project.title = title;
    }
    if let Some(description) = patch.description {
      project.description = Some(description);
    }
    if let Some(status) = patch.status {
      project.status = status;
    }
    project.updated_at = Utc::now();

    self.write_project(&project).await?;
    Ok(project)
  }

  async fn delete_project(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM projects WHERE project_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::ProjectNotFound(id));
    }
    Ok(())
  }

  // ── Subscriptions ──────────────────────────────────────────────────────────

  async fn create_subscription(
    &self,
    user_id: Uuid,
    feature: Feature,
    expires_at: Option<chrono::DateTime<Utc>>,
  ) -> Result<Subscription> {
    let now = Utc::now();
    let subscription = Subscription {
      user_id,
      feature,
      is_active: true,
      expires_at,
      created_at: now,
    };

    let id_str         = encode_uuid(Uuid::new_v4());
    let user_id_str    = encode_uuid(user_id);
    let feature_str    = encode_feature(feature).to_owned();
    let expires_at_str = expires_at.map(encode_dt);
    let at_str         = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subscriptions (
             subscription_id, user_id, feature, is_active, expires_at, created_at
           ) VALUES (?1, ?2, ?3, 1, ?4, ?5)",
          rusqlite::params![id_str, user_id_str, feature_str, expires_at_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(subscription)
  }

  async fn list_active_subscriptions(&self, user_id: Uuid) -> Result<Vec<Subscription>> {
    let user_id_str = encode_uuid(user_id);

    let raws: Vec<RawSubscription> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT subscription_id, user_id, feature, is_active, expires_at, created_at
           FROM subscriptions WHERE user_id = ?1 AND is_active = 1
           ORDER BY created_at DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id_str], |row| {
            Ok(RawSubscription {
              subscription_id: row.get(0)?,
              user_id:         row.get(1)?,
              feature:         row.get(2)?,
              is_active:       row.get(3)?,
              expires_at:      row.get(4)?,
              created_at:      row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawSubscription::into_subscription)
      .collect()
  }

  async fn has_active_subscription(&self, user_id: Uuid, feature: Feature) -> Result<bool> {
    let user_id_str = encode_uuid(user_id);
    let feature_str = encode_feature(feature).to_owned();

    let raws: Vec<RawSubscription> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT subscription_id, user_id, feature, is_active, expires_at, created_at
           FROM subscriptions
           WHERE user_id = ?1 AND feature = ?2 AND is_active = 1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id_str, feature_str], |row| {
            Ok(RawSubscription {
              subscription_id: row.get(0)?,
              user_id:         row.get(1)?,
              feature:         row.get(2)?,
              is_active:       row.get(3)?,
              expires_at:      row.get(4)?,
              created_at:      row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    // Partition into live grants and grants whose expiration has passed.
    // The latter are deactivated as a side effect of this read — lazy
    // expiry, no background sweep.
    let now = Utc::now();
    let mut live = false;
    let mut expired_ids: Vec<String> = Vec::new();

    for raw in raws {
      let expires_at = raw.expires_at.as_deref().map(decode_dt).transpose()?;
      match expires_at {
        Some(at) if at <= now => expired_ids.push(raw.subscription_id),
        _ => live = true,
      }
    }

    if !expired_ids.is_empty() {
      self
        .conn
        .call(move |conn| {
          for id in &expired_ids {
            conn.execute(
              "UPDATE subscriptions SET is_active = 0 WHERE subscription_id = ?1",
              rusqlite::params![id],
            )?;
          }
          Ok(())
        })
        .await?;
    }

    Ok(live)
  }

  async fn deactivate_subscription(&self, user_id: Uuid, feature: Feature) -> Result<()> {
    let user_id_str = encode_uuid(user_id);
    let feature_str = encode_feature(feature).to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE subscriptions SET is_active = 0
           WHERE user_id = ?1 AND feature = ?2",
          rusqlite::params![user_id_str, feature_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
