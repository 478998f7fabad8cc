//! The `TaskStore` trait — the persistence gateway contract.
//!
//! The trait is implemented by storage backends (e.g.
//! `taskframe-store-sqlite`). Higher layers (`taskframe-frame`,
//! `taskframe-api`) depend on this abstraction, not on any concrete backend.
//! It owns no business logic beyond data-shape translation; entitlement
//! gating and protocol decisions live in the callers.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  project::{NewProject, Project, ProjectPatch},
  subscription::{Feature, Subscription},
  task::{NewTask, Task, TaskPatch},
  user::{NewUser, User, UserPatch},
};

/// Abstraction over a Taskframe storage backend.
///
/// Lookups return `Option`; mutations against missing rows return a
/// not-found error. All methods return `Send` futures so the trait can be
/// used in multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait TaskStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Look up a user by their external-network identity. This is the only
  /// user lookup the frame and login paths use to find an existing account.
  fn get_user_by_fid(
    &self,
    fid: i64,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Retrieve a user by local id. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Create and persist a user with the caller-supplied id. Returns an
  /// error if the id or fid is already taken.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Apply a patch (display name / username refresh) and return the updated
  /// row. The fid is immutable and not patchable.
  fn update_user(
    &self,
    id: Uuid,
    patch: UserPatch,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  // ── Tasks ─────────────────────────────────────────────────────────────

  fn create_task(
    &self,
    input: NewTask,
  ) -> impl Future<Output = Result<Task, Self::Error>> + Send + '_;

  fn get_task(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Task>, Self::Error>> + Send + '_;

  /// All tasks owned by `user_id`, newest first.
  fn list_tasks_by_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Task>, Self::Error>> + Send + '_;

  fn update_task(
    &self,
    id: Uuid,
    patch: TaskPatch,
  ) -> impl Future<Output = Result<Task, Self::Error>> + Send + '_;

  fn delete_task(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Projects ──────────────────────────────────────────────────────────

  fn create_project(
    &self,
    input: NewProject,
  ) -> impl Future<Output = Result<Project, Self::Error>> + Send + '_;

  fn get_project(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Project>, Self::Error>> + Send + '_;

  /// All projects owned by `user_id`, newest first.
  fn list_projects_by_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Project>, Self::Error>> + Send + '_;

  fn update_project(
    &self,
    id: Uuid,
    patch: ProjectPatch,
  ) -> impl Future<Output = Result<Project, Self::Error>> + Send + '_;

  fn delete_project(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Subscriptions ─────────────────────────────────────────────────────

  /// Record a grant of `feature` to `user_id`, active, expiring at
  /// `expires_at` (or never, if `None`).
  fn create_subscription(
    &self,
    user_id: Uuid,
    feature: Feature,
    expires_at: Option<DateTime<Utc>>,
  ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send + '_;

  /// All grants for `user_id` whose stored active flag is set. Rows past
  /// their expiration may still appear here until a
  /// [`has_active_subscription`](TaskStore::has_active_subscription) read
  /// deactivates them.
  fn list_active_subscriptions(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Subscription>, Self::Error>> + Send + '_;

  /// Whether `user_id` holds a live grant of `feature`.
  ///
  /// This is the lazy-expiry read: a grant found past its expiration is
  /// deactivated in storage as a side effect of this call, and `false` is
  /// returned. The write-back is best-effort, not a guarded transaction —
  /// concurrent readers near the boundary may briefly both observe the
  /// grant as active.
  fn has_active_subscription(
    &self,
    user_id: Uuid,
    feature: Feature,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Clear the active flag on every grant of `feature` held by `user_id`.
  fn deactivate_subscription(
    &self,
    user_id: Uuid,
    feature: Feature,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
