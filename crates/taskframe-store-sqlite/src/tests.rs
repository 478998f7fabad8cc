//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use taskframe_core::{
  project::{NewProject, ProjectPatch, ProjectStatus},
  store::TaskStore,
  subscription::Feature,
  task::{NewTask, TaskPatch},
  user::{NewUser, User, UserPatch},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, fid: i64) -> User {
  s.create_user(NewUser::provisional(fid)).await.unwrap()
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_user_by_fid() {
  let s = store().await;

  let created = user(&s, 555).await;
  assert_eq!(created.fid, 555);
  assert_eq!(created.display_name, "User 555");

  let fetched = s.get_user_by_fid(555).await.unwrap().unwrap();
  assert_eq!(fetched.user_id, created.user_id);
  assert_eq!(fetched.username, "user555");
}

#[tokio::test]
async fn get_user_missing_returns_none() {
  let s = store().await;
  assert!(s.get_user(Uuid::new_v4()).await.unwrap().is_none());
  assert!(s.get_user_by_fid(999).await.unwrap().is_none());
}

#[tokio::test]
async fn provisional_records_converge_on_one_row() {
  let s = store().await;

  // First contact provisions a row; the second event finds it by fid
  // instead of inserting a duplicate.
  let first = user(&s, 777).await;
  let second = s.get_user_by_fid(777).await.unwrap().unwrap();
  assert_eq!(first.user_id, second.user_id);

  // A blind re-create with the same derived id collides on the primary key.
  assert!(s.create_user(NewUser::provisional(777)).await.is_err());
}

#[tokio::test]
async fn update_user_refreshes_profile_fields() {
  let s = store().await;
  let u = user(&s, 12).await;

  let updated = s
    .update_user(u.user_id, UserPatch {
      display_name: Some("Alice".into()),
      username:     Some("alice".into()),
    })
    .await
    .unwrap();

  assert_eq!(updated.display_name, "Alice");
  assert_eq!(updated.username, "alice");
  assert_eq!(updated.fid, 12, "fid is immutable");

  let fetched = s.get_user(u.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.display_name, "Alice");
}

#[tokio::test]
async fn update_missing_user_errors() {
  let s = store().await;
  let err = s
    .update_user(Uuid::new_v4(), UserPatch::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::UserNotFound(_)));
}

// ─── Tasks ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_task_defaults() {
  let s = store().await;
  let u = user(&s, 1).await;

  let task = s
    .create_task(NewTask::quick(u.user_id, "Ship release"))
    .await
    .unwrap();

  assert_eq!(task.title, "Ship release");
  assert!(!task.completed);
  assert!(task.project_id.is_none());

  let fetched = s.get_task(task.task_id).await.unwrap().unwrap();
  assert_eq!(fetched.task_id, task.task_id);
  assert_eq!(fetched.user_id, u.user_id);
}

#[tokio::test]
async fn list_tasks_scoped_to_user() {
  let s = store().await;
  let alice = user(&s, 1).await;
  let bob = user(&s, 2).await;

  s.create_task(NewTask::quick(alice.user_id, "a1")).await.unwrap();
  s.create_task(NewTask::quick(alice.user_id, "a2")).await.unwrap();
  s.create_task(NewTask::quick(bob.user_id, "b1")).await.unwrap();

  let tasks = s.list_tasks_by_user(alice.user_id).await.unwrap();
  assert_eq!(tasks.len(), 2);
  assert!(tasks.iter().all(|t| t.user_id == alice.user_id));
}

#[tokio::test]
async fn update_task_applies_patch() {
  let s = store().await;
  let u = user(&s, 1).await;
  let task = s
    .create_task(NewTask::quick(u.user_id, "draft"))
    .await
    .unwrap();

  let updated = s
    .update_task(task.task_id, TaskPatch {
      title: Some("final".into()),
      completed: Some(true),
      ..Default::default()
    })
    .await
    .unwrap();

  assert_eq!(updated.title, "final");
  assert!(updated.completed);
  // Untouched fields survive.
  assert_eq!(updated.due_at, task.due_at);
  assert!(updated.updated_at >= task.updated_at);
}

#[tokio::test]
async fn task_links_to_project() {
  let s = store().await;
  let u = user(&s, 1).await;
  let project = s
    .create_project(NewProject {
      user_id:     u.user_id,
      title:       "Website".into(),
      description: None,
      status:      ProjectStatus::Active,
    })
    .await
    .unwrap();

  let mut input = NewTask::quick(u.user_id, "landing page");
  input.project_id = Some(project.project_id);
  let task = s.create_task(input).await.unwrap();

  let fetched = s.get_task(task.task_id).await.unwrap().unwrap();
  assert_eq!(fetched.project_id, Some(project.project_id));
}

#[tokio::test]
async fn delete_task_removes_row() {
  let s = store().await;
  let u = user(&s, 1).await;
  let task = s.create_task(NewTask::quick(u.user_id, "x")).await.unwrap();

  s.delete_task(task.task_id).await.unwrap();
  assert!(s.get_task(task.task_id).await.unwrap().is_none());

  let err = s.delete_task(task.task_id).await.unwrap_err();
  assert!(matches!(err, Error::TaskNotFound(_)));
}

// ─── Projects ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn project_lifecycle_round_trip() {
  let s = store().await;
  let u = user(&s, 1).await;

  let project = s
    .create_project(NewProject {
      user_id:     u.user_id,
      title:       "Mobile App".into(),
      description: Some("v2 rewrite".into()),
      status:      ProjectStatus::Active,
    })
    .await
    .unwrap();
  assert_eq!(project.status, ProjectStatus::Active);

  let paused = s
    .update_project(project.project_id, ProjectPatch {
      status: Some(ProjectStatus::Paused),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(paused.status, ProjectStatus::Paused);
  assert_eq!(paused.title, "Mobile App");

  let listed = s.list_projects_by_user(u.user_id).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].status, ProjectStatus::Paused);

  s.delete_project(project.project_id).await.unwrap();
  let err = s.delete_project(project.project_id).await.unwrap_err();
  assert!(matches!(err, Error::ProjectNotFound(_)));
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

#[tokio::test]
async fn unexpired_grant_checks_true_twice() {
  let s = store().await;
  let u = user(&s, 1).await;
  let expires = Utc::now() + Duration::days(30);

  s.create_subscription(u.user_id, Feature::Notifications, Some(expires))
    .await
    .unwrap();

  // Idempotent: the check has no side effects on a live grant.
  assert!(s.has_active_subscription(u.user_id, Feature::Notifications).await.unwrap());
  assert!(s.has_active_subscription(u.user_id, Feature::Notifications).await.unwrap());

  let active = s.list_active_subscriptions(u.user_id).await.unwrap();
  assert_eq!(active.len(), 1);
  assert!(active[0].is_active);
}

#[tokio::test]
async fn expired_grant_is_deactivated_on_first_read() {
  let s = store().await;
  let u = user(&s, 1).await;
  let expired = Utc::now() - Duration::days(1);

  s.create_subscription(u.user_id, Feature::ProjectLinking, Some(expired))
    .await
    .unwrap();

  // The stored flag is still set until a read discovers the expiry.
  assert_eq!(s.list_active_subscriptions(u.user_id).await.unwrap().len(), 1);

  // First read: reports false and persists the deactivation.
  assert!(!s.has_active_subscription(u.user_id, Feature::ProjectLinking).await.unwrap());
  assert!(s.list_active_subscriptions(u.user_id).await.unwrap().is_empty());

  // Second read: still false.
  assert!(!s.has_active_subscription(u.user_id, Feature::ProjectLinking).await.unwrap());
}

#[tokio::test]
async fn grant_without_expiration_never_expires() {
  let s = store().await;
  let u = user(&s, 1).await;

  s.create_subscription(u.user_id, Feature::Notifications, None)
    .await
    .unwrap();

  assert!(s.has_active_subscription(u.user_id, Feature::Notifications).await.unwrap());
}

#[tokio::test]
async fn features_are_checked_independently() {
  let s = store().await;
  let u = user(&s, 1).await;
  let expires = Utc::now() + Duration::days(30);

  s.create_subscription(u.user_id, Feature::Notifications, Some(expires))
    .await
    .unwrap();

  assert!(s.has_active_subscription(u.user_id, Feature::Notifications).await.unwrap());
  assert!(!s.has_active_subscription(u.user_id, Feature::ProjectLinking).await.unwrap());
}

#[tokio::test]
async fn bundle_grants_share_one_expiration() {
  let s = store().await;
  let u = user(&s, 1).await;
  let expires = Utc::now() + Duration::days(30);

  for feature in Feature::PremiumBundle.grants() {
    s.create_subscription(u.user_id, *feature, Some(expires))
      .await
      .unwrap();
  }

  assert!(s.has_active_subscription(u.user_id, Feature::Notifications).await.unwrap());
  assert!(s.has_active_subscription(u.user_id, Feature::ProjectLinking).await.unwrap());

  let active = s.list_active_subscriptions(u.user_id).await.unwrap();
  assert_eq!(active.len(), 2);
  assert_eq!(active[0].expires_at, active[1].expires_at);
}

#[tokio::test]
async fn deactivate_subscription_clears_all_grants() {
  let s = store().await;
  let u = user(&s, 1).await;
  let expires = Utc::now() + Duration::days(30);

  s.create_subscription(u.user_id, Feature::Notifications, Some(expires))
    .await
    .unwrap();
  s.create_subscription(u.user_id, Feature::Notifications, None)
    .await
    .unwrap();

  s.deactivate_subscription(u.user_id, Feature::Notifications)
    .await
    .unwrap();

  assert!(!s.has_active_subscription(u.user_id, Feature::Notifications).await.unwrap());
  assert!(s.list_active_subscriptions(u.user_id).await.unwrap().is_empty());
}
