//! Integration tests for the dashboard API against an in-memory store and a
//! stub identity verifier.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use taskframe_core::{
  store::TaskStore as _,
  subscription::Feature,
  user::NewUser,
  verify::{IdentityVerifier, NetworkProfile},
};
use taskframe_store_sqlite::SqliteStore;
use tower::ServiceExt as _;

use crate::{ApiState, api_router};

// ─── Fixtures ────────────────────────────────────────────────────────────────

/// Verifier stub: a fixed verdict and a fixed directory of profiles.
#[derive(Clone)]
struct StubVerifier {
  accept:  bool,
  profile: Option<NetworkProfile>,
}

impl IdentityVerifier for StubVerifier {
  type Error = std::convert::Infallible;

  async fn verify_signature(
    &self,
    _message: &str,
    _signature: &str,
    _fid: i64,
  ) -> Result<bool, Self::Error> {
    Ok(self.accept)
  }

  async fn profile(&self, _fid: i64) -> Result<Option<NetworkProfile>, Self::Error> {
    Ok(self.profile.clone())
  }
}

fn alice_profile() -> NetworkProfile {
  NetworkProfile {
    fid:          555,
    username:     "alice".to_owned(),
    display_name: "Alice".to_owned(),
  }
}

async fn make_state(
  accept: bool,
  profile: Option<NetworkProfile>,
) -> ApiState<SqliteStore, StubVerifier> {
  ApiState {
    store:    Arc::new(SqliteStore::open_in_memory().await.unwrap()),
    verifier: Arc::new(StubVerifier { accept, profile }),
  }
}

fn app(state: ApiState<SqliteStore, StubVerifier>) -> Router {
  api_router(state)
}

async fn send(
  state: ApiState<SqliteStore, StubVerifier>,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = app(state).oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

fn login_body(fid: i64) -> Value {
  json!({ "fid": fid, "signature": "0xsig", "message": "0xmsg" })
}

// ─── Auth ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn login_creates_user_and_reports_features() {
  let state = make_state(true, Some(alice_profile())).await;

  let (status, body) = send(state, "POST", "/auth", Some(login_body(555))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["success"], json!(true));
  assert_eq!(body["user"]["displayName"], json!("Alice"));
  assert_eq!(body["user"]["fid"], json!(555));
  assert_eq!(body["features"]["notifications"], json!(false));
  assert_eq!(body["features"]["projectLinking"], json!(false));
  assert_eq!(body["subscriptions"], json!([]));
}

#[tokio::test]
async fn login_reuses_account_provisioned_by_the_frame_path() {
  let state = make_state(true, Some(alice_profile())).await;

  // The frame path saw fid 555 first and provisioned a bare record.
  let provisional = state
    .store
    .create_user(NewUser::provisional(555))
    .await
    .unwrap();
  assert_eq!(provisional.display_name, "User 555");

  let (status, body) = send(state.clone(), "POST", "/auth", Some(login_body(555))).await;
  assert_eq!(status, StatusCode::OK);

  // Same row, refreshed profile — no split-brain duplicate.
  assert_eq!(body["user"]["userId"], json!(provisional.user_id));
  assert_eq!(body["user"]["displayName"], json!("Alice"));
  assert_eq!(body["user"]["username"], json!("alice"));

  let stored = state.store.get_user_by_fid(555).await.unwrap().unwrap();
  assert_eq!(stored.user_id, provisional.user_id);
}

#[tokio::test]
async fn login_with_bad_signature_is_unauthorized() {
  let state = make_state(false, Some(alice_profile())).await;
  let (status, body) = send(state.clone(), "POST", "/auth", Some(login_body(555))).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert!(body["error"].as_str().unwrap().contains("signature"));

  // Nothing was created.
  assert!(state.store.get_user_by_fid(555).await.unwrap().is_none());
}

#[tokio::test]
async fn login_for_unknown_network_account_is_not_found() {
  let state = make_state(true, None).await;
  let (status, _) = send(state, "POST", "/auth", Some(login_body(999))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_snapshot_for_unknown_user_is_not_found() {
  let state = make_state(true, None).await;
  let uri = format!("/auth?userId={}", uuid::Uuid::new_v4());
  let (status, _) = send(state, "GET", &uri, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Tasks ───────────────────────────────────────────────────────────────────

async fn seeded_user(state: &ApiState<SqliteStore, StubVerifier>) -> uuid::Uuid {
  state
    .store
    .create_user(NewUser::provisional(1))
    .await
    .unwrap()
    .user_id
}

#[tokio::test]
async fn task_crud_round_trip() {
  let state = make_state(true, None).await;
  let user_id = seeded_user(&state).await;

  let (status, task) = send(
    state.clone(),
    "POST",
    "/tasks",
    Some(json!({
      "userId": user_id,
      "title": "Write report",
      "dueAt": "2026-08-07T12:00:00Z"
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(task["title"], json!("Write report"));
  assert_eq!(task["completed"], json!(false));

  let (status, updated) = send(
    state.clone(),
    "PUT",
    "/tasks",
    Some(json!({ "taskId": task["taskId"], "completed": true })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["completed"], json!(true));

  let (status, listed) = send(
    state.clone(),
    "GET",
    &format!("/tasks?userId={user_id}"),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(listed.as_array().unwrap().len(), 1);

  let (status, _) = send(
    state.clone(),
    "DELETE",
    &format!("/tasks?taskId={}", task["taskId"].as_str().unwrap()),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) = send(
    state,
    "DELETE",
    &format!("/tasks?taskId={}", task["taskId"].as_str().unwrap()),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_task_title_is_rejected_before_the_store() {
  let state = make_state(true, None).await;
  let user_id = seeded_user(&state).await;

  let (status, body) = send(
    state.clone(),
    "POST",
    "/tasks",
    Some(json!({
      "userId": user_id,
      "title": "   ",
      "dueAt": "2026-08-07T12:00:00Z"
    })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("title"));

  let tasks = state.store.list_tasks_by_user(user_id).await.unwrap();
  assert!(tasks.is_empty());
}

#[tokio::test]
async fn task_for_unknown_user_is_not_found() {
  let state = make_state(true, None).await;
  let (status, _) = send(
    state,
    "POST",
    "/tasks",
    Some(json!({
      "userId": uuid::Uuid::new_v4(),
      "title": "orphan",
      "dueAt": "2026-08-07T12:00:00Z"
    })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn project_link_requires_entitlement() {
  let state = make_state(true, None).await;
  let user_id = seeded_user(&state).await;

  let (status, body) = send(
    state.clone(),
    "POST",
    "/tasks",
    Some(json!({
      "userId": user_id,
      "title": "linked task",
      "dueAt": "2026-08-07T12:00:00Z",
      "projectId": uuid::Uuid::new_v4()
    })),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert!(body["error"].as_str().unwrap().contains("premium"));

  // State unchanged.
  assert!(state.store.list_tasks_by_user(user_id).await.unwrap().is_empty());
}

// ─── Projects ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn project_creation_requires_entitlement() {
  let state = make_state(true, None).await;
  let user_id = seeded_user(&state).await;

  let (status, _) = send(
    state.clone(),
    "POST",
    "/projects",
    Some(json!({ "userId": user_id, "title": "Website" })),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  // Purchase the feature, then retry.
  let (status, _) = send(
    state.clone(),
    "POST",
    "/subscriptions",
    Some(json!({
      "userId": user_id,
      "featureType": "project_linking",
      "transactionHash": "0xabc"
    })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, project) = send(
    state.clone(),
    "POST",
    "/projects",
    Some(json!({ "userId": user_id, "title": "Website" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(project["status"], json!("active"));

  let (status, updated) = send(
    state,
    "PUT",
    "/projects",
    Some(json!({ "projectId": project["projectId"], "status": "paused" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["status"], json!("paused"));
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

#[tokio::test]
async fn bundle_purchase_grants_both_features_with_one_expiration() {
  let state = make_state(true, None).await;
  let user_id = seeded_user(&state).await;

  let (status, body) = send(
    state.clone(),
    "POST",
    "/subscriptions",
    Some(json!({
      "userId": user_id,
      "featureType": "premium_bundle",
      "transactionHash": "0xabc"
    })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["featureType"], json!("premium_bundle"));

  assert!(
    state.store.has_active_subscription(user_id, Feature::Notifications).await.unwrap()
  );
  assert!(
    state.store.has_active_subscription(user_id, Feature::ProjectLinking).await.unwrap()
  );

  let grants = state.store.list_active_subscriptions(user_id).await.unwrap();
  assert_eq!(grants.len(), 2);
  assert_eq!(grants[0].expires_at, grants[1].expires_at);

  let (status, listed) = send(
    state,
    "GET",
    &format!("/subscriptions?userId={user_id}"),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(listed["activeFeatures"]["notifications"], json!(true));
  assert_eq!(listed["activeFeatures"]["projectLinking"], json!(true));
  assert_eq!(listed["pricing"]["premium_bundle"], json!("0.0025"));
}

#[tokio::test]
async fn unknown_feature_type_is_rejected() {
  let state = make_state(true, None).await;
  let user_id = seeded_user(&state).await;

  let (status, _) = send(
    state,
    "POST",
    "/subscriptions",
    Some(json!({
      "userId": user_id,
      "featureType": "time_travel",
      "transactionHash": "0xabc"
    })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deactivation_clears_the_flag() {
  let state = make_state(true, None).await;
  let user_id = seeded_user(&state).await;

  send(
    state.clone(),
    "POST",
    "/subscriptions",
    Some(json!({
      "userId": user_id,
      "featureType": "notifications",
      "transactionHash": "0xabc"
    })),
  )
  .await;

  let (status, _) = send(
    state.clone(),
    "DELETE",
    &format!("/subscriptions?userId={user_id}&featureType=notifications"),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  assert!(
    !state.store.has_active_subscription(user_id, Feature::Notifications).await.unwrap()
  );
}
