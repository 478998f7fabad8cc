//! Handlers for `/auth` — the dashboard login path.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth` | Body: [`LoginBody`]; verifies the signature upstream |
//! | `GET`  | `/auth?userId=<id>` | Session snapshot without re-verification |
//!
//! Login verifies the signed message against the network's signature
//! service, then gets-or-creates the user **by fid** so an account
//! provisioned earlier through the frame path is reused rather than
//! duplicated. Every successful re-login refreshes the stored display name
//! and username from the network profile.

use axum::{
  Json,
  extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use taskframe_core::{
  store::TaskStore,
  subscription::Subscription,
  user::{NewUser, User, UserPatch},
  verify::IdentityVerifier,
};
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  subscriptions::{FeatureFlags, feature_flags},
};

/// What both auth endpoints answer with: the user, their live feature
/// flags, and the raw grant rows.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
  pub success:       bool,
  pub user:          User,
  pub features:      FeatureFlags,
  pub subscriptions: Vec<Subscription>,
}

async fn session_for<S: TaskStore>(
  store: &S,
  user: User,
) -> Result<SessionResponse, ApiError> {
  let features = feature_flags(store, user.user_id).await?;
  let subscriptions = store
    .list_active_subscriptions(user.user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(SessionResponse { success: true, user, features, subscriptions })
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
  pub fid:       i64,
  pub signature: String,
  pub message:   String,
}

/// `POST /auth`
pub async fn login<S, V>(
  State(state): State<ApiState<S, V>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<SessionResponse>, ApiError>
where
  S: TaskStore,
  V: IdentityVerifier,
{
  let valid = state
    .verifier
    .verify_signature(&body.message, &body.signature, body.fid)
    .await
    .map_err(|e| ApiError::Verifier(Box::new(e)))?;
  if !valid {
    return Err(ApiError::Unauthorized("invalid signature".to_owned()));
  }

  let profile = state
    .verifier
    .profile(body.fid)
    .await
    .map_err(|e| ApiError::Verifier(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("fid {} not found on the network", body.fid))
    })?;

  let user = match state
    .store
    .get_user_by_fid(body.fid)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
  {
    Some(existing) => state
      .store
      .update_user(existing.user_id, UserPatch {
        display_name: Some(profile.display_name.clone()),
        username:     Some(profile.username.clone()),
      })
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?,
    None => state
      .store
      .create_user(NewUser::verified(&profile))
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?,
  };

  Ok(Json(session_for(state.store.as_ref(), user).await?))
}

// ─── Session snapshot ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionParams {
  pub user_id: Uuid,
}

/// `GET /auth?userId=<id>`
pub async fn session<S, V>(
  State(state): State<ApiState<S, V>>,
  Query(params): Query<SessionParams>,
) -> Result<Json<SessionResponse>, ApiError>
where
  S: TaskStore,
  V: IdentityVerifier,
{
  let user = state
    .store
    .get_user(params.user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("user {} not found", params.user_id))
    })?;

  Ok(Json(session_for(state.store.as_ref(), user).await?))
}
