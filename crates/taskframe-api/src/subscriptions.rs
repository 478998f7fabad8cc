//! Handlers for `/subscriptions` endpoints — the paid-feature surface.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/subscriptions?userId=<id>` | Grants, live flags, pricing |
//! | `POST` | `/subscriptions` | Body: [`PurchaseBody`]; 30-day grant |
//! | `DELETE` | `/subscriptions?userId=<id>&featureType=<f>` | Deactivate |
//!
//! A purchase records the settlement transaction hash untrusted; verifying
//! it on the ledger happens outside this service.

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use taskframe_core::{
  store::TaskStore,
  subscription::{Feature, GRANT_DAYS, Subscription},
  verify::IdentityVerifier,
};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

/// Live flags for the two concrete features, as the dashboard consumes them.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlags {
  pub notifications:   bool,
  pub project_linking: bool,
}

/// Evaluate both feature flags through the lazy-expiry read.
pub(crate) async fn feature_flags<S: TaskStore>(
  store: &S,
  user_id: Uuid,
) -> Result<FeatureFlags, ApiError> {
  let notifications = store
    .has_active_subscription(user_id, Feature::Notifications)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let project_linking = store
    .has_active_subscription(user_id, Feature::ProjectLinking)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(FeatureFlags { notifications, project_linking })
}

fn pricing() -> serde_json::Value {
  json!({
    "notifications":   Feature::Notifications.price_eth(),
    "project_linking": Feature::ProjectLinking.price_eth(),
    "premium_bundle":  Feature::PremiumBundle.price_eth(),
  })
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
  pub subscriptions:   Vec<Subscription>,
  pub active_features: FeatureFlags,
  pub pricing:         serde_json::Value,
}

/// `GET /subscriptions?userId=<id>`
pub async fn list<S, V>(
  State(state): State<ApiState<S, V>>,
  Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError>
where
  S: TaskStore,
  V: IdentityVerifier,
{
  // Flags first: the lazy-expiry write-back prunes dead grants from the
  // listing that follows.
  let active_features = feature_flags(state.store.as_ref(), params.user_id).await?;
  let subscriptions = state
    .store
    .list_active_subscriptions(params.user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(ListResponse {
    subscriptions,
    active_features,
    pricing: pricing(),
  }))
}

// ─── Purchase ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseBody {
  pub user_id:          Uuid,
  pub feature_type:     String,
  /// Settlement transaction on the external ledger. Recorded, not verified.
  pub transaction_hash: String,
  /// Grant duration in days; defaults to the catalog duration.
  pub duration:         Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
  pub success:      bool,
  pub feature_type: String,
  pub expires_at:   chrono::DateTime<Utc>,
}

/// `POST /subscriptions` — grant the purchased feature(s).
///
/// `premium_bundle` fans out to both concrete features with one shared
/// expiration; a caller must never observe only half the bundle as a
/// supported outcome.
pub async fn purchase<S, V>(
  State(state): State<ApiState<S, V>>,
  Json(body): Json<PurchaseBody>,
) -> Result<Json<PurchaseResponse>, ApiError>
where
  S: TaskStore,
  V: IdentityVerifier,
{
  if body.transaction_hash.trim().is_empty() {
    return Err(ApiError::BadRequest(
      "missing required field: transactionHash".to_owned(),
    ));
  }

  let feature = Feature::parse(&body.feature_type)
    .map_err(|_| ApiError::BadRequest(format!("invalid feature type: {}", body.feature_type)))?;

  state
    .store
    .get_user(body.user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("user {} not found", body.user_id)))?;

  let expires_at = Utc::now() + Duration::days(body.duration.unwrap_or(GRANT_DAYS));

  for granted in feature.grants() {
    state
      .store
      .create_subscription(body.user_id, *granted, Some(expires_at))
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?;
  }

  tracing::info!(
    user_id = %body.user_id,
    feature = feature.as_str(),
    tx = %body.transaction_hash,
    "subscription activated"
  );

  Ok(Json(PurchaseResponse {
    success:      true,
    feature_type: body.feature_type,
    expires_at,
  }))
}

// ─── Deactivate ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeactivateParams {
  pub user_id:      Uuid,
  pub feature_type: String,
}

/// `DELETE /subscriptions?userId=<id>&featureType=<feature>`
pub async fn deactivate<S, V>(
  State(state): State<ApiState<S, V>>,
  Query(params): Query<DeactivateParams>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: TaskStore,
  V: IdentityVerifier,
{
  let feature = Feature::parse(&params.feature_type)
    .map_err(|_| ApiError::BadRequest(format!("invalid feature type: {}", params.feature_type)))?;

  state
    .store
    .deactivate_subscription(params.user_id, feature)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(json!({ "success": true })))
}
