//! Subscription — a time-boxed grant of a paid feature — and the feature
//! catalog itself.
//!
//! Expiry is lazy: the stored `is_active` flag alone is not authoritative.
//! A grant past its expiration stays flagged active in storage until the
//! first read after the deadline discovers it, reports it dead, and persists
//! the deactivation. See
//! [`has_active_subscription`](crate::store::TaskStore::has_active_subscription).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Grant duration, in days, for every purchased feature.
pub const GRANT_DAYS: i64 = 30;

/// A paid feature that can be granted to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
  Notifications,
  ProjectLinking,
  /// Purchase-only bundle: grants both [`Feature::Notifications`] and
  /// [`Feature::ProjectLinking`] with a shared expiration. Never stored as a
  /// grant itself.
  PremiumBundle,
}

impl Feature {
  pub fn as_str(self) -> &'static str {
    match self {
      Feature::Notifications => "notifications",
      Feature::ProjectLinking => "project_linking",
      Feature::PremiumBundle => "premium_bundle",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "notifications" => Ok(Feature::Notifications),
      "project_linking" => Ok(Feature::ProjectLinking),
      "premium_bundle" => Ok(Feature::PremiumBundle),
      other => Err(Error::UnknownFeature(other.to_owned())),
    }
  }

  /// Price in ETH on the settlement network. Kept as a decimal string — the
  /// ledger side consumes it verbatim and no arithmetic happens here.
  pub fn price_eth(self) -> &'static str {
    match self {
      Feature::Notifications => "0.001",
      Feature::ProjectLinking => "0.002",
      Feature::PremiumBundle => "0.0025",
    }
  }

  /// The concrete features a purchase of `self` grants.
  pub fn grants(self) -> &'static [Feature] {
    match self {
      Feature::Notifications => &[Feature::Notifications],
      Feature::ProjectLinking => &[Feature::ProjectLinking],
      Feature::PremiumBundle => {
        &[Feature::Notifications, Feature::ProjectLinking]
      }
    }
  }
}

/// One grant row. A user may accumulate several rows per feature over time;
/// only the live ones matter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
  pub user_id:    Uuid,
  pub feature:    Feature,
  pub is_active:  bool,
  pub expires_at: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
}

impl Subscription {
  /// The live predicate: active flag set AND (no expiration OR expiration in
  /// the future).
  pub fn is_live(&self, now: DateTime<Utc>) -> bool {
    self.is_active && self.expires_at.is_none_or(|at| at > now)
  }
}
