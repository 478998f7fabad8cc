//! HTTP implementation of the identity-verification boundary.
//!
//! Wraps the social network's hosted API (signature validation and profile
//! lookup) behind [`IdentityVerifier`]. Only the dashboard login path talks
//! to this service; the frame path never re-verifies.

use std::time::Duration;

use serde::Deserialize;
use taskframe_core::verify::{IdentityVerifier, NetworkProfile};
use thiserror::Error;

/// The hosted API most deployments point at.
pub const DEFAULT_API_BASE: &str = "https://api.neynar.com/v2";

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("unexpected status from identity service: {0}")]
  Status(reqwest::StatusCode),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Connection settings for the identity service.
#[derive(Debug, Clone)]
pub struct HubConfig {
  pub api_base: String,
  pub api_key:  String,
}

/// Async client for the network's signature/profile API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HubClient {
  client: reqwest::Client,
  config: HubConfig,
}

impl HubClient {
  pub fn new(config: HubConfig) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
  }
}

// ─── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ValidateResponse {
  valid: bool,
}

#[derive(Debug, Deserialize)]
struct UserBulkResponse {
  #[serde(default)]
  users: Vec<RemoteUser>,
}

#[derive(Debug, Deserialize)]
struct RemoteUser {
  fid:          i64,
  username:     String,
  display_name: String,
}

impl From<RemoteUser> for NetworkProfile {
  fn from(u: RemoteUser) -> Self {
    NetworkProfile {
      fid:          u.fid,
      username:     u.username,
      display_name: u.display_name,
    }
  }
}

// ─── IdentityVerifier impl ────────────────────────────────────────────────────

impl IdentityVerifier for HubClient {
  type Error = Error;

  async fn verify_signature(
    &self,
    message: &str,
    signature: &str,
    fid: i64,
  ) -> Result<bool> {
    let resp = self
      .client
      .post(self.url("/farcaster/frame/validate"))
      .header("api_key", &self.config.api_key)
      .json(&serde_json::json!({
        "message_bytes_in_hex": message,
        "signature": signature,
        "fid": fid,
      }))
      .send()
      .await?;

    // The service answers 4xx for messages it judges invalid; that is a
    // failed check, not a transport fault.
    if resp.status().is_client_error() {
      tracing::warn!(status = %resp.status(), fid, "signature validation refused");
      return Ok(false);
    }
    if !resp.status().is_success() {
      return Err(Error::Status(resp.status()));
    }

    let body: ValidateResponse = resp.json().await?;
    Ok(body.valid)
  }

  async fn profile(&self, fid: i64) -> Result<Option<NetworkProfile>> {
    let resp = self
      .client
      .get(self.url("/farcaster/user/bulk"))
      .header("api_key", &self.config.api_key)
      .query(&[("fids", fid.to_string())])
      .send()
      .await?;

    // The directory answers 404 for fids it has never seen.
    if resp.status() == reqwest::StatusCode::NOT_FOUND {
      return Ok(None);
    }
    if !resp.status().is_success() {
      return Err(Error::Status(resp.status()));
    }

    let body: UserBulkResponse = resp.json().await?;
    Ok(body.users.into_iter().next().map(NetworkProfile::from))
  }
}
