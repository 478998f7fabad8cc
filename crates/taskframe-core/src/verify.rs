//! The identity-verification boundary.
//!
//! Verification is delegated to the social network's hosted signature
//! service. Only the dashboard login path goes through it; frame callbacks
//! arrive pre-signed by the embedding client and are trusted at the
//! transport level.

use std::future::Future;

/// Public profile data for a fid, as reported by the network.
#[derive(Debug, Clone)]
pub struct NetworkProfile {
  pub fid:          i64,
  pub username:     String,
  pub display_name: String,
}

/// Abstraction over the network's signature/profile service.
pub trait IdentityVerifier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Check that `signature` over `message` was produced by the key bound to
  /// `fid`. A transport failure is an error; a failed check is `Ok(false)`.
  fn verify_signature<'a>(
    &'a self,
    message: &'a str,
    signature: &'a str,
    fid: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Fetch the current profile for `fid`. Returns `None` if the network has
  /// no such account.
  fn profile(
    &self,
    fid: i64,
  ) -> impl Future<Output = Result<Option<NetworkProfile>, Self::Error>> + Send + '_;
}
