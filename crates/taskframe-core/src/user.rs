//! User — the identity-bearing participant.
//!
//! A user arrives through one of two doors: the dashboard login path, which
//! verifies a signature against the social network before creating a full
//! record, or the frame path, which provisions a bare record on first contact
//! from an unseen fid. Both doors share one row, looked up by fid — never by
//! the locally-generated id — so the paths converge instead of duplicating.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::verify::NetworkProfile;

/// Namespace for deriving provisional user ids from an external identity.
///
/// `Uuid::new_v5(&PROVISIONAL_NAMESPACE, fid)` is deterministic, so repeated
/// frame events from the same unauthenticated fid derive the same id and a
/// concurrent double-create collides on the primary key rather than
/// producing a duplicate row.
pub const PROVISIONAL_NAMESPACE: Uuid =
  Uuid::from_u128(0x7f1c_2a94_5d30_4b8e_9a61_c58f_03de_7b12);

/// An account in this system, bound to one external-network identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub user_id:      Uuid,
  pub display_name: String,
  /// Handle on the external social network.
  pub username:     String,
  /// Numeric identity on the external social network. Immutable once bound.
  pub fid:          i64,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

/// Input for [`create_user`](crate::store::TaskStore::create_user).
///
/// The caller supplies the id: the frame path derives it from the fid, the
/// login path generates a fresh v4.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub user_id:      Uuid,
  pub display_name: String,
  pub username:     String,
  pub fid:          i64,
}

impl NewUser {
  /// A provisional record for a fid seen on the frame path before any
  /// verified login. Display name and username are defaulted from the fid;
  /// a later login overwrites them with the real profile.
  pub fn provisional(fid: i64) -> Self {
    Self {
      user_id:      Uuid::new_v5(
        &PROVISIONAL_NAMESPACE,
        fid.to_string().as_bytes(),
      ),
      display_name: format!("User {fid}"),
      username:     format!("user{fid}"),
      fid,
    }
  }

  /// A full record built from a verified network profile.
  pub fn verified(profile: &NetworkProfile) -> Self {
    Self {
      user_id:      Uuid::new_v4(),
      display_name: profile.display_name.clone(),
      username:     profile.username.clone(),
      fid:          profile.fid,
    }
  }
}

/// Fields a verified re-login refreshes. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
  pub display_name: Option<String>,
  pub username:     Option<String>,
}
