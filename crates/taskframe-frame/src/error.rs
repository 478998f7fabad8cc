//! Error type and axum `IntoResponse` implementation for the frame
//! transport.
//!
//! Deliberately tiny: the frame surface has no user-visible error channel
//! other than the card itself, so internal faults degrade to the `error`
//! card inside the engine instead of surfacing here. The only HTTP-level
//! rejection is a protocol violation in the callback body.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The callback body carried no fid — the one request shape we refuse
  /// outright rather than answering with a card.
  #[error("missing fid")]
  MissingFid,
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::MissingFid => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Missing FID" })),
      )
        .into_response(),
    }
  }
}
