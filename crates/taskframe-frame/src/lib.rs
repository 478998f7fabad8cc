//! Frame protocol layer for Taskframe.
//!
//! Exposes an axum [`Router`] implementing the interactive-card transport
//! backed by any [`TaskStore`]: a GET document endpoint, a POST event
//! endpoint that drives the state machine, and a GET image endpoint serving
//! the rendered card.

pub mod document;
pub mod engine;
pub mod error;
pub mod render;

pub use error::Error;

use std::sync::Arc;

use axum::{
  Json, Router,
  extract::{Query, State},
  http::header,
  response::{Html, IntoResponse, Response},
  routing::get,
};
use serde::Deserialize;
use taskframe_core::store::TaskStore;
use uuid::Uuid;

use engine::{CardAction, FrameEvent};

/// How long the embedding client may cache a rendered card. Content is
/// near-static except for the date-relative stats overlay.
const IMAGE_CACHE_CONTROL: &str = "public, max-age=300";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Frame-facing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FrameConfig {
  /// External base URL for the frame endpoints; image and callback URLs
  /// embed it.
  pub base_url: String,
  /// Where the full dashboard lives; the `open_app` button links here.
  pub app_url:  String,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all frame handlers.
#[derive(Clone)]
pub struct AppState<S: TaskStore> {
  pub store:  Arc<S>,
  pub config: Arc<FrameConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] for the frame transport.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: TaskStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/frame", get(document_handler::<S>).post(event_handler::<S>))
    .route("/frame/image", get(image_handler::<S>))
    .with_state(state)
}

// ─── GET /frame and /frame/image ──────────────────────────────────────────────

/// Query parameters shared by the document and image endpoints. Both fields
/// are parsed leniently — a bad value falls back rather than failing the
/// card surface.
#[derive(Debug, Deserialize)]
pub struct CardQuery {
  pub action:  Option<String>,
  #[serde(rename = "userId")]
  pub user_id: Option<String>,
}

impl CardQuery {
  /// `None` only when the parameter was present but unrecognised; an absent
  /// parameter means `home`.
  fn action(&self) -> Option<CardAction> {
    match self.action.as_deref() {
      None => Some(CardAction::Home),
      Some(s) => CardAction::parse(s),
    }
  }

  fn user_id(&self) -> Option<Uuid> {
    self.user_id.as_deref().and_then(|s| Uuid::parse_str(s).ok())
  }
}

/// `GET /frame?action=<action>[&userId=<uuid>]` — the embeddable document.
async fn document_handler<S>(
  State(state): State<AppState<S>>,
  Query(query): Query<CardQuery>,
) -> Html<String>
where
  S: TaskStore + Clone + Send + Sync + 'static,
{
  // Unknown actions resolve to the home template; the engine never links to
  // one, but inbound URLs are not under our control.
  let action = query.action().unwrap_or(CardAction::Home);
  Html(document::compose_document(
    action,
    query.user_id(),
    None,
    &state.config,
  ))
}

/// `GET /frame/image?action=<action>[&userId=<uuid>]` — the rendered card.
async fn image_handler<S>(
  State(state): State<AppState<S>>,
  Query(query): Query<CardQuery>,
) -> Response
where
  S: TaskStore + Clone + Send + Sync + 'static,
{
  let svg =
    render::render_card(state.store.as_ref(), query.action(), query.user_id())
      .await;

  (
    [
      (header::CONTENT_TYPE, "image/svg+xml"),
      (header::CACHE_CONTROL, IMAGE_CACHE_CONTROL),
    ],
    svg,
  )
    .into_response()
}

// ─── POST /frame ──────────────────────────────────────────────────────────────

/// The callback body posted by the embedding client.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBody {
  #[serde(default)]
  pub untrusted_data: Option<UntrustedData>,
  /// The client's signed payload. Accepted but not independently verified —
  /// the frame path trusts the embedding client's transport signature. See
  /// the hardening note in DESIGN.md.
  #[serde(default)]
  pub trusted_data:   Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UntrustedData {
  pub fid:          Option<i64>,
  #[serde(default)]
  pub button_index: Option<i64>,
  #[serde(default)]
  pub input_text:   Option<String>,
}

/// `POST /frame` — one button press in, the next document out.
///
/// A body without a fid is a protocol violation and the one case that gets a
/// client error; every other input produces a document, with internal faults
/// degrading to the `error` card inside the engine.
async fn event_handler<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<EventBody>,
) -> Response
where
  S: TaskStore + Clone + Send + Sync + 'static,
{
  let data = body.untrusted_data;
  let Some(fid) = data.as_ref().and_then(|d| d.fid) else {
    return Error::MissingFid.into_response();
  };

  let event = FrameEvent {
    fid,
    button_index: data
      .as_ref()
      .and_then(|d| d.button_index)
      .unwrap_or_default(),
    input_text:   data.and_then(|d| d.input_text),
  };

  let card = engine::handle_event(state.store.as_ref(), &event).await;
  Html(document::compose_document(
    card.action,
    card.user_id,
    card.message.as_deref(),
    &state.config,
  ))
  .into_response()
}

// ─── Integration tests ────────────────────────────────────────────────────────
