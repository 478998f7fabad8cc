//! The frame protocol engine — the state machine behind the interactive card.
//!
//! Stateless per request: every inbound button press resolves the acting
//! user, applies at most one mutation, and decides which card to show next.
//! The engine is a total function on the event type — for every reachable
//! input it returns a descriptor, never an unhandled fault.

use serde::{Deserialize, Serialize};
use taskframe_core::{
  store::TaskStore,
  task::NewTask,
  user::{NewUser, User},
};
use uuid::Uuid;

// ─── Card actions ────────────────────────────────────────────────────────────

/// The closed set of cards the frame can show.
///
/// `Home` is both the initial state (first contact, no prior action known)
/// and the fallback for anything unrecognised. There is no terminal state —
/// every card accepts further presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardAction {
  Home,
  Today,
  AddTask,
  TaskAdded,
  Projects,
  OpenApp,
  Error,
}

impl CardAction {
  pub const ALL: [CardAction; 7] = [
    CardAction::Home,
    CardAction::Today,
    CardAction::AddTask,
    CardAction::TaskAdded,
    CardAction::Projects,
    CardAction::OpenApp,
    CardAction::Error,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      CardAction::Home => "home",
      CardAction::Today => "today",
      CardAction::AddTask => "add_task",
      CardAction::TaskAdded => "task_added",
      CardAction::Projects => "projects",
      CardAction::OpenApp => "open_app",
      CardAction::Error => "error",
    }
  }

  /// Parse a query-string value. Unknown strings yield `None`; callers pick
  /// their own fallback (the document endpoint falls back to `Home`, the
  /// image endpoint to a minimal card).
  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "home" => Some(CardAction::Home),
      "today" => Some(CardAction::Today),
      "add_task" => Some(CardAction::AddTask),
      "task_added" => Some(CardAction::TaskAdded),
      "projects" => Some(CardAction::Projects),
      "open_app" => Some(CardAction::OpenApp),
      "error" => Some(CardAction::Error),
      _ => None,
    }
  }
}

// ─── Events and descriptors ──────────────────────────────────────────────────

/// One button press relayed by the embedding client. The fid has already
/// been checked for presence at the transport; everything else is tolerated
/// as-is.
#[derive(Debug, Clone)]
pub struct FrameEvent {
  pub fid:          i64,
  pub button_index: i64,
  pub input_text:   Option<String>,
}

/// What to show next — the engine's only output. Ephemeral: lives for one
/// request/response cycle and is never persisted.
#[derive(Debug, Clone)]
pub struct CardDescriptor {
  pub action:  CardAction,
  /// The resolved acting user, for personalised stats on the card. Absent
  /// only on the error card, where resolution itself may have failed.
  pub user_id: Option<Uuid>,
  /// Transient confirmation shown in the document body. Set only on
  /// `task_added`.
  pub message: Option<String>,
}

impl CardDescriptor {
  fn next(action: CardAction, user_id: Uuid) -> Self {
    Self { action, user_id: Some(user_id), message: None }
  }

  /// The degraded card any internal fault collapses to.
  pub fn error() -> Self {
    Self { action: CardAction::Error, user_id: None, message: None }
  }
}

pub const TASK_ADDED_MESSAGE: &str = "Task added successfully!";

// ─── Dispatch ────────────────────────────────────────────────────────────────

/// Drive one event through the state machine.
///
/// Button semantics are fixed by index regardless of which card the press
/// came from — a single flat dispatch:
///
/// | index | action | next card |
/// |-------|--------|-----------|
/// | 1 | — | `today` |
/// | 2, no text | — | `add_task` |
/// | 2, with text | insert one task (title = text, due = now) | `task_added` |
/// | 3 | — | `projects` |
/// | 4 | — | `open_app` |
/// | other | — | `home` |
///
/// Any failure during resolution or mutation degrades to the `error` card;
/// nothing propagates to the transport layer.
pub async fn handle_event<S: TaskStore>(
  store: &S,
  event: &FrameEvent,
) -> CardDescriptor {
  match drive(store, event).await {
    Ok(card) => card,
    Err(error) => {
      tracing::error!(%error, fid = event.fid, "frame event failed; degrading to error card");
      CardDescriptor::error()
    }
  }
}

async fn drive<S: TaskStore>(
  store: &S,
  event: &FrameEvent,
) -> Result<CardDescriptor, S::Error> {
  let user = resolve_user(store, event.fid).await?;

  let card = match event.button_index {
    1 => CardDescriptor::next(CardAction::Today, user.user_id),
    2 => match event.input_text.as_deref().filter(|t| !t.is_empty()) {
      Some(title) => {
        store.create_task(NewTask::quick(user.user_id, title)).await?;
        CardDescriptor {
          action:  CardAction::TaskAdded,
          user_id: Some(user.user_id),
          message: Some(TASK_ADDED_MESSAGE.to_owned()),
        }
      }
      None => CardDescriptor::next(CardAction::AddTask, user.user_id),
    },
    3 => CardDescriptor::next(CardAction::Projects, user.user_id),
    4 => CardDescriptor::next(CardAction::OpenApp, user.user_id),
    _ => CardDescriptor::next(CardAction::Home, user.user_id),
  };

  Ok(card)
}

/// Look up the acting user by fid, provisioning a bare record on first
/// contact. Lookup is keyed by external identity only, so a record created
/// here and one created later through a verified login are the same row.
async fn resolve_user<S: TaskStore>(
  store: &S,
  fid: i64,
) -> Result<User, S::Error> {
  if let Some(user) = store.get_user_by_fid(fid).await? {
    return Ok(user);
  }
  store.create_user(NewUser::provisional(fid)).await
}

// ─── Tests ───────────────────────────────────────────────────────────────────
