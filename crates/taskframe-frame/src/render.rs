//! Card renderer — maps a card action (plus optional user statistics) to
//! SVG bytes.
//!
//! Rendering never fails the outer request: stats gathering is best-effort
//! and the layout functions are pure string assembly. Output is
//! deterministic given the same action, task state, and calendar date — the
//! due-today count is clock-relative, so a cached card goes stale at UTC
//! midnight.

use chrono::{NaiveDate, Utc};
use taskframe_core::{store::TaskStore, task::Task};
use uuid::Uuid;

use crate::engine::CardAction;

/// Canvas size expected by the embedding client (1.91:1).
pub const WIDTH: u32 = 1200;
pub const HEIGHT: u32 = 630;

// Palette lifted from the dashboard's design system.
const BG: &str = "#1e1b4b";
const BG_EDGE: &str = "#0f172a";
const SURFACE: &str = "#312e81";
const ACCENT: &str = "#8b5cf6";
const PRIMARY: &str = "#3b82f6";
const TEXT: &str = "#f8fafc";
const TEXT_DIM: &str = "#cbd5e1";

// ─── Stats ───────────────────────────────────────────────────────────────────

/// Per-user numbers overlaid on the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
  pub total:     usize,
  pub completed: usize,
  pub due_today: usize,
}

pub fn compute_stats(tasks: &[Task], today: NaiveDate) -> TaskStats {
  TaskStats {
    total:     tasks.len(),
    completed: tasks.iter().filter(|t| t.completed).count(),
    due_today: tasks
      .iter()
      .filter(|t| t.due_at.date_naive() == today)
      .count(),
  }
}

// ─── Entry point ─────────────────────────────────────────────────────────────

/// Render the card for `action`, overlaying `user_id`'s stats when they can
/// be gathered. `None` for the action renders the minimal fallback card the
/// image endpoint uses for unrecognised query strings.
pub async fn render_card<S: TaskStore>(
  store: &S,
  action: Option<CardAction>,
  user_id: Option<Uuid>,
) -> String {
  let stats = match user_id {
    Some(id) => gather_stats(store, id).await,
    None => None,
  };
  svg_document(action, stats)
}

/// Fetch the user's tasks and reduce them to the overlay numbers. Any
/// failure — including an unknown user id — is swallowed and the card
/// renders without the overlay.
async fn gather_stats<S: TaskStore>(store: &S, user_id: Uuid) -> Option<TaskStats> {
  let user = match store.get_user(user_id).await {
    Ok(user) => user?,
    Err(error) => {
      tracing::warn!(%error, %user_id, "stats fetch failed; rendering without overlay");
      return None;
    }
  };

  match store.list_tasks_by_user(user.user_id).await {
    Ok(tasks) => Some(compute_stats(&tasks, Utc::now().date_naive())),
    Err(error) => {
      tracing::warn!(%error, %user_id, "stats fetch failed; rendering without overlay");
      None
    }
  }
}

// ─── SVG assembly ────────────────────────────────────────────────────────────

fn svg_document(action: Option<CardAction>, stats: Option<TaskStats>) -> String {
  let content = match action {
    Some(CardAction::Home) => home_content(),
    Some(CardAction::Today) => today_content(),
    Some(CardAction::AddTask) => add_task_content(),
    Some(CardAction::TaskAdded) => task_added_content(),
    Some(CardAction::Projects) => projects_content(),
    Some(CardAction::OpenApp) => open_app_content(),
    Some(CardAction::Error) => error_content(),
    None => fallback_content(),
  };

  let stats_block = stats.map(stats_overlay).unwrap_or_default();

  format!(
    r##"<svg width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" xmlns="http://www.w3.org/2000/svg">
  <defs>
    <linearGradient id="bgGradient" x1="0%" y1="0%" x2="100%" y2="100%">
      <stop offset="0%" style="stop-color:{BG};stop-opacity:1"/>
      <stop offset="100%" style="stop-color:{BG_EDGE};stop-opacity:1"/>
    </linearGradient>
  </defs>
  <rect width="100%" height="100%" fill="url(#bgGradient)"/>
  <circle cx="100" cy="100" r="50" fill="{ACCENT}" opacity="0.1"/>
  <circle cx="1100" cy="530" r="80" fill="{PRIMARY}" opacity="0.1"/>
{content}
{stats_block}
  <text x="600" y="600" text-anchor="middle" fill="{TEXT_DIM}" font-size="12" opacity="0.7">Taskframe &#8226; Master your workflow, on-chain</text>
</svg>"##
  )
}

fn stats_overlay(stats: TaskStats) -> String {
  format!(
    r##"  <g>
    <rect x="50" y="450" width="300" height="120" rx="12" fill="{SURFACE}" opacity="0.8"/>
    <text x="70" y="480" fill="{TEXT}" font-size="16" font-weight="600">Your Stats</text>
    <text x="70" y="510" fill="{TEXT_DIM}" font-size="14">Total Tasks: {total}</text>
    <text x="70" y="535" fill="{TEXT_DIM}" font-size="14">Completed: {completed}</text>
    <text x="70" y="560" fill="{TEXT_DIM}" font-size="14">Due Today: {due_today}</text>
  </g>"##,
    total = stats.total,
    completed = stats.completed,
    due_today = stats.due_today,
  )
}

fn home_content() -> String {
  let feature_icons = [
    (400, PRIMARY, "\u{1F4C5}", "Today's Tasks"),
    (500, ACCENT, "\u{2795}", "Add Task"),
    (600, PRIMARY, "\u{1F4C1}", "Projects"),
    (700, ACCENT, "\u{1F680}", "Open App"),
  ]
  .into_iter()
  .map(|(x, colour, icon, label)| {
    format!(
      r##"  <g transform="translate({x}, 350)">
    <circle cx="0" cy="0" r="30" fill="{colour}" opacity="0.2"/>
    <text x="0" y="8" text-anchor="middle" fill="{colour}" font-size="24">{icon}</text>
    <text x="0" y="60" text-anchor="middle" fill="{TEXT_DIM}" font-size="12">{label}</text>
  </g>"##
    )
  })
  .collect::<Vec<_>>()
  .join("\n");

  format!(
    r##"  <text x="600" y="200" text-anchor="middle" fill="{TEXT}" font-size="48" font-weight="700">Taskframe</text>
  <text x="600" y="250" text-anchor="middle" fill="{TEXT_DIM}" font-size="24">Your daily tasks, clearer than ever</text>
  <text x="600" y="300" text-anchor="middle" fill="{ACCENT}" font-size="18">Master your workflow, on-chain</text>
{feature_icons}"##
  )
}

fn today_content() -> String {
  format!(
    r##"  <text x="600" y="150" text-anchor="middle" fill="{TEXT}" font-size="42" font-weight="700">&#128197; Today's Tasks</text>
  <text x="600" y="200" text-anchor="middle" fill="{TEXT_DIM}" font-size="20">Stay focused on what matters today</text>
  <rect x="300" y="250" width="600" height="200" rx="16" fill="{SURFACE}" opacity="0.6"/>
  <text x="600" y="290" text-anchor="middle" fill="{TEXT}" font-size="18" font-weight="600">Your Daily Focus</text>
  <text x="600" y="320" text-anchor="middle" fill="{TEXT_DIM}" font-size="16">&#10003; Complete high-priority tasks</text>
  <text x="600" y="350" text-anchor="middle" fill="{TEXT_DIM}" font-size="16">&#10003; Review project progress</text>
  <text x="600" y="380" text-anchor="middle" fill="{TEXT_DIM}" font-size="16">&#10003; Plan tomorrow's priorities</text>
  <text x="600" y="420" text-anchor="middle" fill="{ACCENT}" font-size="14">Tap "Add Task" to create new items</text>"##
  )
}

fn add_task_content() -> String {
  format!(
    r##"  <text x="600" y="150" text-anchor="middle" fill="{TEXT}" font-size="42" font-weight="700">&#10133; Add New Task</text>
  <text x="600" y="200" text-anchor="middle" fill="{TEXT_DIM}" font-size="20">What needs to be done?</text>
  <rect x="250" y="280" width="700" height="80" rx="12" fill="{SURFACE}" stroke="{ACCENT}" stroke-width="2"/>
  <text x="600" y="330" text-anchor="middle" fill="{TEXT_DIM}" font-size="18">Enter your task title in the input field</text>
  <text x="600" y="420" text-anchor="middle" fill="{ACCENT}" font-size="16">&#128161; Pro tip: Be specific for better productivity</text>"##
  )
}

fn task_added_content() -> String {
  format!(
    r##"  <text x="600" y="150" text-anchor="middle" fill="{TEXT}" font-size="42" font-weight="700">&#9989; Task Added!</text>
  <text x="600" y="200" text-anchor="middle" fill="{ACCENT}" font-size="20">Great job staying organized</text>
  <circle cx="600" cy="320" r="60" fill="{ACCENT}" opacity="0.2"/>
  <text x="600" y="335" text-anchor="middle" fill="{ACCENT}" font-size="48">&#10003;</text>
  <text x="600" y="420" text-anchor="middle" fill="{TEXT_DIM}" font-size="16">Your task has been added to today's list</text>
  <text x="600" y="450" text-anchor="middle" fill="{TEXT_DIM}" font-size="14">Open the app to manage and complete your tasks</text>"##
  )
}

fn projects_content() -> String {
  // The preview tiles are illustrative; real project data lives behind the
  // premium gate in the full app.
  let tiles = [
    (300, "Website", "5 tasks", 84, PRIMARY),
    (510, "Mobile App", "3 tasks", 56, ACCENT),
    (720, "Marketing", "2 tasks", 140, ACCENT),
  ]
  .into_iter()
  .map(|(x, name, count, progress, colour)| {
    format!(
      r##"  <g transform="translate({x}, 280)">
    <rect x="0" y="0" width="180" height="120" rx="12" fill="{SURFACE}" opacity="0.8"/>
    <text x="90" y="30" text-anchor="middle" fill="{TEXT}" font-size="16" font-weight="600">{name}</text>
    <text x="90" y="55" text-anchor="middle" fill="{TEXT_DIM}" font-size="12">{count}</text>
    <rect x="20" y="70" width="140" height="8" rx="4" fill="{BG}"/>
    <rect x="20" y="70" width="{progress}" height="8" rx="4" fill="{colour}"/>
  </g>"##
    )
  })
  .collect::<Vec<_>>()
  .join("\n");

  format!(
    r##"  <text x="600" y="150" text-anchor="middle" fill="{TEXT}" font-size="42" font-weight="700">&#128193; Projects</text>
  <text x="600" y="200" text-anchor="middle" fill="{TEXT_DIM}" font-size="20">Organize tasks by project</text>
{tiles}
  <text x="600" y="450" text-anchor="middle" fill="{TEXT_DIM}" font-size="14">&#128142; Project linking requires premium subscription</text>"##
  )
}

fn open_app_content() -> String {
  format!(
    r##"  <text x="600" y="150" text-anchor="middle" fill="{TEXT}" font-size="42" font-weight="700">&#128640; Opening Taskframe</text>
  <text x="600" y="200" text-anchor="middle" fill="{TEXT_DIM}" font-size="20">Get the full experience</text>
  <circle cx="600" cy="320" r="80" fill="{ACCENT}" opacity="0.2"/>
  <text x="600" y="335" text-anchor="middle" fill="{ACCENT}" font-size="64">&#128640;</text>
  <text x="600" y="420" text-anchor="middle" fill="{TEXT_DIM}" font-size="16">Click the button below to launch the full app</text>
  <text x="600" y="450" text-anchor="middle" fill="{ACCENT}" font-size="14">Complete task management &#8226; Project tracking &#8226; Analytics</text>"##
  )
}

fn error_content() -> String {
  format!(
    r##"  <text x="600" y="200" text-anchor="middle" fill="{TEXT}" font-size="42" font-weight="700">&#9888; Oops!</text>
  <text x="600" y="250" text-anchor="middle" fill="{TEXT_DIM}" font-size="20">Something went wrong</text>
  <text x="600" y="320" text-anchor="middle" fill="{TEXT_DIM}" font-size="16">Don't worry, let's get you back on track</text>
  <text x="600" y="380" text-anchor="middle" fill="{ACCENT}" font-size="14">Try going back to home or refresh the frame</text>"##
  )
}

fn fallback_content() -> String {
  format!(
    r##"  <text x="600" y="315" text-anchor="middle" fill="{TEXT}" font-size="48" font-weight="700">Taskframe</text>"##
  )
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::{Duration, Utc};
  use taskframe_core::{store::TaskStore, task::NewTask, user::NewUser};
  use taskframe_store_sqlite::SqliteStore;

  use super::*;

  async fn store() -> SqliteStore {
    SqliteStore::open_in_memory().await.expect("in-memory store")
  }

  #[tokio::test]
  async fn every_action_renders_without_a_user() {
    let s = store().await;

    for action in CardAction::ALL {
      let svg = render_card(&s, Some(action), None).await;
      assert!(svg.starts_with("<svg"), "{action:?}");
      assert!(svg.ends_with("</svg>"), "{action:?}");
      assert!(!svg.contains("Your Stats"), "{action:?}");
    }
  }

  #[tokio::test]
  async fn unknown_user_renders_without_overlay() {
    let s = store().await;

    for action in CardAction::ALL {
      let svg = render_card(&s, Some(action), Some(Uuid::new_v4())).await;
      assert!(svg.starts_with("<svg"), "{action:?}");
      assert!(!svg.contains("Your Stats"), "{action:?}");
    }
  }

  #[tokio::test]
  async fn stats_overlay_reflects_task_state() {
    let s = store().await;
    let user = s.create_user(NewUser::provisional(1)).await.unwrap();

    // Two due today (one completed), one due next week.
    let done = s
      .create_task(NewTask::quick(user.user_id, "done"))
      .await
      .unwrap();
    s.update_task(done.task_id, taskframe_core::task::TaskPatch {
      completed: Some(true),
      ..Default::default()
    })
    .await
    .unwrap();
    s.create_task(NewTask::quick(user.user_id, "pending"))
      .await
      .unwrap();
    let mut later = NewTask::quick(user.user_id, "later");
    later.due_at = Utc::now() + Duration::days(7);
    s.create_task(later).await.unwrap();

    let svg = render_card(&s, Some(CardAction::Home), Some(user.user_id)).await;
    assert!(svg.contains("Your Stats"));
    assert!(svg.contains("Total Tasks: 3"));
    assert!(svg.contains("Completed: 1"));
    assert!(svg.contains("Due Today: 2"));
  }

  #[tokio::test]
  async fn fallback_card_renders_for_unknown_action() {
    let s = store().await;
    let svg = render_card(&s, None, None).await;
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Taskframe"));
  }

  #[test]
  fn compute_stats_counts_by_calendar_date() {
    let today = Utc::now().date_naive();
    let mk = |due_at, completed| taskframe_core::task::Task {
      task_id: Uuid::new_v4(),
      user_id: Uuid::new_v4(),
      title: "t".into(),
      description: None,
      due_at,
      completed,
      project_id: None,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    };

    let tasks = vec![
      mk(Utc::now(), false),
      mk(Utc::now(), true),
      mk(Utc::now() - Duration::days(2), true),
      mk(Utc::now() + Duration::days(2), false),
    ];

    let stats = compute_stats(&tasks, today);
    assert_eq!(stats.total, 4);
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.due_today, 2);
  }
}
