//! Frame document composer — wraps a card descriptor into the metadata
//! document the embedding client consumes.
//!
//! Thin templating keyed by the closed action enumeration: a title, zero or
//! one text input, up to four buttons, the image URL, and the callback URL.
//! Buttons post back to the engine except where a template marks them as
//! links (only `open_app`, whose sole button opens the full application).

use uuid::Uuid;

use crate::{FrameConfig, engine::CardAction};

const TAGLINE: &str = "Your daily tasks, clearer than ever. Master your workflow, on-chain.";

// ─── Templates ───────────────────────────────────────────────────────────────

/// A button slot on the card, ordered by index.
struct Button {
  label:  &'static str,
  /// `Some` turns the button into a `link` action opening the target URL
  /// instead of posting back.
  target: Option<String>,
}

impl Button {
  fn post(label: &'static str) -> Self {
    Self { label, target: None }
  }

  fn link(label: &'static str, target: String) -> Self {
    Self { label, target: Some(target) }
  }
}

/// The per-action template the composer fills in.
struct Template {
  title:   &'static str,
  /// Placeholder for the text input, present only where the card accepts
  /// typed input.
  input:   Option<&'static str>,
  buttons: Vec<Button>,
}

fn template(action: CardAction, config: &FrameConfig) -> Template {
  match action {
    CardAction::Home => Template {
      title:   "Taskframe - Master Your Workflow",
      input:   None,
      buttons: vec![
        Button::post("\u{1F4C5} Today's Tasks"),
        Button::post("\u{2795} Add Task"),
        Button::post("\u{1F4C1} Projects"),
        Button::post("\u{1F680} Open App"),
      ],
    },
    CardAction::Today => Template {
      title:   "Taskframe - Today's Tasks",
      input:   None,
      buttons: vec![
        Button::post("\u{1F3E0} Home"),
        Button::post("\u{2795} Add Task"),
        Button::post("\u{1F680} Open App"),
      ],
    },
    CardAction::AddTask => Template {
      title:   "Taskframe - Add New Task",
      input:   Some("Enter task title..."),
      buttons: vec![
        Button::post("\u{1F3E0} Home"),
        Button::post("\u{2705} Create Task"),
      ],
    },
    CardAction::TaskAdded => Template {
      title:   "Taskframe - Task Added!",
      input:   None,
      buttons: vec![
        Button::post("\u{1F3E0} Home"),
        Button::post("\u{1F4C5} View Today"),
        Button::post("\u{1F680} Open App"),
      ],
    },
    CardAction::Projects => Template {
      title:   "Taskframe - Projects",
      input:   None,
      buttons: vec![
        Button::post("\u{1F3E0} Home"),
        Button::post("\u{2795} Add Task"),
        Button::post("\u{1F680} Open App"),
      ],
    },
    CardAction::OpenApp => Template {
      title:   "Taskframe - Opening App...",
      input:   None,
      buttons: vec![Button::link(
        "\u{1F680} Launch Taskframe",
        config.app_url.clone(),
      )],
    },
    CardAction::Error => Template {
      title:   "Taskframe - Error",
      input:   None,
      buttons: vec![
        Button::post("\u{1F3E0} Home"),
        Button::post("\u{1F504} Try Again"),
      ],
    },
  }
}

// ─── Composition ─────────────────────────────────────────────────────────────

/// The image URL for `action`, personalised when a user id is known.
pub fn image_url(
  action: CardAction,
  user_id: Option<Uuid>,
  config: &FrameConfig,
) -> String {
  let mut url = format!("{}/frame/image?action={}", config.base_url, action.as_str());
  if let Some(id) = user_id {
    url.push_str(&format!("&userId={id}"));
  }
  url
}

/// Compose the full metadata document for one card.
pub fn compose_document(
  action: CardAction,
  user_id: Option<Uuid>,
  message: Option<&str>,
  config: &FrameConfig,
) -> String {
  let tpl = template(action, config);
  let image = image_url(action, user_id, config);
  let post_url = format!("{}/frame", config.base_url);

  let mut meta = String::new();
  if let Some(placeholder) = tpl.input {
    meta.push_str(&format!(
      "    <meta name=\"fc:frame:input:text\" content=\"{placeholder}\" />\n"
    ));
  }
  for (i, button) in tpl.buttons.iter().enumerate() {
    let index = i + 1;
    meta.push_str(&format!(
      "    <meta name=\"fc:frame:button:{index}\" content=\"{}\" />\n",
      button.label
    ));
    if let Some(target) = &button.target {
      meta.push_str(&format!(
        "    <meta name=\"fc:frame:button:{index}:action\" content=\"link\" />\n"
      ));
      meta.push_str(&format!(
        "    <meta name=\"fc:frame:button:{index}:target\" content=\"{target}\" />\n"
      ));
    }
  }

  let body_message = message
    .map(|m| format!("      <p style=\"color: green;\">{m}</p>\n"))
    .unwrap_or_default();

  format!(
    r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>

    <meta name="fc:frame" content="vNext" />
    <meta name="fc:frame:image" content="{image}" />
    <meta name="fc:frame:post_url" content="{post_url}" />
{meta}
    <meta property="og:title" content="{title}" />
    <meta property="og:description" content="{TAGLINE}" />
    <meta property="og:image" content="{image}" />
    <meta property="og:url" content="{app_url}" />
    <meta property="og:type" content="website" />

    <meta name="twitter:card" content="summary_large_image" />
    <meta name="twitter:title" content="{title}" />
    <meta name="twitter:description" content="{TAGLINE}" />
    <meta name="twitter:image" content="{image}" />
  </head>
  <body>
    <div style="display: flex; flex-direction: column; align-items: center; justify-content: center; height: 100vh; font-family: Arial, sans-serif;">
      <h1>Taskframe</h1>
      <p>Your daily tasks, clearer than ever.</p>
{body_message}      <a href="{app_url}" style="margin-top: 20px; padding: 10px 20px; background: #6366f1; color: white; text-decoration: none; border-radius: 8px;">
        Open Taskframe
      </a>
    </div>
  </body>
</html>
"#,
    title = tpl.title,
    app_url = config.app_url,
  )
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn config() -> FrameConfig {
    FrameConfig {
      base_url: "https://frames.example.com".to_owned(),
      app_url:  "https://app.example.com".to_owned(),
    }
  }

  #[test]
  fn home_has_four_postback_buttons() {
    let html = compose_document(CardAction::Home, None, None, &config());
    assert!(html.contains("fc:frame:button:4"));
    assert!(!html.contains("fc:frame:button:5"));
    assert!(!html.contains(":action"));
    assert!(!html.contains("fc:frame:input:text"));
  }

  #[test]
  fn add_task_carries_a_text_input() {
    let html = compose_document(CardAction::AddTask, None, None, &config());
    assert!(html.contains("fc:frame:input:text"));
    assert!(html.contains("Enter task title..."));
  }

  #[test]
  fn open_app_button_is_a_link() {
    let html = compose_document(CardAction::OpenApp, None, None, &config());
    assert!(html.contains(
      "<meta name=\"fc:frame:button:1:action\" content=\"link\" />"
    ));
    assert!(html.contains("https://app.example.com"));
    assert!(!html.contains("fc:frame:button:2"));
  }

  #[test]
  fn image_url_is_parameterised_by_action_and_user() {
    let id = Uuid::new_v4();
    let url = image_url(CardAction::Today, Some(id), &config());
    assert_eq!(
      url,
      format!("https://frames.example.com/frame/image?action=today&userId={id}")
    );

    let bare = image_url(CardAction::Home, None, &config());
    assert!(!bare.contains("userId"));
  }

  #[test]
  fn callback_url_points_at_the_event_endpoint() {
    let html = compose_document(CardAction::Today, None, None, &config());
    assert!(html.contains(
      "<meta name=\"fc:frame:post_url\" content=\"https://frames.example.com/frame\" />"
    ));
  }

  #[test]
  fn transient_message_appears_in_the_body() {
    let html = compose_document(
      CardAction::TaskAdded,
      None,
      Some("Task added successfully!"),
      &config(),
    );
    assert!(html.contains("Task added successfully!"));

    let silent = compose_document(CardAction::TaskAdded, None, None, &config());
    assert!(!silent.contains("color: green"));
  }
}
