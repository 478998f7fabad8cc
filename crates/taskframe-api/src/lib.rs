//! JSON REST API for the Taskframe dashboard.
//!
//! Exposes an axum [`Router`] backed by any
//! [`taskframe_core::store::TaskStore`] and
//! [`taskframe_core::verify::IdentityVerifier`]. TLS and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", taskframe_api::api_router(state))
//! ```

pub mod auth;
pub mod error;
pub mod projects;
pub mod subscriptions;
pub mod tasks;

use std::sync::Arc;

use axum::{Router, routing::get};
use taskframe_core::{store::TaskStore, verify::IdentityVerifier};

pub use error::ApiError;

/// Shared state threaded through all API handlers.
#[derive(Clone)]
pub struct ApiState<S, V> {
  pub store:    Arc<S>,
  pub verifier: Arc<V>,
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, V>(state: ApiState<S, V>) -> Router<()>
where
  S: TaskStore + Clone + Send + Sync + 'static,
  V: IdentityVerifier + Clone + Send + Sync + 'static,
{
  Router::new()
    // Auth
    .route("/auth", get(auth::session::<S, V>).post(auth::login::<S, V>))
    // Tasks
    .route(
      "/tasks",
      get(tasks::list::<S, V>)
        .post(tasks::create::<S, V>)
        .put(tasks::update::<S, V>)
        .delete(tasks::remove::<S, V>),
    )
    // Projects
    .route(
      "/projects",
      get(projects::list::<S, V>)
        .post(projects::create::<S, V>)
        .put(projects::update::<S, V>)
        .delete(projects::remove::<S, V>),
    )
    // Subscriptions
    .route(
      "/subscriptions",
      get(subscriptions::list::<S, V>)
        .post(subscriptions::purchase::<S, V>)
        .delete(subscriptions::deactivate::<S, V>),
    )
    .with_state(state)
}

#[cfg(test)]
mod tests;
