//! JSON REST API for the Mutua case-management console.
//!
//! Exposes an axum [`Router`] backed by any
//! [`TranscriptStore`](mutua_core::store::TranscriptStore) +
//! [`OverlayStore`](mutua_core::store::OverlayStore) pair. Auth, TLS, and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", mutua_api::api_router(service.clone()))
//! ```

pub mod consultations;
pub mod error;
pub mod service;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use mutua_core::store::{OverlayStore, TranscriptStore};
use serde::Deserialize;

pub use error::ApiError;
pub use service::{ConsultationQuery, ConsultationService};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<T, O>(service: Arc<ConsultationService<T, O>>) -> Router<()>
where
  T: TranscriptStore + 'static,
  O: OverlayStore + 'static,
{
  Router::new()
    .route("/consultations", get(consultations::list::<T, O>))
    .route("/consultations/{id}", get(consultations::get_one::<T, O>))
    .route(
      "/consultations/{id}/messages",
      get(consultations::get_messages::<T, O>),
    )
    .route(
      "/consultations/{id}/summary",
      post(consultations::set_summary::<T, O>),
    )
    .route(
      "/consultations/{id}/delete",
      post(consultations::soft_delete::<T, O>),
    )
    .with_state(service)
}

// ─── Integration tests ───────────────────────────────────────────────────────
