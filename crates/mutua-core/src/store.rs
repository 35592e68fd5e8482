//! The `TranscriptStore` and `OverlayStore` traits.
//!
//! Implemented by storage backends (e.g. `mutua-store-sqlite`). Higher layers
//! depend on these abstractions, not on any concrete backend. The engine
//! itself never touches a store: it is handed the full transcript and the
//! latest overlay snapshot by the calling service.

use std::future::Future;

use crate::{message::TranscriptMessage, overlay::{OverlayProfile, OverlayRecord}};

// ─── Transcript store ────────────────────────────────────────────────────────

/// Read access to the externally owned transcript, plus the append hook the
/// bot runtime delivers messages through.
///
/// All methods return `Send` futures so the traits can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait TranscriptStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Append one message to a conversation's transcript. Messages are never
  /// updated or removed afterwards.
  fn append_message(
    &self,
    conversation_id: &str,
    message: TranscriptMessage,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The full transcript for one conversation, in insertion order — the
  /// stable tie-break the segmenter uses for equal timestamps.
  fn get_transcript(
    &self,
    conversation_id: &str,
  ) -> impl Future<Output = Result<Vec<TranscriptMessage>, Self::Error>> + Send + '_;

  /// Every conversation id with at least one message.
  fn list_conversations(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;
}

// ─── Overlay store ───────────────────────────────────────────────────────────

/// Latest-version lookup and version-append over the overlay document.
///
/// The read-latest → append-next sequence is a read-modify-append race; the
/// store does not serialize it. The calling service must hold a
/// per-conversation write lock across the pair.
pub trait OverlayStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The highest-version overlay record for a conversation, if any exists.
  fn latest_overlay(
    &self,
    conversation_id: &str,
  ) -> impl Future<Output = Result<Option<OverlayRecord>, Self::Error>> + Send + '_;

  /// Persist `profile` as `version = latest + 1` (or 1 for the first write).
  /// Prior versions are never mutated or removed.
  fn append_overlay(
    &self,
    conversation_id: &str,
    profile: OverlayProfile,
  ) -> impl Future<Output = Result<OverlayRecord, Self::Error>> + Send + '_;
}
