//! Transcript messages — the fundamental unit of the intake channel.
//!
//! The transcript is externally owned and append-only: the bot runtime writes
//! it, this platform only reads it. Nothing here is ever mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Direction ───────────────────────────────────────────────────────────────

/// Who sent a message: the visitor (`IN`) or the bot (`OUT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
  #[serde(rename = "IN")]
  In,
  #[serde(rename = "OUT")]
  Out,
}

impl Direction {
  pub fn is_inbound(self) -> bool { matches!(self, Self::In) }
}

// ─── Raw transcript record ───────────────────────────────────────────────────

/// One message exactly as the transcript store delivers it.
///
/// `created_at` stays a raw string at this layer: the transcript cannot be
/// rejected, and records with unparsable timestamps are a skip decision that
/// belongs to the segmentation engine, not to deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMessage {
  pub id:         String,
  pub direction:  Direction,
  pub text:       String,
  #[serde(rename = "createdAt")]
  pub created_at: String,
}

// ─── Parsed message ──────────────────────────────────────────────────────────

/// A transcript message that survived timestamp parsing and the empty-text
/// check. This is the only form the segmenter buffers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
  pub id:         String,
  pub direction:  Direction,
  pub text:       String,
  #[serde(rename = "createdAt")]
  pub created_at: DateTime<Utc>,
}
