//! Transcript segmentation and consultation extraction for Mutua.
//!
//! Converts the raw, externally produced bot transcript into derived
//! [`Segment`](mutua_core::segment::Segment)s and their inferred metadata.
//! Pure and synchronous; no HTTP or database dependencies, and no state
//! across calls — every invocation recomputes from the full transcript, so
//! the same transcript always yields the same segments, ids, and summaries.
//!
//! Pipeline:
//!   raw transcript
//!     └─ segment_transcript()        → Segmentation (one Segment per session)
//!          └─ consultation_content() → the session's substantive suffix
//!               ├─ classify()        → CaseCategory
//!               └─ synthesize()      → deterministic templated summary
//!
//! All classification is deterministic keyword/marker matching over
//! [`normalize`]d text — no natural-language understanding, by design.

pub mod classify;
pub mod content;
pub mod markers;
pub mod normalize;
pub mod segment;
pub mod summary;

pub use classify::classify;
pub use content::consultation_content;
pub use normalize::normalize;
pub use segment::{Segmentation, segment_transcript};
pub use summary::synthesize;

// ─── Shared test helpers ─────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod test_helpers {
  use chrono::{DateTime, TimeZone, Utc};
  use mutua_core::message::{Direction, Message, TranscriptMessage};

  pub(crate) fn at(secs: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
      + chrono::Duration::seconds(secs as i64)
  }

  /// A raw transcript record `secs` seconds into the fixture conversation.
  pub(crate) fn raw(
    id: &str,
    direction: Direction,
    text: &str,
    secs: u32,
  ) -> TranscriptMessage {
    TranscriptMessage {
      id: id.to_string(),
      direction,
      text: text.to_string(),
      created_at: at(secs).to_rfc3339(),
    }
  }

  /// A parsed message for components downstream of the segmenter.
  pub(crate) fn msg(
    id: &str,
    direction: Direction,
    text: &str,
    secs: u32,
  ) -> Message {
    Message {
      id: id.to_string(),
      direction,
      text: text.to_string(),
      created_at: at(secs),
    }
  }
}
