//! Segments — detected consultation sessions, derived and never persisted.
//!
//! A segment exists only as the output of recomputing the full transcript.
//! Its id is a pure function of its inputs (`conversation:start-message`), so
//! recomputation always yields the same ids and staff annotations keyed on
//! them stay attached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Whether the session reached an explicit end command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentStatus {
  /// Flushed without an end command (transcript ended, or a new session
  /// started on top of this one).
  #[serde(rename = "abierta")]
  Open,
  /// Closed by an explicit end command.
  #[serde(rename = "cerrada")]
  Closed,
}

/// One detected consultation session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
  /// `{conversation_id}:{start_message_id}` — stable under recomputation.
  pub id:                 String,
  pub conversation_id:    String,
  pub started_at:         DateTime<Utc>,
  /// Timestamp of the closing end command, or of the last buffered message
  /// for segments flushed while still open.
  pub ended_at:           Option<DateTime<Utc>>,
  pub status:             SegmentStatus,
  /// The raw text of the start command that opened the session.
  pub start_command:      String,
  /// The raw text of the end command, when the session was closed by one.
  pub end_command:        Option<String>,
  /// The visitor's first substantive utterance, or a fixed fallback.
  pub first_user_message: String,
  /// Every message between the start command and the session boundary,
  /// bot replies and flow-control exchanges included.
  pub messages:           Vec<Message>,
}

impl Segment {
  /// Build the deterministic segment id.
  pub fn compose_id(conversation_id: &str, start_message_id: &str) -> String {
    format!("{conversation_id}:{start_message_id}")
  }

  /// Split a consultation id back into `(conversation_id, start_message_id)`.
  ///
  /// Splits on the first `:` — conversation ids never contain a colon,
  /// message ids may.
  pub fn split_id(id: &str) -> crate::Result<(&str, &str)> {
    id.split_once(':')
      .filter(|(conv, start)| !conv.is_empty() && !start.is_empty())
      .ok_or_else(|| crate::Error::InvalidConsultationId(id.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn id_round_trips() {
    let id = Segment::compose_id("conv-9", "msg:42");
    assert_eq!(id, "conv-9:msg:42");
    let (conv, start) = Segment::split_id(&id).unwrap();
    assert_eq!(conv, "conv-9");
    assert_eq!(start, "msg:42");
  }

  #[test]
  fn split_id_rejects_malformed() {
    assert!(Segment::split_id("no-colon").is_err());
    assert!(Segment::split_id(":dangling").is_err());
    assert!(Segment::split_id("dangling:").is_err());
  }
}
