//! The segmenter — a two-state machine over the time-ordered transcript.
//!
//! Walks the transcript once, message by message, carrying an in-progress
//! buffer while a session is active. No lookahead, no backtracking: marker
//! recognition alone decides every transition, which is what makes
//! recomputation deterministic.

use chrono::{DateTime, Utc};
use mutua_core::{
  message::{Message, TranscriptMessage},
  segment::{Segment, SegmentStatus},
};

use crate::{markers, normalize};

/// The result of one segmentation pass.
#[derive(Debug, Clone)]
pub struct Segmentation {
  /// Detected sessions, most recent first.
  pub segments: Vec<Segment>,
  /// Messages dropped by the skip policy (unparsable timestamp or empty
  /// text). They never open, extend, or close a segment.
  pub skipped:  usize,
}

// ─── State ───────────────────────────────────────────────────────────────────

/// An in-progress session: everything seen since its start command.
struct Active {
  start_id:      String,
  started_at:    DateTime<Utc>,
  start_command: String,
  buffer:        Vec<Message>,
}

impl Active {
  fn open(msg: Message) -> Self {
    Self {
      start_id:      msg.id.clone(),
      started_at:    msg.created_at,
      start_command: msg.text.clone(),
      buffer:        vec![msg],
    }
  }

  /// Close with an explicit end command.
  fn close(self, conversation_id: &str, end: &Message) -> Segment {
    self.into_segment(
      conversation_id,
      SegmentStatus::Closed,
      Some(end.text.clone()),
      Some(end.created_at),
    )
  }

  /// Flush a session that never saw an end command: transcript ended, or a
  /// new start command arrived on top of it. Never silently dropped.
  fn flush(self, conversation_id: &str) -> Segment {
    let last_at = self.buffer.last().map(|m| m.created_at);
    self.into_segment(conversation_id, SegmentStatus::Open, None, last_at)
  }

  fn into_segment(
    self,
    conversation_id: &str,
    status: SegmentStatus,
    end_command: Option<String>,
    ended_at: Option<DateTime<Utc>>,
  ) -> Segment {
    let first_user_message = first_user_message(&self.buffer);
    Segment {
      id: Segment::compose_id(conversation_id, &self.start_id),
      conversation_id: conversation_id.to_string(),
      started_at: self.started_at,
      ended_at,
      status,
      start_command: self.start_command,
      end_command,
      first_user_message,
      messages: self.buffer,
    }
  }
}

/// First substantive inbound message; else the first inbound message at all;
/// else a fixed literal so the console never shows an empty title.
fn first_user_message(buffer: &[Message]) -> String {
  buffer
    .iter()
    .find(|m| {
      m.direction.is_inbound() && !markers::is_internal_flow(&normalize(&m.text))
    })
    .or_else(|| buffer.iter().find(|m| m.direction.is_inbound()))
    .map(|m| m.text.clone())
    .unwrap_or_else(|| "Consulta de chatbot".to_string())
}

// ─── Skip policy ─────────────────────────────────────────────────────────────

/// Parse one raw record into a buffered message, or `None` under the skip
/// policy. The transcript is externally produced and cannot be rejected, so
/// a malformed record is a skip, not an error.
fn parse_message(raw: &TranscriptMessage) -> Option<Message> {
  if raw.text.trim().is_empty() {
    return None;
  }
  let created_at = DateTime::parse_from_rfc3339(&raw.created_at)
    .ok()?
    .with_timezone(&Utc);
  Some(Message {
    id: raw.id.clone(),
    direction: raw.direction,
    text: raw.text.clone(),
    created_at,
  })
}

// ─── Segmentation pass ───────────────────────────────────────────────────────

/// Reconstruct the consultation sessions of one conversation.
///
/// Messages are processed in ascending timestamp order with source order as
/// the stable tie-break. Returned segments are most-recent-first — a
/// presentation convenience, not a structural guarantee.
pub fn segment_transcript(
  conversation_id: &str,
  transcript: &[TranscriptMessage],
) -> Segmentation {
  let mut ordered: Vec<Message> =
    transcript.iter().filter_map(parse_message).collect();
  let skipped = transcript.len() - ordered.len();
  // Stable sort: source order breaks timestamp ties.
  ordered.sort_by_key(|m| m.created_at);

  let mut segments: Vec<Segment> = Vec::new();
  let mut state: Option<Active> = None;

  for msg in ordered {
    let normalized = msg.direction.is_inbound().then(|| normalize(&msg.text));
    let is_start =
      normalized.as_deref().is_some_and(markers::is_start_command);
    let is_end = normalized.as_deref().is_some_and(markers::is_end_command);

    match state.take() {
      // A new start command on top of an active session flushes it open.
      Some(active) if is_start => {
        segments.push(active.flush(conversation_id));
        state = Some(Active::open(msg));
      }
      Some(mut active) if is_end => {
        active.buffer.push(msg.clone());
        segments.push(active.close(conversation_id, &msg));
      }
      Some(mut active) => {
        active.buffer.push(msg);
        state = Some(active);
      }
      None if is_start => {
        state = Some(Active::open(msg));
      }
      // Pre-session noise: cannot belong to any segment. An end command
      // with no active session is equally inert.
      None => {}
    }
  }

  if let Some(active) = state {
    segments.push(active.flush(conversation_id));
  }

  segments.reverse();
  Segmentation { segments, skipped }
}

#[cfg(test)]
mod tests {
  use mutua_core::message::Direction::{In, Out};
  use mutua_core::segment::SegmentStatus;

  use super::*;
  use crate::test_helpers::{at, raw};

  #[test]
  fn start_question_end_yields_one_closed_segment() {
    let transcript = vec![
      raw("m0", In, "hola", 0),
      raw("m1", Out, "bienvenido", 1),
      raw("m2", In, "necesito un divorcio", 2),
      raw("m3", In, "agendar una cita", 3),
    ];

    let out = segment_transcript("conv-1", &transcript);
    assert_eq!(out.skipped, 0);
    assert_eq!(out.segments.len(), 1);

    let seg = &out.segments[0];
    assert_eq!(seg.id, "conv-1:m0");
    assert_eq!(seg.status, SegmentStatus::Closed);
    assert_eq!(seg.start_command, "hola");
    assert_eq!(seg.end_command.as_deref(), Some("agendar una cita"));
    assert_eq!(seg.first_user_message, "necesito un divorcio");
    assert_eq!(seg.started_at, at(0));
    assert_eq!(seg.ended_at, Some(at(3)));
    assert_eq!(seg.messages.len(), 4);
  }

  #[test]
  fn second_start_flushes_the_first_segment_open() {
    let transcript = vec![
      raw("m0", In, "hola", 0),
      raw("m1", In, "me han despedido", 1),
      raw("m2", Out, "entiendo, cuentame mas", 2),
      raw("m3", In, "hola", 10),
      raw("m4", In, "otra consulta distinta", 11),
    ];

    let out = segment_transcript("conv-1", &transcript);
    assert_eq!(out.segments.len(), 2);

    // Most-recent-first: the second session leads.
    assert_eq!(out.segments[0].id, "conv-1:m3");
    assert_eq!(out.segments[0].status, SegmentStatus::Open);

    let first = &out.segments[1];
    assert_eq!(first.id, "conv-1:m0");
    assert_eq!(first.status, SegmentStatus::Open);
    assert!(first.end_command.is_none());
    // Ended at its last message before the second "hola".
    assert_eq!(first.ended_at, Some(at(2)));
  }

  #[test]
  fn segment_id_is_stable_regardless_of_other_segments() {
    let session = vec![
      raw("s", In, "hola", 50),
      raw("q", In, "necesito ayuda con una multa", 51),
    ];
    let mut with_prefix = vec![
      raw("a", In, "hola", 0),
      raw("b", In, "salir", 1),
    ];
    with_prefix.extend(session.clone());

    let alone = segment_transcript("c", &session);
    let prefixed = segment_transcript("c", &with_prefix);

    assert_eq!(alone.segments[0].id, "c:s");
    assert_eq!(prefixed.segments[0].id, "c:s");
  }

  #[test]
  fn end_command_without_active_session_is_inert() {
    let transcript = vec![
      raw("m0", In, "salir", 0),
      raw("m1", In, "agendar una cita", 1),
    ];
    let out = segment_transcript("conv-1", &transcript);
    assert!(out.segments.is_empty());
  }

  #[test]
  fn pre_session_noise_is_discarded() {
    let transcript = vec![
      raw("m0", Out, "bienvenido al asistente", 0),
      raw("m1", In, "tengo una pregunta", 1),
      raw("m2", In, "hola", 2),
      raw("m3", In, "necesito ayuda", 3),
    ];
    let out = segment_transcript("conv-1", &transcript);
    assert_eq!(out.segments.len(), 1);
    // The pre-session question is not resurrected into the segment.
    assert!(out.segments[0].messages.iter().all(|m| m.id != "m1"));
  }

  #[test]
  fn bot_only_or_empty_transcripts_yield_no_segments() {
    assert!(segment_transcript("c", &[]).segments.is_empty());

    let bots = vec![
      raw("m0", Out, "bienvenido", 0),
      raw("m1", Out, "en que puedo ayudarte", 1),
    ];
    assert!(segment_transcript("c", &bots).segments.is_empty());
  }

  #[test]
  fn malformed_records_are_skipped_entirely() {
    let mut bad_ts = raw("m1", In, "hola", 0);
    bad_ts.created_at = "yesterday at noon".to_string();
    let transcript = vec![
      bad_ts,
      raw("m2", In, "   ", 1),
      raw("m3", In, "hola", 2),
      raw("m4", In, "necesito un divorcio", 3),
    ];

    let out = segment_transcript("conv-1", &transcript);
    assert_eq!(out.skipped, 2);
    assert_eq!(out.segments.len(), 1);
    // The skipped start command did not open a segment.
    assert_eq!(out.segments[0].id, "conv-1:m3");
  }

  #[test]
  fn equal_timestamps_keep_source_order() {
    let transcript = vec![
      raw("m0", In, "hola", 5),
      raw("m1", In, "primera duda", 5),
      raw("m2", In, "segunda duda", 5),
    ];
    let out = segment_transcript("conv-1", &transcript);
    let ids: Vec<&str> = out.segments[0]
      .messages
      .iter()
      .map(|m| m.id.as_str())
      .collect();
    assert_eq!(ids, ["m0", "m1", "m2"]);
  }

  #[test]
  fn diacritic_variants_of_commands_still_segment() {
    let transcript = vec![
      raw("m0", In, "¡Holá!", 0),
      raw("m1", In, "consulta sobre herencia", 1),
      raw("m2", In, "Quiero agendar una cita.", 2),
    ];
    let out = segment_transcript("conv-1", &transcript);
    assert_eq!(out.segments.len(), 1);
    assert_eq!(out.segments[0].status, SegmentStatus::Closed);
  }

  #[test]
  fn first_user_message_falls_back_when_only_flow_chatter() {
    let transcript = vec![
      raw("m0", In, "hola", 0),
      raw("m1", Out, "bienvenido", 1),
      raw("m2", In, "si", 2),
    ];
    let out = segment_transcript("conv-1", &transcript);
    // No substantive inbound: fall back to the first inbound at all.
    assert_eq!(out.segments[0].first_user_message, "hola");
  }

  #[test]
  fn repeated_calls_are_deterministic() {
    let transcript = vec![
      raw("m0", In, "hola", 0),
      raw("m1", Out, "bienvenido al asistente", 1),
      raw("m2", In, "me ponen una multa injusta", 2),
      raw("m3", In, "salir", 3),
      raw("m4", In, "/start", 4),
      raw("m5", In, "y ademas un despido", 5),
    ];
    let a = segment_transcript("conv-1", &transcript);
    let b = segment_transcript("conv-1", &transcript);
    let enc = |s: &Segmentation| format!("{:?}", s.segments);
    assert_eq!(enc(&a), enc(&b));
  }
}
