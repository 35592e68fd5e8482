//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Store-assigned timestamps are RFC 3339 strings; transcript `created_at`
//! values pass through verbatim (the skip policy for unparsable ones lives in
//! the engine, not here). The overlay profile is stored as compact JSON.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use mutua_core::{
  message::{Direction, TranscriptMessage},
  overlay::{OverlayProfile, OverlayRecord},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Direction ───────────────────────────────────────────────────────────────

pub fn encode_direction(d: Direction) -> &'static str {
  match d {
    Direction::In => "IN",
    Direction::Out => "OUT",
  }
}

pub fn decode_direction(s: &str) -> Result<Direction> {
  match s {
    "IN" => Ok(Direction::In),
    "OUT" => Ok(Direction::Out),
    other => Err(Error::UnknownDirection(other.to_string())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `messages` row.
pub struct RawMessage {
  pub message_id: String,
  pub direction:  String,
  pub text:       String,
  pub created_at: String,
}

impl RawMessage {
  pub fn into_message(self) -> Result<TranscriptMessage> {
    Ok(TranscriptMessage {
      id:         self.message_id,
      direction:  decode_direction(&self.direction)?,
      text:       self.text,
      created_at: self.created_at,
    })
  }
}

/// Raw strings read directly from an `overlays` row.
pub struct RawOverlay {
  pub overlay_id:      String,
  pub conversation_id: String,
  pub version:         i64,
  pub profile_json:    String,
  pub recorded_at:     String,
}

impl RawOverlay {
  pub fn into_record(self) -> Result<OverlayRecord> {
    let profile: OverlayProfile = serde_json::from_str(&self.profile_json)?;
    Ok(OverlayRecord {
      overlay_id:      decode_uuid(&self.overlay_id)?,
      conversation_id: self.conversation_id,
      version:         self.version,
      profile,
      recorded_at:     decode_dt(&self.recorded_at)?,
    })
  }
}
