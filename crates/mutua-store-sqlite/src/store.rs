//! [`SqliteStore`] — the SQLite implementation of [`TranscriptStore`] and
//! [`OverlayStore`].

use std::{future::Future, path::Path};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use mutua_core::{
  message::TranscriptMessage,
  overlay::{OverlayProfile, OverlayRecord},
  store::{OverlayStore, TranscriptStore},
};

use crate::{
  Error, Result,
  encode::{RawMessage, RawOverlay, encode_direction, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Mutua store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── TranscriptStore impl ────────────────────────────────────────────────────

impl TranscriptStore for SqliteStore {
  type Error = Error;

  fn append_message(
    &self,
    conversation_id: &str,
    message: TranscriptMessage,
  ) -> impl Future<Output = Result<()>> + Send + '_ {
    let conversation_id = conversation_id.to_string();
    let direction = encode_direction(message.direction).to_owned();

    async move {
      self
        .conn
        .call(move |conn| {
          conn.execute(
            "INSERT INTO messages (conversation_id, message_id, direction, text, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
              conversation_id,
              message.id,
              direction,
              message.text,
              message.created_at,
            ],
          )?;
          Ok(())
        })
        .await?;
      Ok(())
    }
  }

  fn get_transcript(
    &self,
    conversation_id: &str,
  ) -> impl Future<Output = Result<Vec<TranscriptMessage>>> + Send + '_ {
    let conversation_id = conversation_id.to_string();

    async move {
      let raws: Vec<RawMessage> = self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(
            "SELECT message_id, direction, text, created_at
             FROM messages
             WHERE conversation_id = ?1
             ORDER BY seq",
          )?;
          let rows = stmt
            .query_map(rusqlite::params![conversation_id], |row| {
              Ok(RawMessage {
                message_id: row.get(0)?,
                direction:  row.get(1)?,
                text:       row.get(2)?,
                created_at: row.get(3)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?;

      raws.into_iter().map(RawMessage::into_message).collect()
    }
  }

  async fn list_conversations(&self) -> Result<Vec<String>> {
    let ids: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT conversation_id FROM messages ORDER BY conversation_id",
        )?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(ids)
  }
}

// ─── OverlayStore impl ───────────────────────────────────────────────────────

impl OverlayStore for SqliteStore {
  type Error = Error;

  fn latest_overlay(
    &self,
    conversation_id: &str,
  ) -> impl Future<Output = Result<Option<OverlayRecord>>> + Send + '_ {
    let conversation_id = conversation_id.to_string();

    async move {
      let raw: Option<RawOverlay> = self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT overlay_id, conversation_id, version, profile_json, recorded_at
                 FROM overlays
                 WHERE conversation_id = ?1
                 ORDER BY version DESC
                 LIMIT 1",
                rusqlite::params![conversation_id],
                |row| {
                  Ok(RawOverlay {
                    overlay_id:      row.get(0)?,
                    conversation_id: row.get(1)?,
                    version:         row.get(2)?,
                    profile_json:    row.get(3)?,
                    recorded_at:     row.get(4)?,
                  })
                },
              )
              .optional()?,
          )
        })
        .await?;

      raw.map(RawOverlay::into_record).transpose()
    }
  }

  fn append_overlay(
    &self,
    conversation_id: &str,
    profile: OverlayProfile,
  ) -> impl Future<Output = Result<OverlayRecord>> + Send + '_ {
    let record = OverlayRecord {
      overlay_id: Uuid::new_v4(),
      conversation_id: conversation_id.to_string(),
      // Placeholder; the real version is assigned inside the call below.
      version: 0,
      profile,
      recorded_at: Utc::now(),
    };

    async move {
      let overlay_id_str = encode_uuid(record.overlay_id);
      let conversation_id = record.conversation_id.clone();
      let profile_json = serde_json::to_string(&record.profile)?;
      let recorded_at_str = encode_dt(record.recorded_at);

      // Version lookup and insert share one connection call, so two appends
      // can never interleave inside the store itself. Cross-call ordering is
      // still the caller's per-conversation lock.
      let version: i64 = self
        .conn
        .call(move |conn| {
          let latest: Option<i64> = conn
            .query_row(
              "SELECT MAX(version) FROM overlays WHERE conversation_id = ?1",
              rusqlite::params![conversation_id],
              |row| row.get(0),
            )
            .optional()?
            .flatten();
          let version = latest.unwrap_or(0) + 1;

          conn.execute(
            "INSERT INTO overlays (overlay_id, conversation_id, version, profile_json, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
              overlay_id_str,
              conversation_id,
              version,
              profile_json,
              recorded_at_str,
            ],
          )?;
          Ok(version)
        })
        .await?;

      Ok(OverlayRecord { version, ..record })
    }
  }
}
