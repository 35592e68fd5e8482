//! The consultation read-model service.
//!
//! Composes the engine with the two stores: every read recomputes segments
//! from the full transcript and layers the latest overlay version on top —
//! consultations have no rows of their own. Writes run the overlay's
//! read-latest → append-next sequence under a per-conversation lock, since
//! the engine itself provides no mutual exclusion.

use std::{collections::HashMap, sync::Arc};

use mutua_core::{
  consultation::{CaseCategory, Consultation},
  message::Message,
  overlay::OverlayProfile,
  segment::{Segment, SegmentStatus},
  store::{OverlayStore, TranscriptStore},
};
use mutua_engine::{
  classify, consultation_content, normalize, segment_transcript, synthesize,
};
use thiserror::Error;
use tokio::sync::Mutex;

// ─── Error ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ServiceError {
  /// No computed segment carries this id, or the id is soft-deleted.
  /// The two cases are deliberately indistinguishable.
  #[error("consultation not found: {0}")]
  NotFound(String),

  #[error("invalid consultation id: {0:?}")]
  InvalidId(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = ServiceError> = std::result::Result<T, E>;

// ─── Query ───────────────────────────────────────────────────────────────────

/// Filters applied after segmentation, plus caller-driven pagination.
#[derive(Debug, Clone, Default)]
pub struct ConsultationQuery {
  pub estado:      Option<SegmentStatus>,
  pub tipo_caso:   Option<CaseCategory>,
  pub consultorio: Option<String>,
  /// Free-text filter over the first message and the summary, matched on
  /// normalized text so diacritics don't hide results.
  pub q:           Option<String>,
  pub limit:       Option<usize>,
  pub offset:      Option<usize>,
}

// ─── Service ─────────────────────────────────────────────────────────────────

pub struct ConsultationService<T, O> {
  transcripts: Arc<T>,
  overlays:    Arc<O>,
  /// Per-conversation write locks for the overlay read-modify-append pair.
  write_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<T, O> ConsultationService<T, O>
where
  T: TranscriptStore,
  O: OverlayStore,
{
  pub fn new(transcripts: Arc<T>, overlays: Arc<O>) -> Self {
    Self {
      transcripts,
      overlays,
      write_locks: Mutex::new(HashMap::new()),
    }
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  /// All non-deleted consultations, most recent first, filtered and
  /// paginated per `query`.
  pub async fn list_consultations(
    &self,
    query: &ConsultationQuery,
  ) -> Result<Vec<Consultation>> {
    let conversations = self
      .transcripts
      .list_conversations()
      .await
      .map_err(box_store)?;

    let mut views = Vec::new();
    for conversation_id in conversations {
      let (segments, profile) = self.conversation_state(&conversation_id).await?;
      for segment in &segments {
        if profile.is_deleted(&segment.id) {
          continue;
        }
        views.push(build_view(segment, &profile));
      }
    }

    views.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    views.retain(|v| matches_query(v, query));

    let offset = query.offset.unwrap_or(0);
    let views: Vec<Consultation> = views
      .into_iter()
      .skip(offset)
      .take(query.limit.unwrap_or(usize::MAX))
      .collect();
    Ok(views)
  }

  /// One consultation by id. Soft-deleted and never-existing ids are the
  /// same `NotFound`.
  pub async fn get_consultation(&self, id: &str) -> Result<Consultation> {
    let (segments, profile) = self.state_for_id(id).await?;
    let segment = find_live(&segments, &profile, id)?;
    Ok(build_view(segment, &profile))
  }

  /// The content-filtered messages of one consultation.
  pub async fn get_messages(&self, id: &str) -> Result<Vec<Message>> {
    Ok(self.get_consultation(id).await?.mensajes)
  }

  // ── Writes ────────────────────────────────────────────────────────────

  /// Attach a staff summary override; visible on every subsequent read.
  pub async fn set_summary(&self, id: &str, text: &str) -> Result<Consultation> {
    let (conversation_id, _) = split_id(id)?;
    let _guard = self.write_lock(conversation_id).await;

    let (segments, profile) = self.state_for_id(id).await?;
    let segment = find_live(&segments, &profile, id)?;

    let next = profile.with_summary(id, text);
    self
      .overlays
      .append_overlay(conversation_id, next.clone())
      .await
      .map_err(box_store)?;

    tracing::debug!(consultation = id, "summary override appended");
    Ok(build_view(segment, &next))
  }

  /// Soft-delete a consultation: excluded from all subsequent reads, while
  /// the transcript and overlay history stay intact.
  pub async fn soft_delete(&self, id: &str) -> Result<()> {
    let (conversation_id, _) = split_id(id)?;
    let _guard = self.write_lock(conversation_id).await;

    let (segments, profile) = self.state_for_id(id).await?;
    find_live(&segments, &profile, id)?;

    self
      .overlays
      .append_overlay(conversation_id, profile.with_deleted(id))
      .await
      .map_err(box_store)?;

    tracing::debug!(consultation = id, "soft-delete appended");
    Ok(())
  }

  // ── Internals ─────────────────────────────────────────────────────────

  /// Recompute segments and fetch the latest overlay for one conversation.
  async fn conversation_state(
    &self,
    conversation_id: &str,
  ) -> Result<(Vec<Segment>, OverlayProfile)> {
    let transcript = self
      .transcripts
      .get_transcript(conversation_id)
      .await
      .map_err(box_store)?;

    let segmentation = segment_transcript(conversation_id, &transcript);
    if segmentation.skipped > 0 {
      tracing::debug!(
        conversation = conversation_id,
        skipped = segmentation.skipped,
        "transcript records dropped by the skip policy"
      );
    }

    let profile = self
      .overlays
      .latest_overlay(conversation_id)
      .await
      .map_err(box_store)?
      .map(|record| record.profile)
      .unwrap_or_default();

    Ok((segmentation.segments, profile))
  }

  async fn state_for_id(
    &self,
    id: &str,
  ) -> Result<(Vec<Segment>, OverlayProfile)> {
    let (conversation_id, _) = split_id(id)?;
    self.conversation_state(conversation_id).await
  }

  async fn write_lock(&self, conversation_id: &str) -> tokio::sync::OwnedMutexGuard<()> {
    let lock = {
      let mut locks = self.write_locks.lock().await;
      // An entry whose Arc is only held by the map has no guard outstanding
      // and no waiter mid-acquisition; drop it so the map stays bounded by
      // in-flight writes rather than every conversation ever written.
      locks.retain(|_, l| Arc::strong_count(l) > 1);
      locks
        .entry(conversation_id.to_string())
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
    };
    lock.lock_owned().await
  }
}

// ─── View assembly ───────────────────────────────────────────────────────────

/// The intake channel, derived from the session's start command.
fn channel(start_command: &str) -> &'static str {
  if normalize(start_command) == "/startmutu" {
    "mutualidad"
  } else {
    "web"
  }
}

/// Merge one segment with the overlay state into the read view.
fn build_view(segment: &Segment, profile: &OverlayProfile) -> Consultation {
  let content = consultation_content(&segment.messages);
  let category = classify(content);
  let resumen = profile
    .stored_summary(&segment.id)
    .map(str::to_string)
    .unwrap_or_else(|| synthesize(segment, category));

  Consultation {
    id: segment.id.clone(),
    tema_legal: category.label().to_string(),
    consultorio: channel(&segment.start_command).to_string(),
    tipo_caso: category.slug().to_string(),
    estado: segment.status,
    resumen,
    primer_mensaje: segment.first_user_message.clone(),
    created_at: segment.started_at,
    ended_at: segment.ended_at,
    mensajes: content.to_vec(),
  }
}

fn matches_query(view: &Consultation, query: &ConsultationQuery) -> bool {
  if let Some(estado) = query.estado
    && view.estado != estado
  {
    return false;
  }
  if let Some(tipo) = query.tipo_caso
    && view.tipo_caso != tipo.slug()
  {
    return false;
  }
  if let Some(consultorio) = &query.consultorio
    && view.consultorio != *consultorio
  {
    return false;
  }
  if let Some(q) = &query.q {
    let needle = normalize(q);
    let haystack =
      format!("{} {}", normalize(&view.primer_mensaje), normalize(&view.resumen));
    if !needle.is_empty() && !haystack.contains(&needle) {
      return false;
    }
  }
  true
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn split_id(id: &str) -> Result<(&str, &str)> {
  Segment::split_id(id).map_err(|_| ServiceError::InvalidId(id.to_string()))
}

fn find_live<'a>(
  segments: &'a [Segment],
  profile: &OverlayProfile,
  id: &str,
) -> Result<&'a Segment> {
  let segment = segments
    .iter()
    .find(|s| s.id == id)
    .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;
  if profile.is_deleted(id) {
    return Err(ServiceError::NotFound(id.to_string()));
  }
  Ok(segment)
}

fn box_store<E>(e: E) -> ServiceError
where
  E: std::error::Error + Send + Sync + 'static,
{
  ServiceError::Store(Box::new(e))
}

#[cfg(test)]
mod tests {
  use mutua_store_sqlite::SqliteStore;

  use super::*;

  #[tokio::test]
  async fn released_write_locks_are_evicted() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let service = ConsultationService::new(store.clone(), store);

    let guard = service.write_lock("c1").await;
    let held = service.write_lock("c2").await;
    assert_eq!(service.write_locks.lock().await.len(), 2);

    drop(guard);
    // The next acquisition prunes entries with no outstanding guard.
    let _third = service.write_lock("c3").await;
    let locks = service.write_locks.lock().await;
    assert!(!locks.contains_key("c1"));
    assert!(locks.contains_key("c2"));
    assert!(locks.contains_key("c3"));
    drop(locks);
    drop(held);
  }
}
