//! Overlay records — append-only, versioned staff annotations.
//!
//! Segments are derived and have no row of their own, so staff corrections
//! (summary overrides, soft-deletes) live in a separate versioned document
//! keyed by segment id. Every write appends a new version derived from the
//! latest read; history is never rewritten, only extended.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Profile ─────────────────────────────────────────────────────────────────

/// The two overlay maps, keyed by segment id.
///
/// `BTreeMap` keeps serialization order deterministic, so a fixed overlay
/// snapshot always produces byte-identical output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayProfile {
  /// Staff-written summary overrides.
  pub consultation_summaries: BTreeMap<String, String>,
  /// Soft-delete tombstones. Only `true` entries count as deleted.
  pub deleted_consultations:  BTreeMap<String, bool>,
  /// Legacy single-field summary from before per-consultation overrides
  /// existed. Read as a fallback, never written.
  pub summary:                Option<String>,
}

impl OverlayProfile {
  /// The stored summary override for `id`, if any.
  ///
  /// Per-id entries win; an empty stored string counts as absent; the legacy
  /// single-field summary is the final fallback.
  pub fn stored_summary(&self, id: &str) -> Option<&str> {
    self
      .consultation_summaries
      .get(id)
      .map(String::as_str)
      .filter(|s| !s.trim().is_empty())
      .or_else(|| {
        self
          .summary
          .as_deref()
          .filter(|s| !s.trim().is_empty())
      })
  }

  pub fn is_deleted(&self, id: &str) -> bool {
    self.deleted_consultations.get(id).copied().unwrap_or(false)
  }

  /// Next profile with a summary override shallow-merged in.
  pub fn with_summary(&self, id: &str, text: &str) -> Self {
    let mut next = self.clone();
    next
      .consultation_summaries
      .insert(id.to_string(), text.to_string());
    next
  }

  /// Next profile with a soft-delete tombstone shallow-merged in.
  pub fn with_deleted(&self, id: &str) -> Self {
    let mut next = self.clone();
    next.deleted_consultations.insert(id.to_string(), true);
    next
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// One persisted overlay version for a conversation.
///
/// `version` is monotonic per conversation; readers always use the latest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayRecord {
  pub overlay_id:      Uuid,
  pub conversation_id: String,
  pub version:         i64,
  pub profile:         OverlayProfile,
  pub recorded_at:     DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn stored_summary_prefers_per_id_entry() {
    let profile = OverlayProfile {
      summary: Some("legacy".into()),
      ..Default::default()
    }
    .with_summary("c:1", "override");

    assert_eq!(profile.stored_summary("c:1"), Some("override"));
    // Unknown id falls through to the legacy field.
    assert_eq!(profile.stored_summary("c:2"), Some("legacy"));
  }

  #[test]
  fn empty_stored_summary_counts_as_absent() {
    let profile = OverlayProfile::default().with_summary("c:1", "  ");
    assert_eq!(profile.stored_summary("c:1"), None);
  }

  #[test]
  fn tombstones_only_count_when_true() {
    let mut profile = OverlayProfile::default().with_deleted("c:1");
    profile.deleted_consultations.insert("c:2".into(), false);

    assert!(profile.is_deleted("c:1"));
    assert!(!profile.is_deleted("c:2"));
    assert!(!profile.is_deleted("c:3"));
  }

  #[test]
  fn merges_do_not_touch_the_source_profile() {
    let base = OverlayProfile::default();
    let _next = base.with_summary("c:1", "x").with_deleted("c:1");
    assert!(base.consultation_summaries.is_empty());
    assert!(base.deleted_consultations.is_empty());
  }
}
