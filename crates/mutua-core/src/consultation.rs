//! The consultation read view and case categories.
//!
//! A consultation is the computed merge of a [`Segment`](crate::segment) and
//! the conversation's overlay state — never stored, always derived on read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{message::Message, segment::SegmentStatus};

// ─── Case category ───────────────────────────────────────────────────────────

/// Legal case category, inferred by deterministic keyword scoring.
///
/// The variant order is the classifier's priority order: text mentioning both
/// "divorcio" and "empresa" classifies as `Familia`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseCategory {
  Familia,
  Laboral,
  Penal,
  Mercantil,
  Administrativo,
  General,
}

impl CaseCategory {
  /// The slug used in filters and the `tipoCaso` field.
  pub fn slug(self) -> &'static str {
    match self {
      Self::Familia => "familia",
      Self::Laboral => "laboral",
      Self::Penal => "penal",
      Self::Mercantil => "mercantil",
      Self::Administrativo => "administrativo",
      Self::General => "general",
    }
  }

  /// Human-readable label shown in the console (`temaLegal`).
  pub fn label(self) -> &'static str {
    match self {
      Self::Familia => "Derecho de familia",
      Self::Laboral => "Derecho laboral",
      Self::Penal => "Derecho penal",
      Self::Mercantil => "Derecho mercantil",
      Self::Administrativo => "Derecho administrativo",
      Self::General => "Consulta general",
    }
  }

  pub fn from_slug(s: &str) -> Option<Self> {
    match s {
      "familia" => Some(Self::Familia),
      "laboral" => Some(Self::Laboral),
      "penal" => Some(Self::Penal),
      "mercantil" => Some(Self::Mercantil),
      "administrativo" => Some(Self::Administrativo),
      "general" => Some(Self::General),
      _ => None,
    }
  }
}

// ─── Consultation view ───────────────────────────────────────────────────────

/// The read-facing merge of a segment and its overlay state.
///
/// Field names follow the console's wire format; it has no row of its own and
/// is recomputed on every read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consultation {
  pub id:             String,
  /// Category label, e.g. "Derecho de familia".
  #[serde(rename = "temaLegal")]
  pub tema_legal:     String,
  /// Intake channel: "mutualidad" for the clinic's embedded bot, "web"
  /// otherwise.
  pub consultorio:    String,
  /// Category slug, e.g. "familia".
  #[serde(rename = "tipoCaso")]
  pub tipo_caso:      String,
  pub estado:         SegmentStatus,
  /// Stored staff override when present, synthesized summary otherwise.
  pub resumen:        String,
  #[serde(rename = "primerMensaje")]
  pub primer_mensaje: String,
  #[serde(rename = "createdAt")]
  pub created_at:     DateTime<Utc>,
  #[serde(rename = "endedAt")]
  pub ended_at:       Option<DateTime<Utc>>,
  /// Content-filtered messages: bot welcome boilerplate and pre-question
  /// flow-control exchanges are stripped.
  pub mensajes:       Vec<Message>,
}
