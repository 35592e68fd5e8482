//! Handlers for `/consultations` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/consultations` | Optional `estado`, `tipo_caso`, `consultorio`, `q`, `limit`, `offset` |
//! | `GET`  | `/consultations/{id}` | Full view, override-or-synthesized `resumen` |
//! | `GET`  | `/consultations/{id}/messages` | Content-filtered messages only |
//! | `POST` | `/consultations/{id}/summary` | Body: [`SummaryBody`]; returns the updated view |
//! | `POST` | `/consultations/{id}/delete` | Soft delete; returns 204 |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use mutua_core::{
  consultation::{CaseCategory, Consultation},
  message::Message,
  segment::SegmentStatus,
  store::{OverlayStore, TranscriptStore},
};
use serde::Deserialize;

use crate::{
  error::ApiError,
  service::{ConsultationQuery, ConsultationService},
};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  /// `"abierta"` or `"cerrada"`.
  pub estado:      Option<String>,
  /// Category slug, e.g. `"familia"`.
  pub tipo_caso:   Option<String>,
  /// Channel: `"mutualidad"` or `"web"`.
  pub consultorio: Option<String>,
  /// Free-text filter over first message and summary.
  pub q:           Option<String>,
  pub limit:       Option<usize>,
  pub offset:      Option<usize>,
}

impl ListParams {
  fn into_query(self) -> Result<ConsultationQuery, ApiError> {
    let estado = match self.estado.as_deref() {
      None => None,
      Some("abierta") => Some(SegmentStatus::Open),
      Some("cerrada") => Some(SegmentStatus::Closed),
      Some(other) => {
        return Err(ApiError::BadRequest(format!("unknown estado: {other:?}")));
      }
    };
    let tipo_caso = match self.tipo_caso.as_deref() {
      None => None,
      Some(slug) => Some(CaseCategory::from_slug(slug).ok_or_else(|| {
        ApiError::BadRequest(format!("unknown tipo_caso: {slug:?}"))
      })?),
    };
    Ok(ConsultationQuery {
      estado,
      tipo_caso,
      consultorio: self.consultorio,
      q: self.q,
      limit: self.limit,
      offset: self.offset,
    })
  }
}

/// `GET /consultations[?estado=...][&tipo_caso=...][&consultorio=...][&q=...][&limit=...][&offset=...]`
pub async fn list<T, O>(
  State(service): State<Arc<ConsultationService<T, O>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Consultation>>, ApiError>
where
  T: TranscriptStore,
  O: OverlayStore,
{
  let query = params.into_query()?;
  let views = service.list_consultations(&query).await?;
  Ok(Json(views))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /consultations/{id}`
pub async fn get_one<T, O>(
  State(service): State<Arc<ConsultationService<T, O>>>,
  Path(id): Path<String>,
) -> Result<Json<Consultation>, ApiError>
where
  T: TranscriptStore,
  O: OverlayStore,
{
  Ok(Json(service.get_consultation(&id).await?))
}

// ─── Messages ────────────────────────────────────────────────────────────────

/// `GET /consultations/{id}/messages`
pub async fn get_messages<T, O>(
  State(service): State<Arc<ConsultationService<T, O>>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError>
where
  T: TranscriptStore,
  O: OverlayStore,
{
  Ok(Json(service.get_messages(&id).await?))
}

// ─── Summary override ────────────────────────────────────────────────────────

/// JSON body accepted by `POST /consultations/{id}/summary`.
#[derive(Debug, Deserialize)]
pub struct SummaryBody {
  pub resumen: String,
}

/// `POST /consultations/{id}/summary` — returns the updated view, with the
/// override already applied.
pub async fn set_summary<T, O>(
  State(service): State<Arc<ConsultationService<T, O>>>,
  Path(id): Path<String>,
  Json(body): Json<SummaryBody>,
) -> Result<Json<Consultation>, ApiError>
where
  T: TranscriptStore,
  O: OverlayStore,
{
  Ok(Json(service.set_summary(&id, &body.resumen).await?))
}

// ─── Soft delete ─────────────────────────────────────────────────────────────

/// `POST /consultations/{id}/delete` — 204 on success; the id disappears
/// from every subsequent read.
pub async fn soft_delete<T, O>(
  State(service): State<Arc<ConsultationService<T, O>>>,
  Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
  T: TranscriptStore,
  O: OverlayStore,
{
  service.soft_delete(&id).await?;
  Ok(StatusCode::NO_CONTENT)
}
