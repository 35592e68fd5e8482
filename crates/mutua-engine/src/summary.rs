//! Deterministic summary synthesis.
//!
//! Composes a fixed multi-section summary from a segment's consultation
//! content and its case category. Never free-form and never fallible: scoring
//! picks the single best bot guidance line, fixed fallback sentences cover
//! sessions where the bot offered none, and an empty session yields a fixed
//! placeholder. Same segment, same category — byte-identical output.

use mutua_core::{consultation::CaseCategory, message::Message, segment::Segment};

use crate::{
  content::{consultation_content, is_substantive},
  normalize,
};

// ─── Fixed vocabulary ────────────────────────────────────────────────────────

/// Returned when content has neither user nor bot lines.
pub const NO_SUMMARY_PLACEHOLDER: &str =
  "Aun no hay resumen generado para esta consulta.";

const GUIDANCE_FALLBACK: &str =
  "El asistente no llego a ofrecer una orientacion concreta en esta conversacion.";

const GUIDANCE_FALLBACK_TECHNICAL: &str =
  "La conversacion se interrumpio por un fallo tecnico del asistente.";

/// Known bot boilerplate — welcome banners and generic menu prompts. Matched
/// as substrings of normalized bot lines; matching lines never become the
/// guidance line.
const BOILERPLATE: &[&str] = &[
  "bienvenido al asistente",
  "soy el asistente virtual",
  "selecciona una opcion",
  "elige una de las siguientes opciones",
  "menu principal",
  "en que puedo ayudarte",
  "escribe salir",
];

/// Low-value filler: eligible only when nothing better exists.
const FILLER: &[&str] = &[
  "gracias por tu consulta",
  "un momento por favor",
  "entendido",
  "perfecto",
  "de acuerdo",
];

/// Phrases signalling the bot's hand-off into substantive guidance.
const TRANSITION_PHRASES: &[&str] = &["con lo que", "puedes empezar"];

/// Route/orientation vocabulary.
const ROUTE_VOCABULARY: &[&str] = &[
  "orientacion",
  "consultorio",
  "abogado",
  "especialista",
  "te recomiendo",
  "derivar",
];

const ENUMERATION_MARKERS: &[&str] = &["1)", "2)", "3)"];

/// Markers of a technical failure in the bot's own output.
const TECHNICAL_FAILURE: &[&str] =
  &["error", "intentalo mas tarde", "no puedo procesar"];

// ─── Category tables ─────────────────────────────────────────────────────────

fn orientation_bullets(category: CaseCategory) -> [&'static str; 2] {
  match category {
    CaseCategory::Familia => [
      "Reunir certificados de matrimonio y de nacimiento de los hijos.",
      "Revisar si existe convenio o acuerdo previo entre las partes.",
    ],
    CaseCategory::Laboral => [
      "Conservar el contrato, las nominas y la carta de despido si la hay.",
      "Anotar fechas y testigos de los hechos relevantes.",
    ],
    CaseCategory::Penal => [
      "Guardar toda prueba disponible: mensajes, fotos, partes medicos.",
      "No contactar con la otra parte hasta recibir orientacion.",
    ],
    CaseCategory::Mercantil => [
      "Localizar contratos, facturas y justificantes de pago implicados.",
      "Revisar los estatutos o pactos de socios si los hay.",
    ],
    CaseCategory::Administrativo => [
      "Comprobar la fecha de notificacion: los plazos de recurso son cortos.",
      "Reunir la resolucion o sancion y los justificantes presentados.",
    ],
    CaseCategory::General => [
      "Reunir los documentos relacionados con el caso.",
      "Anotar una cronologia breve de los hechos.",
    ],
  }
}

fn follow_up_questions(category: CaseCategory) -> [&'static str; 3] {
  match category {
    CaseCategory::Familia => [
      "Hay hijos menores o dependientes implicados?",
      "Existe convenio regulador o medidas previas?",
      "Se han iniciado ya actuaciones judiciales?",
    ],
    CaseCategory::Laboral => [
      "Cual es la antiguedad y el tipo de contrato?",
      "Se ha firmado algun documento tras el despido o sancion?",
      "Cuando ocurrieron los hechos?",
    ],
    CaseCategory::Penal => [
      "Se ha presentado ya denuncia ante la policia o el juzgado?",
      "Hay partes medicos u otras pruebas documentales?",
      "Existen antecedentes o procedimientos abiertos?",
    ],
    CaseCategory::Mercantil => [
      "Que forma juridica tiene el negocio afectado?",
      "Existe contrato escrito entre las partes?",
      "Cual es el importe aproximado en disputa?",
    ],
    CaseCategory::Administrativo => [
      "Cual es la administracion que dicto el acto?",
      "En que fecha se recibio la notificacion?",
      "Se ha presentado ya alegacion o recurso?",
    ],
    CaseCategory::General => [
      "Cual es el problema principal en una frase?",
      "Desde cuando ocurre la situacion?",
      "Hay plazos o citaciones en curso?",
    ],
  }
}

// ─── Guidance-line selection ─────────────────────────────────────────────────

struct Candidate<'a> {
  text:   &'a str,
  score:  i32,
  filler: bool,
}

/// Score one normalized bot line. Longer is better up to a cap; transition
/// phrases, route vocabulary, and enumerated menu structure add fixed
/// bonuses.
fn guidance_score(raw: &str, normalized: &str) -> i32 {
  let mut score = raw.chars().count().min(120) as i32;
  if TRANSITION_PHRASES.iter().any(|p| normalized.contains(p)) {
    score += 50;
  }
  if ROUTE_VOCABULARY.iter().any(|p| normalized.contains(p)) {
    score += 25;
  }
  if ENUMERATION_MARKERS.iter().any(|p| normalized.contains(p)) {
    score += 10;
  }
  score
}

/// Pick the best guidance line among non-boilerplate bot lines.
///
/// Lines outside the filler blocklist are preferred whenever any exist; ties
/// keep the first occurrence (selection only replaces on a strictly greater
/// score).
fn best_guidance<'a>(bot_lines: &[&'a Message]) -> Option<&'a str> {
  let candidates: Vec<Candidate<'a>> = bot_lines
    .iter()
    .filter_map(|m| {
      let normalized = normalize(&m.text);
      if BOILERPLATE.iter().any(|p| normalized.contains(p)) {
        return None;
      }
      Some(Candidate {
        text:   m.text.as_str(),
        score:  guidance_score(&m.text, &normalized),
        filler: FILLER.iter().any(|p| normalized.contains(p)),
      })
    })
    .collect();

  let has_non_filler = candidates.iter().any(|c| !c.filler);
  let mut best: Option<&Candidate> = None;
  for candidate in &candidates {
    if has_non_filler && candidate.filler {
      continue;
    }
    if best.is_none_or(|b| candidate.score > b.score) {
      best = Some(candidate);
    }
  }
  best.map(|c| c.text)
}

// ─── Synthesis ───────────────────────────────────────────────────────────────

/// Compose the synthetic summary for a segment.
///
/// The output always follows the same fixed structure: the visitor's opening
/// line, up to two follow-up lines as additional context, the chosen bot
/// guidance line (or a fixed fallback), two category-specific orientation
/// bullets, and three category-specific follow-up questions.
pub fn synthesize(segment: &Segment, category: CaseCategory) -> String {
  let content = consultation_content(&segment.messages);

  let user_lines: Vec<&Message> =
    content.iter().filter(|m| is_substantive(m)).collect();
  let bot_lines: Vec<&Message> = content
    .iter()
    .filter(|m| !m.direction.is_inbound())
    .collect();

  if user_lines.is_empty() && bot_lines.is_empty() {
    return NO_SUMMARY_PLACEHOLDER.to_string();
  }

  let opening = user_lines
    .first()
    .map(|m| m.text.as_str())
    .unwrap_or(segment.first_user_message.as_str());
  let follow_ups: Vec<&str> = user_lines
    .iter()
    .skip(1)
    .take(2)
    .map(|m| m.text.as_str())
    .collect();

  let technical_failure = bot_lines.iter().any(|m| {
    let normalized = normalize(&m.text);
    TECHNICAL_FAILURE.iter().any(|p| normalized.contains(p))
  });

  let guidance = best_guidance(&bot_lines).unwrap_or(if technical_failure {
    GUIDANCE_FALLBACK_TECHNICAL
  } else {
    GUIDANCE_FALLBACK
  });

  let mut out = String::new();
  out.push_str("Consulta del usuario:\n");
  out.push_str(opening);
  out.push('\n');

  if !follow_ups.is_empty() {
    out.push_str("\nContexto adicional:\n");
    for line in &follow_ups {
      out.push_str("- ");
      out.push_str(line);
      out.push('\n');
    }
  }

  out.push_str("\nOrientacion del asistente:\n");
  out.push_str(guidance);
  out.push('\n');

  out.push_str(&format!("\nOrientacion inicial ({}):\n", category.label()));
  for bullet in orientation_bullets(category) {
    out.push_str("- ");
    out.push_str(bullet);
    out.push('\n');
  }

  out.push_str("\nPreguntas de seguimiento:\n");
  for (i, question) in follow_up_questions(category).iter().enumerate() {
    out.push_str(&format!("{}. {}\n", i + 1, question));
  }

  out.truncate(out.trim_end().len());
  out
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};
  use mutua_core::message::Direction::{In, Out};
  use mutua_core::segment::SegmentStatus;

  use super::*;
  use crate::test_helpers::msg;

  fn make_segment(messages: Vec<Message>) -> Segment {
    let started_at = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
    let first_user_message = messages
      .iter()
      .find(|m| is_substantive(m))
      .map(|m| m.text.clone())
      .unwrap_or_else(|| "Consulta de chatbot".to_string());
    Segment {
      id: "conv:m0".to_string(),
      conversation_id: "conv".to_string(),
      started_at,
      ended_at: None,
      status: SegmentStatus::Open,
      start_command: "hola".to_string(),
      end_command: None,
      first_user_message,
      messages,
    }
  }

  #[test]
  fn empty_session_yields_the_placeholder() {
    let seg = make_segment(vec![msg("m0", In, "hola", 0)]);
    assert_eq!(
      synthesize(&seg, CaseCategory::General),
      NO_SUMMARY_PLACEHOLDER
    );
  }

  #[test]
  fn template_carries_all_fixed_sections() {
    let seg = make_segment(vec![
      msg("m0", In, "hola", 0),
      msg("m1", Out, "Bienvenido al asistente virtual", 1),
      msg("m2", In, "necesito un divorcio", 2),
      msg("m3", In, "mi pareja no esta de acuerdo", 3),
      msg("m4", Out, "Con lo que me cuentas, puedes empezar reuniendo la documentacion del matrimonio", 4),
    ]);

    let summary = synthesize(&seg, CaseCategory::Familia);
    assert!(summary.starts_with("Consulta del usuario:\nnecesito un divorcio"));
    assert!(summary.contains("Contexto adicional:\n- mi pareja no esta de acuerdo"));
    assert!(summary.contains("Con lo que me cuentas"));
    assert!(summary.contains("Orientacion inicial (Derecho de familia):"));
    assert!(summary.contains("Preguntas de seguimiento:\n1. "));
    // Boilerplate never leaks into the summary.
    assert!(!summary.contains("Bienvenido al asistente"));
  }

  #[test]
  fn transition_phrase_outranks_a_longer_plain_line() {
    let long_plain = "a".repeat(60);
    let seg = make_segment(vec![
      msg("m0", In, "me han despedido", 0),
      msg("m1", Out, &long_plain, 1),
      msg("m2", Out, "Puedes empezar guardando la carta de despido", 2),
    ]);

    let summary = synthesize(&seg, CaseCategory::Laboral);
    // 44 chars + 50 transition beats the plain line's 60.
    assert!(summary.contains("Puedes empezar guardando la carta de despido"));
  }

  #[test]
  fn score_ties_keep_the_first_occurrence() {
    let seg = make_segment(vec![
      msg("m0", In, "tengo una consulta", 0),
      msg("m1", Out, "misma longitud aqui!", 1),
      msg("m2", Out, "igual de larga aqui!", 2),
    ]);

    let summary = synthesize(&seg, CaseCategory::General);
    assert!(summary.contains("misma longitud aqui!"));
    assert!(!summary.contains("igual de larga aqui!"));
  }

  #[test]
  fn filler_lines_lose_to_any_non_filler_line() {
    let seg = make_segment(vec![
      msg("m0", In, "tengo una duda", 0),
      msg(
        "m1",
        Out,
        "Gracias por tu consulta, un momento por favor, estamos revisando todo con mucho detalle",
        1,
      ),
      msg("m2", Out, "Habla con un abogado", 2),
    ]);

    let summary = synthesize(&seg, CaseCategory::General);
    // The filler line scores higher on length but is only a fallback.
    assert!(summary.contains("Habla con un abogado"));
  }

  #[test]
  fn filler_is_used_when_nothing_else_remains() {
    let seg = make_segment(vec![
      msg("m0", In, "tengo una duda", 0),
      msg("m1", Out, "Entendido", 1),
    ]);
    let summary = synthesize(&seg, CaseCategory::General);
    assert!(summary.contains("Entendido"));
  }

  #[test]
  fn no_guidance_yields_the_fixed_fallback() {
    let seg = make_segment(vec![
      msg("m0", In, "tengo una duda", 0),
      msg("m1", Out, "Bienvenido al asistente virtual", 1),
    ]);
    let summary = synthesize(&seg, CaseCategory::General);
    assert!(summary.contains(GUIDANCE_FALLBACK));
  }

  #[test]
  fn technical_failure_yields_the_distinct_fallback() {
    let seg = make_segment(vec![
      msg("m0", In, "tengo una duda", 0),
      msg("m1", Out, "Ha ocurrido un error, intentalo mas tarde. Selecciona una opcion del menu principal", 1),
    ]);
    let summary = synthesize(&seg, CaseCategory::General);
    assert!(summary.contains(GUIDANCE_FALLBACK_TECHNICAL));
  }

  #[test]
  fn output_is_byte_identical_across_calls() {
    let seg = make_segment(vec![
      msg("m0", In, "hola", 0),
      msg("m1", In, "consulta sobre una multa", 1),
      msg("m2", Out, "Te recomiendo recurrir: 1) alegaciones 2) recurso", 2),
    ]);
    let a = synthesize(&seg, CaseCategory::Administrativo);
    let b = synthesize(&seg, CaseCategory::Administrativo);
    assert_eq!(a, b);
  }
}
