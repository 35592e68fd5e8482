//! Case classification by ordered keyword scoring.
//!
//! Matches the content's opening user line — plus up to two follow-up user
//! lines — against five keyword sets in a fixed priority order. The order is
//! a deliberate tie-break: a consultation mentioning both "divorcio" and
//! "empresa" is a family case. Best-effort by construction; the contract is
//! the ordering rule, not a unique right answer.

use mutua_core::{consultation::CaseCategory, message::Message};

use crate::{content::is_substantive, normalize};

const FAMILIA: &[&str] = &[
  "divorcio",
  "custodia",
  "pension alimenticia",
  "pension",
  "matrimonio",
  "separacion",
  "patria potestad",
  "regimen de visitas",
  "hijos",
];

const LABORAL: &[&str] = &[
  "despido",
  "finiquito",
  "contrato de trabajo",
  "salario",
  "nomina",
  "indemnizacion",
  "jornada",
  "baja laboral",
  "acoso laboral",
];

const PENAL: &[&str] = &[
  "denuncia",
  "delito",
  "robo",
  "hurto",
  "estafa",
  "amenazas",
  "agresion",
  "detenido",
  "juicio penal",
];

const MERCANTIL: &[&str] = &[
  "empresa",
  "sociedad",
  "autonomo",
  "factura",
  "deuda",
  "socio",
  "concurso de acreedores",
  "quiebra",
  "negocio",
];

const ADMINISTRATIVO: &[&str] = &[
  "multa",
  "sancion",
  "ayuntamiento",
  "licencia",
  "subvencion",
  "extranjeria",
  "recurso administrativo",
  "tramite",
  "administracion",
];

/// Priority order: first matching set wins.
const ORDERED_SETS: &[(CaseCategory, &[&str])] = &[
  (CaseCategory::Familia, FAMILIA),
  (CaseCategory::Laboral, LABORAL),
  (CaseCategory::Penal, PENAL),
  (CaseCategory::Mercantil, MERCANTIL),
  (CaseCategory::Administrativo, ADMINISTRATIVO),
];

/// Infer the case category from consultation content.
///
/// `content` is the output of
/// [`consultation_content`](crate::consultation_content); only its first
/// three substantive user lines take part in scoring.
pub fn classify(content: &[Message]) -> CaseCategory {
  let haystack = content
    .iter()
    .filter(|m| is_substantive(m))
    .take(3)
    .map(|m| normalize(&m.text))
    .collect::<Vec<_>>()
    .join(" ");

  for (category, keywords) in ORDERED_SETS {
    if keywords.iter().any(|k| haystack.contains(k)) {
      return *category;
    }
  }
  CaseCategory::General
}
