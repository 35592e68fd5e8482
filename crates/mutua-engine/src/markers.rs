//! Marker predicates over normalized inbound text.
//!
//! The fixed vocabulary that opens and closes sessions, plus the bot-menu
//! control chatter that must never count as consultation content. All three
//! predicates expect [`normalize`](crate::normalize)d input and apply to
//! inbound (visitor) messages only; callers check them in priority order
//! start > end > internal-flow > content.

const START_COMMANDS: &[&str] = &["hola", "reset", "/start", "/startmutu"];

const END_COMMANDS: &[&str] = &["salir", "/salir"];

/// Bare acknowledgements the bot menus elicit.
const ACKNOWLEDGEMENTS: &[&str] = &["si", "no", "ok"];

/// Slot-booking flow prefixes. "cambiar " keeps its trailing space so that
/// "cambiar de abogado" matches but a lone "cambiar" question does not.
const FLOW_PREFIXES: &[&str] =
  &["confirmar cita", "cambiar ", "cancelar cita", "reprogramar cita"];

/// Does this utterance open a session?
pub fn is_start_command(normalized: &str) -> bool {
  START_COMMANDS.contains(&normalized)
}

/// Does this utterance close a session? Either an explicit exit command or
/// any phrasing that mentions both booking ("agendar") and an appointment
/// ("cita") — the bot treats that as the hand-off to slot booking.
pub fn is_end_command(normalized: &str) -> bool {
  END_COMMANDS.contains(&normalized)
    || (normalized.contains("agendar") && normalized.contains("cita"))
}

/// Is this utterance bot-menu control rather than consultation content?
pub fn is_internal_flow(normalized: &str) -> bool {
  normalized.is_empty()
    || is_start_command(normalized)
    || is_end_command(normalized)
    || normalized.starts_with('/')
    || ACKNOWLEDGEMENTS.contains(&normalized)
    || FLOW_PREFIXES.iter().any(|p| normalized.starts_with(p))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::normalize;

  #[test]
  fn start_commands_match_after_normalization() {
    for raw in ["¡Hola!", "HOLA", "reset", "/START", "/startmutu"] {
      assert!(is_start_command(&normalize(raw)), "{raw:?}");
    }
    assert!(!is_start_command(&normalize("hola, necesito ayuda")));
  }

  #[test]
  fn end_commands_match_exit_words_and_booking_phrases() {
    assert!(is_end_command(&normalize("Salir")));
    assert!(is_end_command(&normalize("/salir")));
    assert!(is_end_command(&normalize("quiero agendar una cita")));
    // Order of the two words does not matter.
    assert!(is_end_command(&normalize("una cita, para agendar")));
    assert!(!is_end_command(&normalize("agendar algo")));
    assert!(!is_end_command(&normalize("necesito una cita médica")));
  }

  #[test]
  fn internal_flow_covers_menu_chatter() {
    for raw in [
      "",
      "Sí",
      "no",
      "OK",
      "/ayuda",
      "hola",
      "salir",
      "Confirmar cita",
      "cambiar de abogado",
      "Cancelar cita, por favor",
      "reprogramar cita",
    ] {
      assert!(is_internal_flow(&normalize(raw)), "{raw:?}");
    }
  }

  #[test]
  fn substantive_questions_are_not_internal_flow() {
    for raw in [
      "necesito un divorcio",
      "me han despedido sin finiquito",
      "cambiar", // bare word, no trailing context
    ] {
      assert!(!is_internal_flow(&normalize(raw)), "{raw:?}");
    }
  }
}
