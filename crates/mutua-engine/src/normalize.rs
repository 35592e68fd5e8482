//! Text canonicalization for marker matching.
//!
//! Every classifier in this crate operates on normalized text only, so
//! diacritic and punctuation variants of the same utterance are equivalent:
//! "¡Holá!", "hola." and "HOLA" all normalize to "hola".

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Punctuation collapsed to a single space. Deliberately narrow: slashes
/// (bot commands) and parentheses (enumerated menu markers like "1)") must
/// survive normalization.
fn is_collapsed_punctuation(c: char) -> bool {
  matches!(c, '!' | '¡' | '?' | '¿' | '.' | ',' | ';' | ':')
}

/// Canonicalize `text`: NFD-decompose and drop combining marks, collapse
/// each run of punctuation/whitespace to one space, lower-case, trim.
///
/// Total and pure — never fails, never allocates surprises.
pub fn normalize(text: &str) -> String {
  let decomposed = text.nfd().filter(|c| !is_combining_mark(*c));

  let mut out = String::with_capacity(text.len());
  let mut pending_gap = false;
  for c in decomposed.flat_map(char::to_lowercase) {
    if is_collapsed_punctuation(c) || c.is_whitespace() {
      pending_gap = true;
    } else {
      if pending_gap && !out.is_empty() {
        out.push(' ');
      }
      pending_gap = false;
      out.push(c);
    }
  }
  out
}
