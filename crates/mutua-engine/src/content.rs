//! Content filter: strip leading bot boilerplate from a segment's buffer.
//!
//! The consultation "content" is the suffix starting at the visitor's first
//! substantive message — everything before it is welcome banners, menu
//! prompts, and yes/no confirmations that belong to neither the visible
//! transcript view nor the summary.

use mutua_core::message::Message;

use crate::{markers, normalize};

/// Is this a visitor message that carries actual consultation content?
pub(crate) fn is_substantive(m: &Message) -> bool {
  m.direction.is_inbound() && !markers::is_internal_flow(&normalize(&m.text))
}

/// The consultation content of a segment's buffer.
///
/// Returns the suffix from the first substantive inbound message. When that
/// message is the very first one, or when no substantive message exists at
/// all, the buffer is returned unchanged — there is no boilerplate prefix
/// worth cutting, and cutting everything would hide the session.
pub fn consultation_content(messages: &[Message]) -> &[Message] {
  match messages.iter().position(is_substantive) {
    Some(i) if i > 0 => &messages[i..],
    _ => messages,
  }
}
