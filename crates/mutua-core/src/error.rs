//! Error types for `mutua-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid consultation id (expected <conversation>:<message>): {0:?}")]
  InvalidConsultationId(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
