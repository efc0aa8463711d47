//! Errors raised while classifying upstream events.

use thiserror::Error;

/// Structural problems that make an upstream event unusable.
///
/// Missing optional data never produces one of these; defaults are
/// substituted instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("{kind} event has no sender identity")]
    MissingSender { kind: &'static str },
}

impl NormalizeError {
    pub fn missing_sender(kind: &'static str) -> Self {
        NormalizeError::MissingSender { kind }
    }
}
