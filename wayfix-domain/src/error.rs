//! Error types for wayfix-domain.

use thiserror::Error;

/// Outcome of a correction run that did not produce a change-set.
#[derive(Debug, Error)]
pub enum CorrectionError {
    /// The reviewer rejected the proposal. Nothing is applied, the reversal itself included.
    #[error("correction cancelled by user")]
    UserCancelled,

    /// The reviewer could not be consulted.
    #[error("review failed: {0}")]
    Review(#[source] anyhow::Error),

    /// The change list could not be serialized for hashing.
    #[error("serialize change-set: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CorrectionError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CorrectionError::UserCancelled)
    }
}
