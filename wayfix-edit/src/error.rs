//! Error types for wayfix-edit.
//!
//! This module defines error types that distinguish between:
//! - Policy blocks (exit code 2): stale change-sets, unknown primitives, moved members
//! - Cancellation (exit code 3): the reviewer rejected the proposed corrections
//! - Runtime errors (exit code 1): everything else

use thiserror::Error;
use wayfix_types::osm::PrimitiveId;

/// The top-level error type for wayfix-edit operations.
#[derive(Debug, Error)]
pub enum EditError {
    /// The change-set does not fit the data it is applied to (exit code 2).
    #[error("policy block: {0}")]
    PolicyBlock(#[from] PolicyBlockError),

    /// The user cancelled the operation (exit code 3).
    #[error("cancelled by user")]
    Cancelled,

    /// A runtime/tool error occurred (exit code 1).
    #[error("runtime error: {0}")]
    Runtime(#[from] anyhow::Error),
}

/// Blocks that leave the data untouched.
#[derive(Debug, Error)]
pub enum PolicyBlockError {
    /// A primitive changed since the change-set was planned.
    #[error("precondition mismatch: {message}")]
    PreconditionMismatch {
        /// Which primitive and what differs.
        message: String,
    },

    /// A change refers to a primitive that is not in the data set.
    #[error("unknown primitive: {id}")]
    UnknownPrimitive { id: PrimitiveId },

    /// A role change points at a member slot that no longer holds the expected member.
    #[error("member mismatch: {message}")]
    MemberMismatch {
        /// Relation, position and what was found there.
        message: String,
    },
}

impl EditError {
    /// Returns true if this is a policy block error (exit code 2).
    pub fn is_policy_block(&self) -> bool {
        matches!(self, EditError::PolicyBlock(_))
    }

    /// Returns the recommended exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            EditError::PolicyBlock(_) => 2,
            EditError::Cancelled => 3,
            EditError::Runtime(_) => 1,
        }
    }
}

impl From<wayfix_domain::CorrectionError> for EditError {
    fn from(err: wayfix_domain::CorrectionError) -> Self {
        match err {
            wayfix_domain::CorrectionError::UserCancelled => EditError::Cancelled,
            wayfix_domain::CorrectionError::Review(e) => EditError::Runtime(e.context("review")),
            wayfix_domain::CorrectionError::Serialize(e) => {
                EditError::Runtime(anyhow::Error::new(e).context("serialize change-set"))
            }
        }
    }
}

/// Result type alias using EditError.
pub type EditResult<T> = Result<T, EditError>;
