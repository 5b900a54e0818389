//! Claims domain errors

use std::fmt;
use thiserror::Error;

use core_kernel::{ClaimId, PortError};
use crate::claim::{ClaimStatus, InvariantViolation};

/// Errors that can occur in the claims domain
///
/// Each variant maps to one class of the adjudication error taxonomy so the
/// API layer can translate it without inspecting messages.
#[derive(Debug, Error)]
pub enum ClaimError {
    /// A submitted field is missing or malformed. `field` names the first
    /// offending field in submission order.
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// The claim is in the wrong state for the requested operation
    #[error("Precondition failed: {0}")]
    Precondition(#[from] PreconditionViolation),

    /// A conditional write lost against a concurrent writer
    #[error("Conflict on claim {claim_id}: {message}")]
    Conflict { claim_id: ClaimId, message: String },

    /// The actor lacks the role or ownership the operation requires
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Claim not found: {0}")]
    NotFound(ClaimId),

    /// A collaborator (store, scorer, document store) failed
    #[error("{dependency} failure: {source}")]
    Dependency {
        dependency: Dependency,
        retryable: bool,
        #[source]
        source: PortError,
    },

    #[error("Claim invariant violated: {0}")]
    InvariantViolated(#[from] InvariantViolation),
}

impl ClaimError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ClaimError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ClaimError::Forbidden(message.into())
    }

    pub fn conflict(claim_id: ClaimId, message: impl Into<String>) -> Self {
        ClaimError::Conflict {
            claim_id,
            message: message.into(),
        }
    }

    /// Wraps a scorer failure. The claim is never touched before the score
    /// arrives, so only the nature of the failure decides retryability.
    pub fn scorer(source: PortError) -> Self {
        ClaimError::Dependency {
            dependency: Dependency::FraudScorer,
            retryable: source.is_transient(),
            source,
        }
    }

    pub fn documents(source: PortError) -> Self {
        ClaimError::Dependency {
            dependency: Dependency::DocumentStore,
            retryable: source.is_transient(),
            source,
        }
    }

    pub fn store(source: PortError) -> Self {
        ClaimError::Dependency {
            dependency: Dependency::ClaimStore,
            retryable: source.is_transient(),
            source,
        }
    }

    /// Maps a store read failure, lifting not-found into its own variant
    pub fn from_store_read(claim_id: ClaimId, source: PortError) -> Self {
        if source.is_not_found() {
            return ClaimError::NotFound(claim_id);
        }
        ClaimError::store(source)
    }

    /// Maps a store write failure. Lost conditional writes become conflicts;
    /// anything else fails the request outright.
    pub fn from_store_write(claim_id: ClaimId, source: PortError) -> Self {
        match source {
            PortError::Conflict { message } => ClaimError::Conflict { claim_id, message },
            PortError::NotFound { .. } => ClaimError::NotFound(claim_id),
            source => ClaimError::Dependency {
                dependency: Dependency::ClaimStore,
                retryable: false,
                source,
            },
        }
    }

    /// Returns the offending field for validation errors
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ClaimError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Whether the caller may retry the same request unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClaimError::Dependency { retryable: true, .. })
    }
}

/// Guard violations of the claim state machine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionViolation {
    #[error("claim is {status}; only claims under review can be {action}")]
    NotUnderReview {
        status: ClaimStatus,
        action: &'static str,
    },

    #[error("claim has not been verified; run fraud verification before deciding it")]
    NotVerified,

    #[error("claim is {status}; a payout account can only be added to an approved claim")]
    NotApproved { status: ClaimStatus },

    #[error("payout account is already set for this claim")]
    PayoutAlreadySet,
}

/// External collaborators the engine depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
    ClaimStore,
    FraudScorer,
    DocumentStore,
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dependency::ClaimStore => "Claim store",
            Dependency::FraudScorer => "Fraud scorer",
            Dependency::DocumentStore => "Document store",
        };
        f.write_str(name)
    }
}
