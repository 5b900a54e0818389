//! Health Claims Adjudication Engine
//!
//! A policy holder files a claim, an insurance worker verifies it against
//! an external fraud model and decides it, and the holder then supplies the
//! payout account.
//!
//! # Claim Lifecycle
//!
//! ```text
//! Create -> UnderReview -> (Verify)* -> Approved -> AddPayoutAccount
//!                                    \-> Rejected
//! ```
//!
//! [`ClaimLifecycle`] is the entry point; it depends only on the port
//! traits in [`ports`], so storage, scoring and document handling can be
//! swapped without touching the rules.

pub mod actor;
pub mod adapters;
pub mod claim;
pub mod documents;
pub mod error;
pub mod fraud;
pub mod lifecycle;
pub mod payout;
pub mod policy_number;
pub mod ports;
pub mod submission;

pub use actor::{Actor, Role};
pub use claim::{Claim, ClaimStatus, InvariantViolation, Review};
pub use documents::{document_owner, DocumentKind, DocumentUpload, SupportingDocuments};
pub use error::{ClaimError, Dependency, PreconditionViolation};
pub use fraud::{FraudAssessment, FraudPrediction, FraudTier, ScoreResponse, ScoringRequest};
pub use lifecycle::ClaimLifecycle;
pub use payout::{PayoutAccount, PayoutAccountCapture};
pub use policy_number::{classify, InsuranceCompany, PolicyClassification};
pub use ports::{ClaimChange, ClaimQuery, ClaimStore, DocumentStore, FraudScorer, WriteCondition};
pub use submission::{ClaimDetails, ClaimSubmission, ValidatedSubmission};
