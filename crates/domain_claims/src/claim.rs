//! Claim aggregate

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use core_kernel::{ClaimId, UserId};
use crate::documents::SupportingDocuments;
use crate::error::{ClaimError, PreconditionViolation};
use crate::fraud::{FraudAssessment, FraudTier};
use crate::payout::PayoutAccount;
use crate::policy_number::InsuranceCompany;
use crate::submission::{required_text, ValidatedSubmission};

pub const MAX_REJECTION_REASON_LEN: usize = 1000;

/// Adjudication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Filed and awaiting a decision
    UnderReview,
    Approved,
    Rejected,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::UnderReview => "under_review",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Rejected => "rejected",
        }
    }

    /// Approved and Rejected admit no further transitions
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ClaimStatus::UnderReview)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "under_review" => Ok(ClaimStatus::UnderReview),
            "approved" => Ok(ClaimStatus::Approved),
            "rejected" => Ok(ClaimStatus::Rejected),
            other => Err(format!("unknown claim status '{}'", other)),
        }
    }
}

/// Who decided a claim and when
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub reviewed_by: UserId,
    pub reviewed_at: DateTime<Utc>,
}

/// A persisted claim that breaks one of the aggregate's rules
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("claim is {status} but rejection reason presence is {has_reason}")]
    RejectionReasonMismatch { status: ClaimStatus, has_reason: bool },

    #[error("claim is {status} but review metadata presence is {has_review}")]
    ReviewMismatch { status: ClaimStatus, has_review: bool },

    #[error("claim is {status} without a fraud assessment")]
    DecidedWithoutAssessment { status: ClaimStatus },
}

/// A health-insurance claim
#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    pub id: ClaimId,
    /// The policy holder who filed the claim
    pub policy_holder_id: UserId,
    pub policy_number: String,
    /// Derived from the policy number at submission and never re-derived
    pub insurance_company: InsuranceCompany,
    pub claim_amount: Decimal,
    pub admission_date: NaiveDate,
    pub discharge_date: NaiveDate,
    pub patient_name: String,
    pub patient_age: u8,
    pub hospital_name: String,
    pub doctor_name: String,
    pub diagnosis: String,
    pub treatment_type: String,
    pub notes: Option<String>,
    pub documents: SupportingDocuments,
    pub payout: Option<PayoutAccount>,
    pub status: ClaimStatus,
    /// Latest verification result; replaced wholesale on every verify
    pub fraud: Option<FraudAssessment>,
    pub rejection_reason: Option<String>,
    pub review: Option<Review>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    /// Opens a new claim under review
    pub fn submit(
        policy_holder_id: UserId,
        submission: ValidatedSubmission,
        documents: SupportingDocuments,
        at: DateTime<Utc>,
    ) -> Self {
        let details = submission.details;
        Self {
            id: ClaimId::new_v7(),
            policy_holder_id,
            policy_number: details.policy_number,
            insurance_company: details.insurance_company,
            claim_amount: details.claim_amount,
            admission_date: details.admission_date,
            discharge_date: details.discharge_date,
            patient_name: details.patient_name,
            patient_age: details.patient_age,
            hospital_name: details.hospital_name,
            doctor_name: details.doctor_name,
            diagnosis: details.diagnosis,
            treatment_type: details.treatment_type,
            notes: details.notes,
            documents,
            payout: submission.payout,
            status: ClaimStatus::UnderReview,
            fraud: None,
            rejection_reason: None,
            review: None,
            created_at: at,
            updated_at: at,
        }
    }

    /// Whole days between admission and discharge
    pub fn stay_duration_days(&self) -> i64 {
        (self.discharge_date - self.admission_date).num_days()
    }

    /// Risk tier of the latest assessment; `None` until verified
    pub fn fraud_tier(&self) -> Option<FraudTier> {
        self.fraud.map(|assessment| assessment.tier())
    }

    pub fn is_verified(&self) -> bool {
        self.fraud.is_some()
    }

    /// Replaces any previous assessment
    pub fn record_assessment(
        &mut self,
        assessment: FraudAssessment,
        at: DateTime<Utc>,
    ) -> Result<(), PreconditionViolation> {
        self.ensure_under_review("verified")?;
        self.fraud = Some(assessment);
        self.updated_at = at;
        Ok(())
    }

    pub fn approve(&mut self, reviewer: UserId, at: DateTime<Utc>) -> Result<(), PreconditionViolation> {
        self.ensure_decidable("approved")?;
        self.status = ClaimStatus::Approved;
        self.review = Some(Review { reviewed_by: reviewer, reviewed_at: at });
        self.updated_at = at;
        Ok(())
    }

    /// `reason` must already have passed [`validate_rejection_reason`]
    pub fn reject(
        &mut self,
        reviewer: UserId,
        reason: String,
        at: DateTime<Utc>,
    ) -> Result<(), PreconditionViolation> {
        self.ensure_decidable("rejected")?;
        self.status = ClaimStatus::Rejected;
        self.rejection_reason = Some(reason);
        self.review = Some(Review { reviewed_by: reviewer, reviewed_at: at });
        self.updated_at = at;
        Ok(())
    }

    /// Sets the payout account once, after approval
    pub fn attach_payout(
        &mut self,
        account: PayoutAccount,
        at: DateTime<Utc>,
    ) -> Result<(), PreconditionViolation> {
        if self.status != ClaimStatus::Approved {
            return Err(PreconditionViolation::NotApproved { status: self.status });
        }
        if self.payout.is_some() {
            return Err(PreconditionViolation::PayoutAlreadySet);
        }
        self.payout = Some(account);
        self.updated_at = at;
        Ok(())
    }

    fn ensure_under_review(&self, action: &'static str) -> Result<(), PreconditionViolation> {
        if self.status != ClaimStatus::UnderReview {
            return Err(PreconditionViolation::NotUnderReview {
                status: self.status,
                action,
            });
        }
        Ok(())
    }

    fn ensure_decidable(&self, action: &'static str) -> Result<(), PreconditionViolation> {
        self.ensure_under_review(action)?;
        if !self.is_verified() {
            return Err(PreconditionViolation::NotVerified);
        }
        Ok(())
    }

    /// Reports the first broken rule, if any
    ///
    /// Payout pairing and the fraud pair hold by construction; the rest
    /// depend on status and are checked here.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let rejected = self.status == ClaimStatus::Rejected;
        let has_reason = self
            .rejection_reason
            .as_deref()
            .is_some_and(|reason| !reason.trim().is_empty());
        if rejected != has_reason {
            return Err(InvariantViolation::RejectionReasonMismatch {
                status: self.status,
                has_reason,
            });
        }

        let has_review = self.review.is_some();
        if self.status.is_terminal() != has_review {
            return Err(InvariantViolation::ReviewMismatch {
                status: self.status,
                has_review,
            });
        }

        if self.status.is_terminal() && self.fraud.is_none() {
            return Err(InvariantViolation::DecidedWithoutAssessment { status: self.status });
        }

        Ok(())
    }
}

/// Trims a rejection reason and checks it is non-empty and within bounds
pub fn validate_rejection_reason(reason: &str) -> Result<String, ClaimError> {
    required_text(
        "rejection_reason",
        reason,
        "Rejection reason is required",
        MAX_REJECTION_REASON_LEN,
    )
}
