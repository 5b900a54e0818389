//! Fraud-risk gate
//!
//! A claim must carry a fraud assessment before it can be decided. The
//! assessment comes from an external scorer; this module owns the value
//! types, the risk tiering, and the wire contract with the scorer.
//!
//! Only the probability drives tiering and gating. The scorer's own binary
//! prediction is kept for display and may disagree with the tier thresholds.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use core_kernel::ClaimId;
use crate::claim::Claim;
use crate::documents::DocumentKind;
use crate::policy_number::InsuranceCompany;

/// Lower bound (inclusive) of the Review tier
pub const REVIEW_THRESHOLD: f64 = 0.30;

/// Lower bound (inclusive) of the Suspicious tier
pub const SUSPICIOUS_THRESHOLD: f64 = 0.60;

/// Risk bucket derived from a fraud probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudTier {
    Genuine,
    Review,
    Suspicious,
}

impl FraudTier {
    /// Buckets a probability: `[0, 0.30)` Genuine, `[0.30, 0.60)` Review,
    /// `[0.60, 1]` Suspicious
    pub fn from_probability(probability: f64) -> Self {
        if probability < REVIEW_THRESHOLD {
            FraudTier::Genuine
        } else if probability < SUSPICIOUS_THRESHOLD {
            FraudTier::Review
        } else {
            FraudTier::Suspicious
        }
    }

    /// Human-readable label shown to reviewers
    pub fn label(&self) -> &'static str {
        match self {
            FraudTier::Genuine => "Low Risk - Genuine",
            FraudTier::Review => "Medium Risk - Review Required",
            FraudTier::Suspicious => "High Risk - Suspicious",
        }
    }
}

impl fmt::Display for FraudTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Shorthand for [`FraudTier::from_probability`]
pub fn tier(probability: f64) -> FraudTier {
    FraudTier::from_probability(probability)
}

/// The scorer's binary verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FraudPrediction {
    Genuine,
    Fraudulent,
}

impl FraudPrediction {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(FraudPrediction::Genuine),
            1 => Some(FraudPrediction::Fraudulent),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            FraudPrediction::Genuine => 0,
            FraudPrediction::Fraudulent => 1,
        }
    }
}

/// Rejected scorer output
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidAssessment {
    #[error("fraud probability {0} is outside [0, 1]")]
    ProbabilityOutOfRange(f64),
    #[error("fraud prediction {0} is not 0 or 1")]
    UnknownPrediction(i32),
}

/// Probability and prediction written together by one verification
///
/// Holding both in a single value means a claim can never carry one
/// without the other.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "ScoreResponse", try_from = "ScoreResponse")]
pub struct FraudAssessment {
    probability: f64,
    prediction: FraudPrediction,
}

impl FraudAssessment {
    pub fn new(probability: f64, prediction: FraudPrediction) -> Result<Self, InvalidAssessment> {
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(InvalidAssessment::ProbabilityOutOfRange(probability));
        }
        Ok(Self { probability, prediction })
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn prediction(&self) -> FraudPrediction {
        self.prediction
    }

    pub fn tier(&self) -> FraudTier {
        FraudTier::from_probability(self.probability)
    }
}

/// Scorer response body: `{"probability": 0.42, "prediction": 0}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub probability: f64,
    pub prediction: i32,
}

impl TryFrom<ScoreResponse> for FraudAssessment {
    type Error = InvalidAssessment;

    fn try_from(response: ScoreResponse) -> Result<Self, Self::Error> {
        let prediction = FraudPrediction::from_code(response.prediction)
            .ok_or(InvalidAssessment::UnknownPrediction(response.prediction))?;
        FraudAssessment::new(response.probability, prediction)
    }
}

impl From<FraudAssessment> for ScoreResponse {
    fn from(assessment: FraudAssessment) -> Self {
        Self {
            probability: assessment.probability,
            prediction: assessment.prediction.code(),
        }
    }
}

/// Claim attributes sent to the scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRequest {
    pub claim_id: ClaimId,
    pub claim_amount: Decimal,
    pub insurance_company: InsuranceCompany,
    pub policy_number: String,
    pub patient_age: u8,
    pub admission_date: NaiveDate,
    pub discharge_date: NaiveDate,
    pub stay_duration_days: i64,
    pub hospital_name: String,
    pub doctor_name: String,
    pub diagnosis: String,
    pub treatment_type: String,
    pub document_counts: DocumentCounts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentCounts {
    pub id_proof: usize,
    pub hospital_bill: usize,
    pub discharge_summary: usize,
    pub prescription: usize,
    pub diagnostic_report: usize,
    pub pharmacy_bill: usize,
}

impl ScoringRequest {
    pub fn for_claim(claim: &Claim) -> Self {
        let docs = &claim.documents;
        Self {
            claim_id: claim.id,
            claim_amount: claim.claim_amount,
            insurance_company: claim.insurance_company,
            policy_number: claim.policy_number.clone(),
            patient_age: claim.patient_age,
            admission_date: claim.admission_date,
            discharge_date: claim.discharge_date,
            stay_duration_days: claim.stay_duration_days(),
            hospital_name: claim.hospital_name.clone(),
            doctor_name: claim.doctor_name.clone(),
            diagnosis: claim.diagnosis.clone(),
            treatment_type: claim.treatment_type.clone(),
            document_counts: DocumentCounts {
                id_proof: docs.count(DocumentKind::IdProof),
                hospital_bill: docs.count(DocumentKind::HospitalBill),
                discharge_summary: docs.count(DocumentKind::DischargeSummary),
                prescription: docs.count(DocumentKind::Prescription),
                diagnostic_report: docs.count(DocumentKind::DiagnosticReport),
                pharmacy_bill: docs.count(DocumentKind::PharmacyBill),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(tier(0.0), FraudTier::Genuine);
        assert_eq!(tier(0.2999), FraudTier::Genuine);
        assert_eq!(tier(0.30), FraudTier::Review);
        assert_eq!(tier(0.5999), FraudTier::Review);
        assert_eq!(tier(0.60), FraudTier::Suspicious);
        assert_eq!(tier(1.0), FraudTier::Suspicious);
    }

    #[test]
    fn test_assessment_rejects_out_of_range() {
        assert!(FraudAssessment::new(-0.01, FraudPrediction::Genuine).is_err());
        assert!(FraudAssessment::new(1.01, FraudPrediction::Genuine).is_err());
        assert!(FraudAssessment::new(f64::NAN, FraudPrediction::Genuine).is_err());
        assert!(FraudAssessment::new(1.0, FraudPrediction::Fraudulent).is_ok());
    }

    #[test]
    fn test_prediction_may_disagree_with_tier() {
        let assessment = FraudAssessment::new(0.9, FraudPrediction::Genuine).unwrap();
        assert_eq!(assessment.tier(), FraudTier::Suspicious);
        assert_eq!(assessment.prediction(), FraudPrediction::Genuine);
    }

    #[test]
    fn test_score_response_conversion() {
        let ok = FraudAssessment::try_from(ScoreResponse { probability: 0.42, prediction: 1 }).unwrap();
        assert_eq!(ok.prediction(), FraudPrediction::Fraudulent);

        let err = FraudAssessment::try_from(ScoreResponse { probability: 0.42, prediction: 2 });
        assert_eq!(err, Err(InvalidAssessment::UnknownPrediction(2)));
    }

    #[test]
    fn test_assessment_serializes_as_score_pair() {
        let assessment = FraudAssessment::new(0.25, FraudPrediction::Genuine).unwrap();
        let json = serde_json::to_value(assessment).unwrap();
        assert_eq!(json, serde_json::json!({ "probability": 0.25, "prediction": 0 }));
    }
}
