//! Claims DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, UserId};
use domain_claims::{
    Claim, ClaimStatus, FraudAssessment, FraudTier, InsuranceCompany, PayoutAccount,
    SupportingDocuments,
};

#[derive(Debug, Deserialize)]
pub struct ClassifyPolicyNumberRequest {
    #[serde(default)]
    pub policy_number: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListClaimsParams {
    pub status: Option<ClaimStatus>,
}

/// A missing reason deserializes as empty and fails validation with a
/// field name
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RejectClaimRequest {
    pub reason: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PayoutAccountRequest {
    pub account_number: String,
    pub ifsc_code: String,
}

/// Bank details as shown back to clients
#[derive(Debug, Serialize, Deserialize)]
pub struct PayoutResponse {
    pub masked_account_number: String,
    pub ifsc_code: String,
}

impl From<&PayoutAccount> for PayoutResponse {
    fn from(account: &PayoutAccount) -> Self {
        Self {
            masked_account_number: account.masked_account_number(),
            ifsc_code: account.ifsc_code().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FraudResponse {
    pub probability: f64,
    /// Scorer's own verdict: 0 genuine, 1 fraudulent
    pub prediction: i32,
    pub tier: FraudTier,
    pub tier_label: String,
}

impl From<FraudAssessment> for FraudResponse {
    fn from(assessment: FraudAssessment) -> Self {
        let tier = assessment.tier();
        Self {
            probability: assessment.probability(),
            prediction: assessment.prediction().code(),
            tier,
            tier_label: tier.label().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimResponse {
    pub id: ClaimId,
    pub policy_holder_id: UserId,
    pub policy_number: String,
    pub insurance_company: InsuranceCompany,
    pub claim_amount: Decimal,
    pub admission_date: NaiveDate,
    pub discharge_date: NaiveDate,
    pub stay_duration_days: i64,
    pub patient_name: String,
    pub patient_age: u8,
    pub hospital_name: String,
    pub doctor_name: String,
    pub diagnosis: String,
    pub treatment_type: String,
    pub notes: Option<String>,
    pub documents: SupportingDocuments,
    pub payout: Option<PayoutResponse>,
    pub status: ClaimStatus,
    pub fraud: Option<FraudResponse>,
    pub rejection_reason: Option<String>,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Claim> for ClaimResponse {
    fn from(claim: Claim) -> Self {
        let stay_duration_days = claim.stay_duration_days();
        Self {
            id: claim.id,
            policy_holder_id: claim.policy_holder_id,
            policy_number: claim.policy_number,
            insurance_company: claim.insurance_company,
            claim_amount: claim.claim_amount,
            admission_date: claim.admission_date,
            discharge_date: claim.discharge_date,
            stay_duration_days,
            patient_name: claim.patient_name,
            patient_age: claim.patient_age,
            hospital_name: claim.hospital_name,
            doctor_name: claim.doctor_name,
            diagnosis: claim.diagnosis,
            treatment_type: claim.treatment_type,
            notes: claim.notes,
            documents: claim.documents,
            payout: claim.payout.as_ref().map(PayoutResponse::from),
            status: claim.status,
            fraud: claim.fraud.map(FraudResponse::from),
            rejection_reason: claim.rejection_reason,
            reviewed_by: claim.review.map(|r| r.reviewed_by),
            reviewed_at: claim.review.map(|r| r.reviewed_at),
            created_at: claim.created_at,
            updated_at: claim.updated_at,
        }
    }
}
