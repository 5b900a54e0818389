//! Test Data Builders
//!
//! Builders for submissions and claims with sensible defaults, so a test
//! only names the fields it cares about. Names are generated with `fake`.

use chrono::{DateTime, NaiveDate, Utc};
use fake::faker::company::en::CompanyName;
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{ClaimId, UserId};
use domain_claims::{
    classify, Claim, ClaimStatus, ClaimSubmission, FraudAssessment, InsuranceCompany,
    PayoutAccount, Review, SupportingDocuments,
};

use crate::fixtures::{FraudFixtures, IdFixtures, PolicyNumberFixtures, TemporalFixtures};

/// Builder for a claim form as a policy holder would submit it
///
/// The default builds a submission that passes validation.
#[derive(Debug, Clone)]
pub struct ClaimSubmissionBuilder {
    submission: ClaimSubmission,
}

impl Default for ClaimSubmissionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimSubmissionBuilder {
    pub fn new() -> Self {
        let doctor: String = Name().fake();
        Self {
            submission: ClaimSubmission {
                claim_amount: Some(dec!(85000)),
                policy_number: PolicyNumberFixtures::star_health().to_string(),
                admission_date: Some(TemporalFixtures::admission()),
                discharge_date: Some(TemporalFixtures::discharge()),
                hospital_name: format!("{} Hospital", CompanyName().fake::<String>()),
                patient_name: Name().fake(),
                patient_age: Some(58),
                diagnosis: "Coronary artery disease".to_string(),
                treatment_type: "Angioplasty".to_string(),
                doctor_name: format!("Dr. {}", doctor),
                account_number: None,
                ifsc_code: None,
                notes: None,
            },
        }
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.submission.claim_amount = Some(amount);
        self
    }

    pub fn without_amount(mut self) -> Self {
        self.submission.claim_amount = None;
        self
    }

    pub fn with_policy_number(mut self, number: impl Into<String>) -> Self {
        self.submission.policy_number = number.into();
        self
    }

    pub fn with_stay(mut self, admission: NaiveDate, discharge: NaiveDate) -> Self {
        self.submission.admission_date = Some(admission);
        self.submission.discharge_date = Some(discharge);
        self
    }

    pub fn with_patient_age(mut self, age: i64) -> Self {
        self.submission.patient_age = Some(age);
        self
    }

    pub fn with_diagnosis(mut self, diagnosis: impl Into<String>) -> Self {
        self.submission.diagnosis = diagnosis.into();
        self
    }

    /// Supplies bank details up front
    pub fn with_payout(mut self, account: impl Into<String>, ifsc: impl Into<String>) -> Self {
        self.submission.account_number = Some(account.into());
        self.submission.ifsc_code = Some(ifsc.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.submission.notes = Some(notes.into());
        self
    }

    pub fn build(self) -> ClaimSubmission {
        self.submission
    }
}

/// Builder for a stored claim in any lifecycle state
///
/// Bypasses the lifecycle so store and API tests can start from a given
/// state. The `verified`, `approved` and `rejected` steps fill in the
/// fields a claim in that state must carry.
#[derive(Debug, Clone)]
pub struct ClaimBuilder {
    claim: Claim,
}

impl Default for ClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimBuilder {
    /// A claim under review, filed by the fixture holder
    pub fn new() -> Self {
        let policy_number = PolicyNumberFixtures::star_health();
        let insurance_company = classify(policy_number)
            .company
            .unwrap_or(InsuranceCompany::StarHealth);
        let filed_at = TemporalFixtures::filed_at();
        let doctor: String = Name().fake();

        Self {
            claim: Claim {
                id: ClaimId::new_v7(),
                policy_holder_id: IdFixtures::holder_id(),
                policy_number: policy_number.to_string(),
                insurance_company,
                claim_amount: dec!(85000),
                admission_date: TemporalFixtures::admission(),
                discharge_date: TemporalFixtures::discharge(),
                patient_name: Name().fake(),
                patient_age: 58,
                hospital_name: format!("{} Hospital", CompanyName().fake::<String>()),
                doctor_name: format!("Dr. {}", doctor),
                diagnosis: "Coronary artery disease".to_string(),
                treatment_type: "Angioplasty".to_string(),
                notes: None,
                documents: SupportingDocuments::default(),
                payout: None,
                status: ClaimStatus::UnderReview,
                fraud: None,
                rejection_reason: None,
                review: None,
                created_at: filed_at,
                updated_at: filed_at,
            },
        }
    }

    pub fn with_id(mut self, id: ClaimId) -> Self {
        self.claim.id = id;
        self
    }

    pub fn filed_by(mut self, holder: UserId) -> Self {
        self.claim.policy_holder_id = holder;
        self
    }

    pub fn filed_at(mut self, at: DateTime<Utc>) -> Self {
        self.claim.created_at = at;
        self.claim.updated_at = at;
        self
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.claim.claim_amount = amount;
        self
    }

    pub fn with_documents(mut self, documents: SupportingDocuments) -> Self {
        self.claim.documents = documents;
        self
    }

    pub fn verified(mut self, assessment: FraudAssessment) -> Self {
        self.claim.fraud = Some(assessment);
        self
    }

    /// Approved by the fixture worker; verifies with a genuine score first
    /// if no assessment was set
    pub fn approved(mut self) -> Self {
        self.decide(ClaimStatus::Approved);
        self
    }

    pub fn rejected(mut self, reason: impl Into<String>) -> Self {
        self.decide(ClaimStatus::Rejected);
        self.claim.rejection_reason = Some(reason.into());
        self
    }

    pub fn with_payout(mut self, account: &str, ifsc: &str) -> Self {
        self.claim.payout = PayoutAccount::new(account, ifsc).ok();
        self
    }

    fn decide(&mut self, status: ClaimStatus) {
        if self.claim.fraud.is_none() {
            self.claim.fraud = Some(FraudFixtures::genuine());
        }
        let at = TemporalFixtures::reviewed_at();
        self.claim.status = status;
        self.claim.review = Some(Review {
            reviewed_by: IdFixtures::worker_id(),
            reviewed_at: at,
        });
        self.claim.updated_at = at;
    }

    pub fn build(self) -> Claim {
        self.claim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_submission_is_valid() {
        let validated = ClaimSubmissionBuilder::new().build().validate().unwrap();
        assert_eq!(validated.details.insurance_company, InsuranceCompany::StarHealth);
        assert!(validated.payout.is_none());
    }

    #[test]
    fn test_built_claims_satisfy_invariants() {
        let claims = [
            ClaimBuilder::new().build(),
            ClaimBuilder::new().verified(FraudFixtures::suspicious()).build(),
            ClaimBuilder::new().approved().with_payout("000123456789", "SBIN0000001").build(),
            ClaimBuilder::new().rejected("Duplicate hospital bill").build(),
        ];
        for claim in &claims {
            assert!(claim.check_invariants().is_ok(), "{:?}", claim.status);
        }
    }
}
