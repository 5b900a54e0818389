//! Property-Based Test Generators
//!
//! Proptest strategies producing policy numbers per insurer, fraud scores,
//! and submissions that pass validation.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use domain_claims::{ClaimSubmission, InsuranceCompany};

pub fn lic_policy_number_strategy() -> impl Strategy<Value = String> {
    "[0-9]{9}"
}

pub fn hdfc_ergo_policy_number_strategy() -> impl Strategy<Value = String> {
    "[0-9]{10}"
}

pub fn muthoot_policy_number_strategy() -> impl Strategy<Value = String> {
    "[A-Z]{2,4}-20[0-9]{2}-[0-9]{6}"
}

pub fn star_health_policy_number_strategy() -> impl Strategy<Value = String> {
    "[A-Z]{1,2}/[0-9]{6}/[0-9]{2}/20[0-9]{2}/[0-9]{6}"
}

/// Letters followed by enough digits to reach eleven characters
pub fn icici_lombard_policy_number_strategy() -> impl Strategy<Value = String> {
    "[A-Z]{3,5}[0-9]{8,10}"
}

/// A policy number for any insurer, with the insurer it must classify as
pub fn policy_number_strategy() -> impl Strategy<Value = (String, InsuranceCompany)> {
    prop_oneof![
        lic_policy_number_strategy().prop_map(|p| (p, InsuranceCompany::Lic)),
        hdfc_ergo_policy_number_strategy().prop_map(|p| (p, InsuranceCompany::HdfcErgo)),
        muthoot_policy_number_strategy().prop_map(|p| (p, InsuranceCompany::MuthootHealth)),
        star_health_policy_number_strategy().prop_map(|p| (p, InsuranceCompany::StarHealth)),
        icici_lombard_policy_number_strategy().prop_map(|p| (p, InsuranceCompany::IciciLombard)),
    ]
}

/// Fraud probabilities in `[0, 1]`, including both ends and the tier
/// thresholds
pub fn probability_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(0.0),
        Just(0.3),
        Just(0.6),
        Just(1.0),
        0.0f64..=1.0f64,
    ]
}

/// Claim amounts between 1.00 and 10,000,000.00
pub fn claim_amount_strategy() -> impl Strategy<Value = Decimal> {
    (100i64..=1_000_000_000i64).prop_map(|paise| Decimal::new(paise, 2))
}

/// Admission and discharge dates in 2024-2025, discharge never first
pub fn stay_strategy() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    (0i64..700, 0i64..60).prop_map(|(offset, length)| {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
        let admission = base + Duration::days(offset);
        (admission, admission + Duration::days(length))
    })
}

/// Submissions that pass validation
pub fn valid_submission_strategy() -> impl Strategy<Value = ClaimSubmission> {
    (
        policy_number_strategy(),
        claim_amount_strategy(),
        stay_strategy(),
        1i64..=150,
        "[A-Z][a-z]{2,12} [A-Z][a-z]{2,12}",
        "[A-Z][a-z]{3,20}",
    )
        .prop_map(|((policy_number, _), amount, (admission, discharge), age, patient, diagnosis)| {
            ClaimSubmission {
                claim_amount: Some(amount),
                policy_number,
                admission_date: Some(admission),
                discharge_date: Some(discharge),
                hospital_name: "Fortis Hospital".to_string(),
                patient_name: patient,
                patient_age: Some(age),
                diagnosis,
                treatment_type: "Inpatient".to_string(),
                doctor_name: "Dr. Rao".to_string(),
                ..Default::default()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_claims::classify;

    proptest! {
        #[test]
        fn prop_generated_numbers_classify_as_their_insurer((number, company) in policy_number_strategy()) {
            prop_assert_eq!(classify(&number).company, Some(company));
        }

        #[test]
        fn prop_generated_submissions_validate(submission in valid_submission_strategy()) {
            prop_assert!(submission.validate().is_ok());
        }
    }
}
