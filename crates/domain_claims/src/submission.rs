//! Claim submission command and its field validation
//!
//! Fields are checked in the order the filer sees them, and the first
//! failure is reported.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ClaimError;
use crate::payout::PayoutAccount;
use crate::policy_number::{self, InsuranceCompany, INVALID_FORMAT_MESSAGE};

/// Largest claim amount accepted
pub const MAX_CLAIM_AMOUNT: i64 = 10_000_000;
pub const MAX_POLICY_NUMBER_LEN: usize = 50;
pub const MAX_NAME_LEN: usize = 200;
pub const MAX_DIAGNOSIS_LEN: usize = 500;
pub const MAX_NOTES_LEN: usize = 1000;
pub const MAX_PATIENT_AGE: i64 = 150;

/// A claim as entered by the policy holder
///
/// Every field is optional at this stage so a partially filled form
/// deserializes and fails validation with a field name instead of a
/// parse error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimSubmission {
    pub claim_amount: Option<Decimal>,
    pub policy_number: String,
    pub admission_date: Option<NaiveDate>,
    pub discharge_date: Option<NaiveDate>,
    pub hospital_name: String,
    pub patient_name: String,
    pub patient_age: Option<i64>,
    pub diagnosis: String,
    pub treatment_type: String,
    pub doctor_name: String,
    pub account_number: Option<String>,
    pub ifsc_code: Option<String>,
    pub notes: Option<String>,
}

/// Validated claim facts, ready to become a claim
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimDetails {
    pub policy_number: String,
    pub insurance_company: InsuranceCompany,
    pub claim_amount: Decimal,
    pub admission_date: NaiveDate,
    pub discharge_date: NaiveDate,
    pub hospital_name: String,
    pub patient_name: String,
    pub patient_age: u8,
    pub diagnosis: String,
    pub treatment_type: String,
    pub doctor_name: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSubmission {
    pub details: ClaimDetails,
    /// Bank details given up front, if any
    pub payout: Option<PayoutAccount>,
}

impl ClaimSubmission {
    pub fn validate(&self) -> Result<ValidatedSubmission, ClaimError> {
        let claim_amount = self.validate_amount()?;

        let policy_number = required_text(
            "policy_number",
            &self.policy_number,
            "Policy number is required",
            MAX_POLICY_NUMBER_LEN,
        )?;
        let insurance_company = policy_number::classify(&policy_number)
            .company()
            .ok_or_else(|| ClaimError::validation("policy_number", INVALID_FORMAT_MESSAGE))?;

        let admission_date = self
            .admission_date
            .ok_or_else(|| ClaimError::validation("admission_date", "Admission date is required"))?;
        let discharge_date = self
            .discharge_date
            .ok_or_else(|| ClaimError::validation("discharge_date", "Discharge date is required"))?;
        if discharge_date < admission_date {
            return Err(ClaimError::validation(
                "discharge_date",
                "Discharge date cannot be before admission date",
            ));
        }

        let hospital_name = required_text(
            "hospital_name",
            &self.hospital_name,
            "Hospital name is required",
            MAX_NAME_LEN,
        )?;
        let patient_name = required_text(
            "patient_name",
            &self.patient_name,
            "Patient name is required",
            MAX_NAME_LEN,
        )?;
        let patient_age = self.validate_age()?;
        let diagnosis = required_text(
            "diagnosis",
            &self.diagnosis,
            "Diagnosis is required",
            MAX_DIAGNOSIS_LEN,
        )?;
        let treatment_type = required_text(
            "treatment_type",
            &self.treatment_type,
            "Treatment type is required",
            MAX_NAME_LEN,
        )?;
        let doctor_name = required_text(
            "doctor_name",
            &self.doctor_name,
            "Doctor name is required",
            MAX_NAME_LEN,
        )?;

        let payout = self.validate_payout()?;

        let notes = optional_text(self.notes.as_deref());
        if let Some(notes) = &notes {
            if notes.chars().count() > MAX_NOTES_LEN {
                return Err(ClaimError::validation("notes", "Notes too long"));
            }
        }

        Ok(ValidatedSubmission {
            details: ClaimDetails {
                policy_number,
                insurance_company,
                claim_amount,
                admission_date,
                discharge_date,
                hospital_name,
                patient_name,
                patient_age,
                diagnosis,
                treatment_type,
                doctor_name,
                notes,
            },
            payout,
        })
    }

    fn validate_amount(&self) -> Result<Decimal, ClaimError> {
        let amount = self
            .claim_amount
            .ok_or_else(|| ClaimError::validation("claim_amount", "Claim amount is required"))?;
        if amount <= Decimal::ZERO {
            return Err(ClaimError::validation("claim_amount", "Amount must be positive"));
        }
        if amount > Decimal::from(MAX_CLAIM_AMOUNT) {
            return Err(ClaimError::validation("claim_amount", "Amount too large"));
        }
        Ok(amount)
    }

    fn validate_age(&self) -> Result<u8, ClaimError> {
        let age = self
            .patient_age
            .ok_or_else(|| ClaimError::validation("patient_age", "Patient age is required"))?;
        if age <= 0 {
            return Err(ClaimError::validation("patient_age", "Age must be positive"));
        }
        if age > MAX_PATIENT_AGE {
            return Err(ClaimError::validation("patient_age", "Invalid age"));
        }
        u8::try_from(age).map_err(|_| ClaimError::validation("patient_age", "Invalid age"))
    }

    /// Bank details are optional, but an account number without an IFSC
    /// code (or the reverse) is rejected
    fn validate_payout(&self) -> Result<Option<PayoutAccount>, ClaimError> {
        let account = optional_text(self.account_number.as_deref());
        let ifsc = optional_text(self.ifsc_code.as_deref());
        match (account, ifsc) {
            (None, None) => Ok(None),
            (Some(account), Some(ifsc)) => PayoutAccount::new(&account, &ifsc).map(Some),
            (Some(_), None) => Err(ClaimError::validation(
                "ifsc_code",
                "IFSC code is required when an account number is given",
            )),
            (None, Some(_)) => Err(ClaimError::validation(
                "account_number",
                "Account number is required when an IFSC code is given",
            )),
        }
    }
}

/// Trims `value` and checks it is non-empty and at most `max` characters
pub(crate) fn required_text(
    field: &'static str,
    value: &str,
    missing: &str,
    max: usize,
) -> Result<String, ClaimError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClaimError::validation(field, missing));
    }
    if trimmed.chars().count() > max {
        return Err(ClaimError::validation(
            field,
            format!("Must be at most {} characters", max),
        ));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
