//! Pre-built Test Fixtures
//!
//! Fixed, predictable values for unit tests: one reference policy number
//! per insurer, the standard actors, and a hospital stay with known dates.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{ClaimId, UserId};
use domain_claims::{Actor, FraudAssessment, FraudPrediction, InsuranceCompany};
use uuid::Uuid;

/// Reference policy numbers
pub struct PolicyNumberFixtures;

impl PolicyNumberFixtures {
    pub fn lic() -> &'static str {
        "123456789"
    }

    pub fn hdfc_ergo() -> &'static str {
        "1234567890"
    }

    pub fn muthoot_health() -> &'static str {
        "MHI-2025-009876"
    }

    pub fn star_health() -> &'static str {
        "P/141113/01/2025/012345"
    }

    pub fn icici_lombard() -> &'static str {
        "ABCDE123456"
    }

    /// One reference number per insurer, paired with the expected company
    pub fn all_valid() -> Vec<(&'static str, InsuranceCompany)> {
        vec![
            (Self::lic(), InsuranceCompany::Lic),
            (Self::hdfc_ergo(), InsuranceCompany::HdfcErgo),
            (Self::muthoot_health(), InsuranceCompany::MuthootHealth),
            (Self::star_health(), InsuranceCompany::StarHealth),
            (Self::icici_lombard(), InsuranceCompany::IciciLombard),
        ]
    }

    /// Numbers that match no insurer's format
    pub fn invalid() -> Vec<&'static str> {
        vec!["12345678", "12345678901", "MHI-25-009876", "P/141113", "ABC-DEF", "hello"]
    }
}

/// Fixture for the two kinds of actor
pub struct ActorFixtures;

impl ActorFixtures {
    /// Deterministic policy holder
    pub fn holder() -> Actor {
        Actor::policy_holder(IdFixtures::holder_id())
    }

    /// A holder other than [`ActorFixtures::holder`]
    pub fn other_holder() -> Actor {
        Actor::policy_holder(UserId::from_uuid(Uuid::from_u128(0x3)))
    }

    pub fn worker() -> Actor {
        Actor::insurance_worker(IdFixtures::worker_id())
    }
}

/// Fixture for identifiers with predictable values
pub struct IdFixtures;

impl IdFixtures {
    pub fn holder_id() -> UserId {
        UserId::from_uuid(Uuid::from_u128(0x1))
    }

    pub fn worker_id() -> UserId {
        UserId::from_uuid(Uuid::from_u128(0x2))
    }

    pub fn claim_id() -> ClaimId {
        ClaimId::from_uuid(Uuid::from_u128(0xC1A1))
    }
}

/// Fixture for a five-day hospital stay in March 2025
pub struct TemporalFixtures;

impl TemporalFixtures {
    pub fn admission() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 2).expect("valid date")
    }

    pub fn discharge() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 7).expect("valid date")
    }

    /// When the claim is filed, the day after discharge
    pub fn filed_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 8, 9, 30, 0).unwrap()
    }

    pub fn reviewed_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 14, 0, 0).unwrap()
    }
}

/// Fixture for fraud assessments, one per tier
pub struct FraudFixtures;

impl FraudFixtures {
    pub fn genuine() -> FraudAssessment {
        FraudAssessment::new(0.12, FraudPrediction::Genuine).expect("in range")
    }

    pub fn review() -> FraudAssessment {
        FraudAssessment::new(0.45, FraudPrediction::Genuine).expect("in range")
    }

    pub fn suspicious() -> FraudAssessment {
        FraudAssessment::new(0.87, FraudPrediction::Fraudulent).expect("in range")
    }
}
